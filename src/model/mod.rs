pub mod flatten;
pub mod highlight;
pub mod history;
pub mod node;
pub mod path;
pub mod performance;
pub mod search;
pub mod session;
