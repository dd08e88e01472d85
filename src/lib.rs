//! JSON 大纲浏览核心库
//!
//! 提供节点模型、路径寻址、按展开状态扁平化、文档顺序搜索与匹配高亮，
//! 由一个 ViewerSession 持有单个文档的全部可变状态

pub mod config;
pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use config::{InitialExpansion, KeyOrder, ViewerConfig};
pub use model::flatten::{flatten, DisplayLine, ExpansionSet, LineContent, LineKey};
pub use model::highlight::{segments, Segment};
pub use model::node::{JsonNode, NodeKind};
pub use model::path::{child_path, collect_all_paths, NodePath, PathSegment};
pub use model::search::{search, SearchState};
pub use model::session::{DocumentState, ViewerError, ViewerSession};
