//! ViewerSession：一个打开文档的全部可变状态（展开集合、搜索游标、历史记录）

use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{InitialExpansion, KeyOrder, ViewerConfig};
use crate::model::flatten::{flatten, DisplayLine, ExpansionSet};
use crate::model::highlight::{segments, Segment};
use crate::model::history::History;
use crate::model::node::JsonNode;
use crate::model::path::{path_chain, resolve, NodePath};
use crate::model::search::SearchState;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("无法读取输入: {0}")]
    Encoding(String),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("状态错误: {0}")]
    State(String),
}

/// 已成功解析的文档
#[derive(Debug, Clone)]
pub struct Document {
    pub root: JsonNode,
    /// 原文视图使用的美化文本
    pub pretty: String,
}

#[derive(Debug, Clone, Default)]
pub enum DocumentState {
    #[default]
    Empty,
    Loaded(Document),
    /// 输入不是合法文本，不产生树与原文
    Unreadable { message: String },
    /// 文本不是合法 JSON；原文视图展示未修改的输入
    Invalid { message: String, raw_text: String },
}

#[derive(Debug)]
pub struct ViewerSession {
    config: ViewerConfig,
    state: DocumentState,
    expanded: ExpansionSet,
    search: SearchState,
    history: History,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ViewerSession {
    pub fn new(config: ViewerConfig) -> Self {
        let history = History::new(
            config.history_limit,
            Duration::from_secs(config.history_max_age_secs),
        );
        Self {
            config,
            state: DocumentState::Empty,
            expanded: ExpansionSet::root_only(),
            search: SearchState::default(),
            history,
        }
    }

    /// 从原始字节载入；非 UTF-8 视为无法读取
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ViewerError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.load_text(text),
            Err(e) => {
                let message = format!("无法编码文本: {}", e);
                tracing::error!("{}", message);
                self.state = DocumentState::Unreadable {
                    message: message.clone(),
                };
                self.reset_view_state();
                Err(ViewerError::Encoding(message))
            }
        }
    }

    /// 解析文本并替换当前文档；展开集合按配置重置，当前查询在新文档上重跑
    pub fn load_text(&mut self, text: &str) -> Result<(), ViewerError> {
        let start = Instant::now();
        let now = SystemTime::now();
        self.history.add(text);
        self.history.prune(now);

        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("文档解析失败: {}", e);
                self.state = DocumentState::Invalid {
                    message: e.to_string(),
                    raw_text: text.to_string(),
                };
                self.reset_view_state();
                return Err(ViewerError::Parse(e));
            }
        };

        let root = JsonNode::parse(&value);
        let pretty = pretty_text(&value, self.config.raw_key_order, self.config.indent);
        self.expanded = match self.config.initial_expansion {
            InitialExpansion::All => ExpansionSet::all(&root),
            InitialExpansion::Root => ExpansionSet::root_only(),
        };
        tracing::info!(
            "文档加载成功: {} 个节点，{} 行，耗时: {}ms",
            root.node_count(),
            root.total_lines(),
            start.elapsed().as_millis()
        );
        self.state = DocumentState::Loaded(Document { root, pretty });

        let query = self.search.query().to_string();
        self.set_query(&query);
        Ok(())
    }

    fn reset_view_state(&mut self) {
        self.expanded = ExpansionSet::root_only();
        let query = self.search.query().to_string();
        self.search.run(None, &query);
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.state {
            DocumentState::Loaded(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn root(&self) -> Option<&JsonNode> {
        self.document().map(|d| &d.root)
    }

    /// 终止状态的错误消息（无法读取 / 非法文档）
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Unreadable { message } | DocumentState::Invalid { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// 按路径取节点
    pub fn node_at(&self, path: &NodePath) -> Result<&JsonNode, ViewerError> {
        let root = self
            .root()
            .ok_or_else(|| ViewerError::State("文档尚未加载".into()))?;
        resolve(root, path).ok_or_else(|| ViewerError::State(format!("路径不存在: {}", path)))
    }

    /// 当前可见行
    pub fn visible_lines(&self) -> Vec<DisplayLine<'_>> {
        match self.root() {
            Some(root) => flatten(root, &self.expanded),
            None => Vec::new(),
        }
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expanded
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// 切换展开状态，返回切换后是否展开
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        let expanded = self.expanded.toggle(path);
        tracing::debug!("节点{}: {}", if expanded { "展开" } else { "折叠" }, path);
        expanded
    }

    pub fn expand(&mut self, path: &NodePath) {
        self.expanded.insert(path.clone());
    }

    pub fn collapse(&mut self, path: &NodePath) {
        self.expanded.remove(path.as_str());
    }

    pub fn expand_all(&mut self) {
        if let Some(root) = self.root() {
            self.expanded = ExpansionSet::all(root);
            tracing::info!("全部展开: {} 条路径", self.expanded.len());
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded = ExpansionSet::root_only();
        tracing::info!("全部折叠");
    }

    /// 展开目标路径的所有祖先（含自身），使其在下一次扁平化中可见
    pub fn expand_to(&mut self, target: &NodePath) {
        let DocumentState::Loaded(doc) = &self.state else {
            return;
        };
        match path_chain(&doc.root, &NodePath::root(), target) {
            Some(chain) => self.expanded.extend(chain),
            None => tracing::warn!("路径不在当前文档中: {}", target),
        }
    }

    /// 更新查询；非空时游标回到首个匹配并展开其祖先，空查询只清除匹配
    pub fn set_query(&mut self, query: &str) -> usize {
        if query.is_empty() {
            self.search.clear();
            return 0;
        }
        let root = match &self.state {
            DocumentState::Loaded(doc) => Some(&doc.root),
            _ => None,
        };
        let first = self.search.run(root, query).cloned();
        if let Some(path) = first {
            self.expand_to(&path);
        }
        tracing::info!("搜索: {}，匹配 {} 个", query, self.search.len());
        self.search.len()
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn matches(&self) -> &[NodePath] {
        self.search.matches()
    }

    pub fn match_count(&self) -> usize {
        self.search.len()
    }

    pub fn current_match_index(&self) -> Option<usize> {
        self.search.current_index()
    }

    pub fn current_match(&self) -> Option<&NodePath> {
        self.search.current()
    }

    pub fn is_current_match(&self, path: &str) -> bool {
        self.search.is_current(path)
    }

    pub fn next_match(&mut self) -> Option<NodePath> {
        let path = self.search.next().cloned();
        if let Some(p) = &path {
            self.expand_to(p);
        }
        path
    }

    pub fn previous_match(&mut self) -> Option<NodePath> {
        let path = self.search.previous().cloned();
        if let Some(p) = &path {
            self.expand_to(p);
        }
        path
    }

    /// 以当前查询对一段显示文本分段高亮
    pub fn highlight(&self, display: &str, searchable: &str) -> Vec<Segment> {
        segments(display, searchable, self.search.query())
    }

    /// 原文视图文本：成功时为美化文本，解析失败时为未修改的输入
    pub fn raw_text(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Loaded(doc) => Some(&doc.pretty),
            DocumentState::Invalid { raw_text, .. } => Some(raw_text),
            _ => None,
        }
    }

    pub fn raw_lines(&self) -> Vec<&str> {
        self.raw_text()
            .map(|t| t.split('\n').collect())
            .unwrap_or_default()
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

/// 生成原文视图的美化文本，键顺序由配置决定
pub fn pretty_text(value: &Value, order: KeyOrder, indent: usize) -> String {
    let sorted;
    let value = match order {
        KeyOrder::Sorted => {
            sorted = sort_keys(value);
            &sorted
        }
        KeyOrder::Preserved => value,
    };
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if let Err(e) = value.serialize(&mut ser) {
        tracing::warn!("美化输出失败: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for k in keys {
                out.insert(k.clone(), sort_keys(&map[k.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flatten::LineContent;

    const SAMPLE: &str = r#"{"a": 1, "b": [true, null, "x"]}"#;

    fn loaded(text: &str) -> ViewerSession {
        let mut session = ViewerSession::default();
        session.load_text(text).expect("加载文档失败");
        session
    }

    fn ids(session: &ViewerSession) -> Vec<String> {
        session.visible_lines().into_iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_load_expands_everything_by_default() {
        let session = loaded(SAMPLE);
        assert_eq!(session.visible_lines().len(), 8);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_root_only_initial_expansion() {
        let config = ViewerConfig {
            initial_expansion: InitialExpansion::Root,
            ..ViewerConfig::default()
        };
        let mut session = ViewerSession::new(config);
        session.load_text(SAMPLE).unwrap();
        assert_eq!(ids(&session), vec!["root", "root.a", "root.b", "root_closing"]);
    }

    #[test]
    fn test_collapse_example() {
        let mut session = loaded(SAMPLE);
        assert!(!session.toggle(&"root.b".into()));
        let lines = session.visible_lines();
        assert_eq!(lines.len(), 4);
        assert!(matches!(lines[2].content, LineContent::Opening { .. }));
        assert_eq!(lines[2].line_number, 3);
    }

    #[test]
    fn test_search_expands_ancestors() {
        let config = ViewerConfig {
            initial_expansion: InitialExpansion::Root,
            ..ViewerConfig::default()
        };
        let mut session = ViewerSession::new(config);
        session
            .load_text(r#"{"a": 1, "b": [true, "null", {"deep": ["needle"]}]}"#)
            .unwrap();
        assert!(!session.is_expanded("root.b"));

        assert_eq!(session.set_query("NULL"), 1);
        assert!(session.is_expanded("root.b"));
        assert!(ids(&session).contains(&"root.b[1]".to_string()));

        session.set_query("needle");
        assert_eq!(session.current_match().map(NodePath::as_str), Some("root.b[2].deep[0]"));
        for p in ["root", "root.b", "root.b[2]", "root.b[2].deep"] {
            assert!(session.is_expanded(p), "{} 应已展开", p);
        }
    }

    #[test]
    fn test_empty_query_keeps_expansion() {
        let mut session = loaded(SAMPLE);
        session.collapse_all();
        session.set_query("x");
        let before = session.expansion().clone();
        assert_eq!(session.set_query(""), 0);
        assert_eq!(session.match_count(), 0);
        assert_eq!(session.current_match(), None);
        assert_eq!(session.expansion(), &before);
    }

    #[test]
    fn test_navigation_expands_each_match() {
        let config = ViewerConfig {
            initial_expansion: InitialExpansion::Root,
            ..ViewerConfig::default()
        };
        let mut session = ViewerSession::new(config);
        session
            .load_text(r#"{"p": {"v": "hit"}, "q": [{"w": "hit"}]}"#)
            .unwrap();
        session.set_query("hit");
        assert_eq!(session.match_count(), 2);
        assert!(!session.is_expanded("root.q"));

        assert_eq!(session.next_match().map(|p| p.to_string()), Some("root.q[0].w".into()));
        assert!(session.is_expanded("root.q[0]"));
        assert_eq!(session.current_match_index(), Some(1));
        assert_eq!(session.next_match().map(|p| p.to_string()), Some("root.p.v".into()));
        assert_eq!(session.previous_match().map(|p| p.to_string()), Some("root.q[0].w".into()));
    }

    #[test]
    fn test_invalid_document_keeps_raw_text() {
        let mut session = ViewerSession::default();
        let text = "{\"a\": 1,\n oops}";
        let res = session.load_text(text);
        assert!(matches!(res, Err(ViewerError::Parse(_))));
        assert!(matches!(session.state(), DocumentState::Invalid { .. }));
        assert_eq!(session.raw_text(), Some(text));
        assert_eq!(session.raw_lines(), vec!["{\"a\": 1,", " oops}"]);
        assert!(session.visible_lines().is_empty());
        assert!(session.error_message().is_some());
    }

    #[test]
    fn test_unreadable_bytes() {
        let mut session = loaded(SAMPLE);
        let res = session.load_bytes(&[0x7b, 0xff, 0xfe, 0x7d]);
        assert!(matches!(res, Err(ViewerError::Encoding(_))));
        assert!(matches!(session.state(), DocumentState::Unreadable { .. }));
        assert!(session.raw_text().is_none());
        assert!(session.visible_lines().is_empty());
    }

    #[test]
    fn test_load_bytes_ok() {
        let mut session = ViewerSession::default();
        session.load_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(session.root().map(JsonNode::total_lines), Some(8));
    }

    #[test]
    fn test_reload_resets_expansion_and_reruns_query() {
        let mut session = loaded(SAMPLE);
        session.collapse_all();
        session.set_query("x");
        assert_eq!(session.match_count(), 1);

        session.load_text(r#"{"x1": 1, "x2": 2}"#).unwrap();
        assert_eq!(session.query(), "x");
        assert_eq!(session.match_count(), 2);
        assert_eq!(session.visible_lines().len(), 4);
    }

    #[test]
    fn test_raw_view_key_order() {
        let text = r#"{"b": 1, "a": {"d": 2, "c": 3}}"#;
        let session = loaded(text);
        let raw = session.raw_text().unwrap();
        assert!(raw.find("\"a\"").unwrap() < raw.find("\"b\"").unwrap());
        assert!(raw.find("\"c\"").unwrap() < raw.find("\"d\"").unwrap());

        let config = ViewerConfig {
            raw_key_order: KeyOrder::Preserved,
            ..ViewerConfig::default()
        };
        let mut session = ViewerSession::new(config);
        session.load_text(text).unwrap();
        let raw = session.raw_text().unwrap();
        assert!(raw.find("\"b\"").unwrap() < raw.find("\"a\"").unwrap());
        // 大纲视图始终保持插入顺序
        assert_eq!(ids(&session)[1], "root.b");
    }

    #[test]
    fn test_node_at() {
        let session = loaded(SAMPLE);
        assert_eq!(session.node_at(&"root.a".into()).unwrap(), &JsonNode::Number(1.0));
        assert!(matches!(session.node_at(&"root.zz".into()), Err(ViewerError::State(_))));
        let empty = ViewerSession::default();
        assert!(matches!(empty.node_at(&NodePath::root()), Err(ViewerError::State(_))));
    }

    #[test]
    fn test_history_records_inputs() {
        let mut session = loaded(SAMPLE);
        let _ = session.load_text("not json");
        session.load_text(SAMPLE).unwrap();
        let contents: Vec<&str> = session
            .history()
            .entries()
            .iter()
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(contents, vec![SAMPLE, "not json"]);
    }

    #[test]
    fn test_highlight_with_current_query() {
        let mut session = loaded(SAMPLE);
        session.set_query("X");
        let segs = session.highlight("\"x\"", "x");
        assert_eq!(segs.iter().filter(|s| s.is_match).count(), 1);
    }
}
