//! VM桥接层：把显示行转换为可直接渲染的行数据（键、值、逗号、折叠摘要与高亮分段）

use crate::model::flatten::{DisplayLine, LineContent, LineKey};
use crate::model::highlight::{segments, Segment};
use crate::model::node::{format_number, JsonNode};
use crate::model::path::NodePath;
use crate::model::session::{DocumentState, ViewerSession};

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "文档加载完成";
pub const STATUS_UNREADABLE: &str = "无法读取输入";
pub const STATUS_INVALID: &str = "解析错误";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Opening { expanded: bool },
    Value,
    Closing,
}

/// 一行渲染数据
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    pub id: String,
    pub path: NodePath,
    pub line_number: usize,
    pub depth: usize,
    pub kind: RowKind,
    /// 带引号的键名分段；数组元素与根节点没有键
    pub key: Option<Vec<Segment>>,
    /// 值、括号或折叠摘要
    pub body: Vec<Segment>,
    /// 逗号或折叠注释（` // 3 items`）
    pub suffix: String,
    pub is_current_match: bool,
}

impl RowData {
    /// 由显示行构建行数据，高亮使用会话当前查询
    pub fn build(line: &DisplayLine<'_>, session: &ViewerSession) -> Self {
        let query = session.query();
        let key_segments = |key: Option<LineKey<'_>>| {
            key.and_then(|k| k.member())
                .map(|k| segments(&format!("\"{}\"", k), k, query))
        };

        let (kind, key, body, suffix) = match &line.content {
            LineContent::Opening { key, node, bracket } => {
                let expanded = session.is_expanded(line.path.as_str());
                let (body, suffix) = if expanded {
                    (vec![plain(bracket.to_string())], String::new())
                } else {
                    collapsed_summary(node, *bracket)
                };
                (RowKind::Opening { expanded }, key_segments(*key), body, suffix)
            }
            LineContent::Value { key, node, is_last } => {
                let display = node.display_value();
                let body = match node {
                    JsonNode::String(s) => segments(&display, s, query),
                    JsonNode::Number(n) => segments(&display, &format_number(*n), query),
                    _ => vec![plain(display)],
                };
                (RowKind::Value, key_segments(*key), body, comma(*is_last))
            }
            LineContent::Closing { bracket, is_last } => (
                RowKind::Closing,
                None,
                vec![plain(bracket.to_string())],
                comma(*is_last),
            ),
        };

        Self {
            id: line.id.clone(),
            path: line.path.clone(),
            line_number: line.line_number,
            depth: line.depth,
            kind,
            key,
            body,
            suffix,
            is_current_match: !matches!(kind, RowKind::Closing)
                && session.is_current_match(line.path.as_str()),
        }
    }

    /// 纯文本形式（不含行号），`indent` 为每层缩进空格数
    pub fn text(&self, indent: usize) -> String {
        let mut out = " ".repeat(self.depth * indent);
        if let Some(key) = &self.key {
            key.iter().for_each(|s| out.push_str(&s.text));
            out.push_str(": ");
        }
        self.body.iter().for_each(|s| out.push_str(&s.text));
        out.push_str(&self.suffix);
        out
    }

    pub fn has_highlight(&self) -> bool {
        self.key.iter().flatten().chain(&self.body).any(|s| s.is_match)
    }
}

fn plain(text: String) -> Segment {
    Segment {
        text,
        is_match: false,
    }
}

fn comma(is_last: bool) -> String {
    if is_last { String::new() } else { ",".to_string() }
}

/// 折叠摘要：`{...}` / `[...]` 加上子元素数量注释
fn collapsed_summary(node: &JsonNode, bracket: char) -> (Vec<Segment>, String) {
    let (close, label) = match bracket {
        '{' => ('}', "keys"),
        _ => (']', "items"),
    };
    (
        vec![plain(format!("{}...{}", bracket, close))],
        format!(" // {} {}", node.child_count(), label),
    )
}

/// 构建当前所有可见行
pub fn build_rows(session: &ViewerSession) -> Vec<RowData> {
    session
        .visible_lines()
        .iter()
        .map(|line| RowData::build(line, session))
        .collect()
}

/// “X/N” 匹配指示；无查询时为 None
pub fn match_indicator(session: &ViewerSession) -> Option<String> {
    if session.query().is_empty() {
        return None;
    }
    let current = session.current_match_index().map_or(0, |i| i + 1);
    Some(format!("{}/{}", current, session.match_count()))
}

/// 状态栏文本
pub fn status_message(session: &ViewerSession) -> String {
    match session.state() {
        DocumentState::Empty => STATUS_READY.to_string(),
        DocumentState::Loaded(_) => STATUS_LOADED.to_string(),
        DocumentState::Unreadable { message } => {
            format!("{}{}: {}", STATUS_ERROR_PREFIX, STATUS_UNREADABLE, message)
        }
        DocumentState::Invalid { message, .. } => {
            format!("{}{}: {}", STATUS_ERROR_PREFIX, STATUS_INVALID, message)
        }
    }
}
