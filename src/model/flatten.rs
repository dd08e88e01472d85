//! 扁平化引擎：{节点树, 展开集合} → 有序显示行
//!
//! 行号按“完全展开后美化输出”的文档行号编排：折叠的容器只输出一行开括号，
//! 但其后兄弟节点的行号仍跳过被折叠子树的全部行，闭括号行号由
//! `父行号 + total_lines - 1` 推出。折叠子树不会被遍历。

use std::collections::HashSet;

use crate::model::node::JsonNode;
use crate::model::path::{collect_all_paths, NodePath};

/// 当前展开的路径集合；默认只含根
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionSet {
    paths: HashSet<NodePath>,
}

impl Default for ExpansionSet {
    fn default() -> Self {
        Self::root_only()
    }
}

impl ExpansionSet {
    pub fn root_only() -> Self {
        let mut paths = HashSet::new();
        paths.insert(NodePath::root());
        Self { paths }
    }

    /// 展开树中所有路径
    pub fn all(node: &JsonNode) -> Self {
        Self {
            paths: collect_all_paths(node, &NodePath::root()),
        }
    }

    pub fn empty() -> Self {
        Self {
            paths: HashSet::new(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn insert(&mut self, path: NodePath) -> bool {
        self.paths.insert(path)
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    /// 切换展开状态，返回切换后是否展开
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        if self.paths.remove(path.as_str()) {
            false
        } else {
            self.paths.insert(path.clone());
            true
        }
    }

    pub fn extend<I: IntoIterator<Item = NodePath>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// 行前键：对象成员名或数组下标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKey<'a> {
    Member(&'a str),
    Index(usize),
}

impl<'a> LineKey<'a> {
    /// 对象成员名；数组下标返回 None
    pub fn member(&self) -> Option<&'a str> {
        match *self {
            LineKey::Member(k) => Some(k),
            LineKey::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineContent<'a> {
    Opening {
        key: Option<LineKey<'a>>,
        node: &'a JsonNode,
        bracket: char,
    },
    Value {
        key: Option<LineKey<'a>>,
        node: &'a JsonNode,
        is_last: bool,
    },
    Closing {
        bracket: char,
        is_last: bool,
    },
}

/// 一行显示内容；每次扁平化重新生成
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLine<'a> {
    /// 行标识：节点路径，闭括号行为 `<path>_closing`
    pub id: String,
    /// 所属节点路径（闭括号行指向其容器）
    pub path: NodePath,
    /// 嵌套深度，根为 0
    pub depth: usize,
    /// 文档行号，从 1 开始
    pub line_number: usize,
    pub content: LineContent<'a>,
}

impl<'a> DisplayLine<'a> {
    pub fn is_opening(&self) -> bool {
        matches!(self.content, LineContent::Opening { .. })
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.content, LineContent::Closing { .. })
    }
}

/// 扁平化整棵树，根路径为 `root`，起始行号为 1
pub fn flatten<'a>(node: &'a JsonNode, expanded: &ExpansionSet) -> Vec<DisplayLine<'a>> {
    let mut lines = Vec::new();
    let mut cx = FlattenCx {
        expanded,
        lines: &mut lines,
    };
    cx.walk(node, None, NodePath::root(), 0, 1, true);
    lines
}

struct FlattenCx<'s, 'a> {
    expanded: &'s ExpansionSet,
    lines: &'s mut Vec<DisplayLine<'a>>,
}

impl<'s, 'a> FlattenCx<'s, 'a> {
    fn walk(
        &mut self,
        node: &'a JsonNode,
        key: Option<LineKey<'a>>,
        path: NodePath,
        depth: usize,
        line_number: usize,
        is_last: bool,
    ) {
        let Some(bracket) = node.open_bracket() else {
            self.lines.push(DisplayLine {
                id: path.as_str().to_string(),
                path,
                depth,
                line_number,
                content: LineContent::Value { key, node, is_last },
            });
            return;
        };

        let is_expanded = self.expanded.contains(path.as_str());
        self.lines.push(DisplayLine {
            id: path.as_str().to_string(),
            path: path.clone(),
            depth,
            line_number,
            content: LineContent::Opening { key, node, bracket },
        });
        if !is_expanded {
            return;
        }

        let mut current = line_number + 1;
        match node {
            JsonNode::Array { children, .. } => {
                let last = children.len().saturating_sub(1);
                for (i, child) in children.iter().enumerate() {
                    self.walk(
                        child,
                        Some(LineKey::Index(i)),
                        path.index(i),
                        depth + 1,
                        current,
                        i == last,
                    );
                    current += child.total_lines();
                }
            }
            JsonNode::Object { children, .. } => {
                let last = children.len().saturating_sub(1);
                for (i, (k, child)) in children.iter().enumerate() {
                    self.walk(
                        child,
                        Some(LineKey::Member(k)),
                        path.key(k),
                        depth + 1,
                        current,
                        i == last,
                    );
                    current += child.total_lines();
                }
            }
            _ => {}
        }

        self.lines.push(DisplayLine {
            id: path.closing_id(),
            path,
            depth,
            line_number: line_number + node.total_lines() - 1,
            content: LineContent::Closing {
                bracket: closing_bracket(bracket),
                is_last,
            },
        });
    }
}

/// 开括号对应的闭括号
pub fn closing_bracket(open: char) -> char {
    match open {
        '[' => ']',
        '{' => '}',
        other => other,
    }
}
