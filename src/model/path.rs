//! 路径寻址：`root` + `.<key>` / `[<index>]` 拼接而成，是展开状态、搜索结果与滚动定位的唯一标识

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use crate::model::node::JsonNode;

/// 根节点路径标记
pub const ROOT: &str = "root";

/// 闭括号行的标识后缀
const CLOSING_SUFFIX: &str = "_closing";

/// 路径段：对象成员键或数组下标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    pub fn root() -> Self {
        NodePath(ROOT.to_string())
    }

    /// 纯文本拼接，不做任何规范化
    pub fn child(&self, segment: PathSegment<'_>) -> Self {
        match segment {
            PathSegment::Key(k) => NodePath(format!("{}.{}", self.0, k)),
            PathSegment::Index(i) => NodePath(format!("{}[{}]", self.0, i)),
        }
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(PathSegment::Key(key))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    /// 容器闭括号行的标识
    pub fn closing_id(&self) -> String {
        format!("{}{}", self.0, CLOSING_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    /// `self` 是否为 `other` 的真祖先（文本层面：后接分隔符）
    fn is_strict_prefix_of(&self, other: &NodePath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && matches!(other.0.as_bytes()[self.0.len()], b'.' | b'[')
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        NodePath(s.to_string())
    }
}

impl From<String> for NodePath {
    fn from(s: String) -> Self {
        NodePath(s)
    }
}

/// 自由函数形式的子路径构造
pub fn child_path(parent: &NodePath, segment: PathSegment<'_>) -> NodePath {
    parent.child(segment)
}

/// 遍历所有节点收集路径（用于“全部展开”）
pub fn collect_all_paths(node: &JsonNode, start: &NodePath) -> HashSet<NodePath> {
    let mut out = HashSet::with_capacity(node.node_count());
    collect_into(node, start, &mut out);
    out
}

fn collect_into(node: &JsonNode, path: &NodePath, out: &mut HashSet<NodePath>) {
    out.insert(path.clone());
    match node {
        JsonNode::Array { children, .. } => {
            for (i, child) in children.iter().enumerate() {
                collect_into(child, &path.index(i), out);
            }
        }
        JsonNode::Object { children, .. } => {
            for (k, child) in children {
                collect_into(child, &path.key(k), out);
            }
        }
        _ => {}
    }
}

/// 沿树把目标路径分解为从根开始的路径链（含目标自身）。
///
/// 键本身可能含 `.` 或 `[`，纯文本切分会得到错误前缀，因此按树结构逐层匹配，
/// 只进入文本上是目标前缀的子节点，必要时回溯。
pub fn path_chain(root: &JsonNode, root_path: &NodePath, target: &NodePath) -> Option<Vec<NodePath>> {
    walk_to(root, root_path, target).map(|(chain, _)| chain)
}

/// 按路径查找节点
pub fn resolve<'a>(root: &'a JsonNode, target: &NodePath) -> Option<&'a JsonNode> {
    walk_to(root, &NodePath::root(), target).map(|(_, node)| node)
}

fn walk_to<'a>(
    root: &'a JsonNode,
    root_path: &NodePath,
    target: &NodePath,
) -> Option<(Vec<NodePath>, &'a JsonNode)> {
    let mut chain = vec![root_path.clone()];
    if root_path == target {
        return Some((chain, root));
    }
    if !root_path.is_strict_prefix_of(target) {
        return None;
    }
    descend(root, root_path, target, &mut chain).map(|node| (chain, node))
}

fn descend<'a>(
    node: &'a JsonNode,
    path: &NodePath,
    target: &NodePath,
    chain: &mut Vec<NodePath>,
) -> Option<&'a JsonNode> {
    let visit = |child: &'a JsonNode, child_path: NodePath, chain: &mut Vec<NodePath>| {
        if &child_path == target {
            chain.push(child_path);
            return Some(child);
        }
        if child_path.is_strict_prefix_of(target) {
            chain.push(child_path.clone());
            let found = descend(child, &child_path, target, chain);
            if found.is_none() {
                chain.pop();
            }
            return found;
        }
        None
    };
    match node {
        JsonNode::Array { children, .. } => children
            .iter()
            .enumerate()
            .find_map(|(i, child)| visit(child, path.index(i), chain)),
        JsonNode::Object { children, .. } => children
            .iter()
            .find_map(|(k, child)| visit(child, path.key(k), chain)),
        _ => None,
    }
}
