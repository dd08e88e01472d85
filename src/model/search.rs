//! 搜索引擎：深度优先按文档顺序收集匹配路径，并维护可循环的当前匹配游标

use crate::model::node::{format_number, JsonNode};
use crate::model::path::NodePath;

/// 单字符大小写折叠；小写化后变为多个字符的保持原样，保证字符偏移一一对应
pub(crate) fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

pub(crate) fn fold_chars(s: &str) -> Vec<char> {
    s.chars().map(fold_char).collect()
}

/// 在 `hay` 中查找所有不重叠的 `needle`（已折叠），返回字符区间；从匹配末尾继续扫描
pub(crate) fn find_all_folded(hay: &[char], needle: &[char]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if needle.is_empty() || needle.len() > hay.len() {
        return out;
    }
    let mut start = 0;
    while start + needle.len() <= hay.len() {
        if hay[start..start + needle.len()] == *needle {
            out.push((start, start + needle.len()));
            start += needle.len();
        } else {
            start += 1;
        }
    }
    out
}

/// 大小写不敏感的子串判断
pub fn contains_ignore_case(hay: &str, query: &str) -> bool {
    let needle = fold_chars(query);
    !find_all_folded(&fold_chars(hay), &needle).is_empty()
}

/// 按文档顺序返回所有匹配路径；空查询返回空列表
pub fn search(node: &JsonNode, query: &str) -> Vec<NodePath> {
    let mut matches = Vec::new();
    if query.is_empty() {
        return matches;
    }
    let needle = fold_chars(query);
    collect_matches(node, &NodePath::root(), &needle, &mut matches);
    matches
}

fn is_match(text: &str, needle: &[char]) -> bool {
    !find_all_folded(&fold_chars(text), needle).is_empty()
}

fn collect_matches(node: &JsonNode, path: &NodePath, needle: &[char], out: &mut Vec<NodePath>) {
    match node {
        JsonNode::String(s) => {
            if is_match(s, needle) {
                out.push(path.clone());
            }
        }
        JsonNode::Number(n) => {
            if is_match(&format_number(*n), needle) {
                out.push(path.clone());
            }
        }
        JsonNode::Array { children, .. } => {
            for (i, child) in children.iter().enumerate() {
                collect_matches(child, &path.index(i), needle, out);
            }
        }
        JsonNode::Object { children, .. } => {
            for (k, child) in children {
                let child_path = path.key(k);
                // 键命中即记录成员路径，不再深入其值
                if is_match(k, needle) {
                    out.push(child_path);
                } else {
                    collect_matches(child, &child_path, needle, out);
                }
            }
        }
        JsonNode::Bool(_) | JsonNode::Null => {}
    }
}

/// 查询、匹配列表与当前游标
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    matches: Vec<NodePath>,
    current: usize,
}

impl SearchState {
    /// 重新执行查询，游标回到第一个匹配
    pub fn run(&mut self, node: Option<&JsonNode>, query: &str) -> Option<&NodePath> {
        self.query = query.to_string();
        self.current = 0;
        self.matches = match node {
            Some(n) if !query.is_empty() => search(n, query),
            _ => Vec::new(),
        };
        self.matches.first()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.current = 0;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[NodePath] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// 当前游标下标；无匹配时为 None
    pub fn current_index(&self) -> Option<usize> {
        if self.matches.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current(&self) -> Option<&NodePath> {
        self.matches.get(self.current)
    }

    /// 下一个匹配，末尾回绕到开头；无匹配时不动
    pub fn next(&mut self) -> Option<&NodePath> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.matches.get(self.current)
    }

    /// 上一个匹配，开头回绕到末尾
    pub fn previous(&mut self) -> Option<&NodePath> {
        if self.matches.is_empty() {
            return None;
        }
        let n = self.matches.len();
        self.current = (self.current + n - 1) % n;
        self.matches.get(self.current)
    }

    pub fn is_current(&self, path: &str) -> bool {
        self.current().is_some_and(|p| p.as_str() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> JsonNode {
        JsonNode::parse(&json!({"a": 1, "b": [true, null, "x"]}))
    }

    fn as_strs(paths: &[NodePath]) -> Vec<&str> {
        paths.iter().map(NodePath::as_str).collect()
    }

    #[test]
    fn test_bool_and_null_not_matchable() {
        let node = sample();
        // "null"/"true" 只是显示文本，不参与匹配
        assert!(search(&node, "l").is_empty());
        assert!(search(&node, "true").is_empty());
        assert_eq!(as_strs(&search(&node, "x")), vec!["root.b[2]"]);
    }

    #[test]
    fn test_string_value_match_case_insensitive() {
        let node = JsonNode::parse(&json!({"a": 1, "b": [true, "NULL", "x"]}));
        assert_eq!(as_strs(&search(&node, "l")), vec!["root.b[1]"]);
    }

    #[test]
    fn test_key_match_stops_descent() {
        let node = JsonNode::parse(&json!({
            "name": {"name": "inner"},
            "list": [{"title": "Name tag"}]
        }));
        let hits = search(&node, "NAME");
        assert_eq!(as_strs(&hits), vec!["root.name", "root.list[0].title"]);
    }

    #[test]
    fn test_number_match_uses_decimal_form() {
        let node = JsonNode::parse(&json!({"n": 1.5, "m": [10, 20], "k": 3}));
        assert_eq!(as_strs(&search(&node, "1")), vec!["root.n", "root.m[0]"]);
        assert_eq!(as_strs(&search(&node, ".5")), vec!["root.n"]);
        // 整数不带 ".0"
        assert!(search(&node, "3.0").is_empty());
    }

    #[test]
    fn test_search_is_stable_document_order() {
        let node = JsonNode::parse(&json!({
            "z": "ab", "a": ["ab", {"ab": 0}], "m": "xab"
        }));
        let first = search(&node, "ab");
        assert_eq!(as_strs(&first), vec!["root.z", "root.a[0]", "root.a[1].ab", "root.m"]);
        assert_eq!(first, search(&node, "ab"));
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let node = JsonNode::parse(&json!(["a1", "a2", "a3"]));
        let mut state = SearchState::default();
        assert_eq!(state.run(Some(&node), "a").map(NodePath::as_str), Some("root[0]"));
        assert_eq!(state.current_index(), Some(0));

        assert_eq!(state.previous().map(NodePath::as_str), Some("root[2]"));
        assert_eq!(state.current_index(), Some(2));
        assert_eq!(state.next().map(NodePath::as_str), Some("root[0]"));
        state.next();
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn test_single_match_next_stays() {
        let node = JsonNode::parse(&json!({"a": 1, "b": [true, "null", "x"]}));
        let mut state = SearchState::default();
        state.run(Some(&node), "l");
        assert_eq!(state.len(), 1);
        assert_eq!(state.next().map(NodePath::as_str), Some("root.b[1]"));
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn test_navigation_noop_without_matches() {
        let mut state = SearchState::default();
        state.run(None, "abc");
        assert!(state.next().is_none());
        assert!(state.previous().is_none());
        assert_eq!(state.current_index(), None);

        let node = sample();
        state.run(Some(&node), "");
        assert!(state.is_empty());
    }

    #[test]
    fn test_fold_keeps_char_alignment() {
        // 'İ' 小写化为两个字符，折叠时保持原样
        assert_eq!(fold_chars("İa").len(), 2);
        assert!(contains_ignore_case("HeLLo", "ll"));
        assert!(!contains_ignore_case("abc", ""));
        assert_eq!(
            find_all_folded(&fold_chars("aaaa"), &fold_chars("aa")),
            vec![(0, 2), (2, 4)]
        );
    }
}
