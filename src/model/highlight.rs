//! 高亮分段：把原始文本中的匹配区间映射到（可能带引号的）显示文本上

use crate::model::search::{find_all_folded, fold_chars};

/// 一段显示文本及其是否属于匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_match: false,
        }
    }
}

/// 生成高亮分段；所有分段顺序拼接后恰为 `display`。
///
/// 原始文本中的字符偏移加上前缀长度（显示文本以引号开头为 1，否则为 0）
/// 即为显示文本偏移，并截断到显示文本长度。无匹配时返回整段非匹配。
pub fn segments(display: &str, searchable: &str, query: &str) -> Vec<Segment> {
    let needle = fold_chars(query);
    let ranges = find_all_folded(&fold_chars(searchable), &needle);
    if ranges.is_empty() {
        return vec![Segment::plain(display)];
    }

    let chars: Vec<char> = display.chars().collect();
    let prefix = usize::from(display.starts_with('"'));
    let slice = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };

    let mut out = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for (lo, hi) in ranges {
        let start = (prefix + lo).min(chars.len());
        let end = (prefix + hi).min(chars.len());
        if cursor < start {
            out.push(Segment::plain(slice(cursor, start)));
        }
        if start < end {
            out.push(Segment {
                text: slice(start, end),
                is_match: true,
            });
        }
        cursor = cursor.max(end);
    }
    if cursor < chars.len() {
        out.push(Segment::plain(slice(cursor, chars.len())));
    }
    if out.is_empty() {
        out.push(Segment::plain(display));
    }
    out
}

/// 是否存在任一匹配分段
pub fn has_match(segments: &[Segment]) -> bool {
    segments.iter().any(|s| s.is_match)
}
