//! 最近输入记录（仅内存）：去重置顶、数量上限、按时间过期

use std::time::{Duration, SystemTime};

const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 单调递增的记录编号
    pub id: u64,
    pub timestamp: SystemTime,
    pub content: String,
    /// 单行预览：换行替换为空格后取前 30 个字符
    pub preview: String,
}

impl HistoryEntry {
    fn new(id: u64, content: &str, timestamp: SystemTime) -> Self {
        let clean = content.replace('\n', " ");
        let preview: String = clean.trim().chars().take(PREVIEW_CHARS).collect();
        Self {
            id,
            timestamp,
            content: content.to_string(),
            preview,
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    items: Vec<HistoryEntry>,
    limit: usize,
    max_age: Duration,
    next_id: u64,
}

impl History {
    pub fn new(limit: usize, max_age: Duration) -> Self {
        Self {
            items: Vec::new(),
            limit,
            max_age,
            next_id: 0,
        }
    }

    /// 新增记录并置顶；已有相同内容时先移除旧记录
    pub fn add(&mut self, content: &str) {
        self.add_at(content, SystemTime::now());
    }

    pub(crate) fn add_at(&mut self, content: &str, now: SystemTime) {
        self.items.retain(|e| e.content != content);
        self.items.insert(0, HistoryEntry::new(self.next_id, content, now));
        self.next_id += 1;
        if self.items.len() > self.limit {
            self.items.truncate(self.limit);
        }
    }

    /// 清理超过保留时长的记录，返回删除条数
    pub fn prune(&mut self, now: SystemTime) -> usize {
        let before = self.items.len();
        let max_age = self.max_age;
        self.items.retain(|e| match now.duration_since(e.timestamp) {
            Ok(age) => age <= max_age,
            // 时间戳在未来（时钟回拨），保留
            Err(_) => true,
        });
        let removed = before - self.items.len();
        if removed > 0 {
            tracing::debug!("历史记录清理: 删除 {} 条", removed);
        }
        removed
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> History {
        History::new(3, Duration::from_secs(60))
    }

    #[test]
    fn test_duplicate_moves_to_top() {
        let mut h = history();
        h.add("a");
        h.add("b");
        h.add("a");
        let contents: Vec<&str> = h.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = history();
        for c in ["1", "2", "3", "4"] {
            h.add(c);
        }
        let contents: Vec<&str> = h.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["4", "3", "2"]);
    }

    #[test]
    fn test_prune_by_age() {
        let mut h = history();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        h.add_at("old", t0);
        h.add_at("new", t0 + Duration::from_secs(100));
        let removed = h.prune(t0 + Duration::from_secs(120));
        assert_eq!(removed, 1);
        assert_eq!(h.entries()[0].content, "new");
    }

    #[test]
    fn test_preview_single_line() {
        let mut h = history();
        h.add("{\n  \"key\": \"a very long value that goes on\"\n}");
        let preview = &h.entries()[0].preview;
        assert!(!preview.contains('\n'));
        assert_eq!(preview.chars().count(), 30);
        assert!(preview.starts_with("{   \"key\""));
    }
}
