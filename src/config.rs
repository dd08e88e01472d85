//! 查看器配置：所有字段均有默认值，可从 JSON 文件部分覆盖

use serde::Deserialize;

/// 原文视图（美化文本）的键顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// 按字母排序（与大纲视图的插入顺序不同）
    #[default]
    Sorted,
    /// 保持原始插入顺序，与大纲视图一致
    Preserved,
}

/// 载入文档后的初始展开方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialExpansion {
    #[default]
    All,
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub raw_key_order: KeyOrder,
    pub initial_expansion: InitialExpansion,
    /// 历史记录最多保留条数
    pub history_limit: usize,
    /// 历史记录最长保留时间（秒）
    pub history_max_age_secs: u64,
    /// 文本渲染时每层缩进的空格数
    pub indent: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            raw_key_order: KeyOrder::Sorted,
            initial_expansion: InitialExpansion::All,
            history_limit: 50,
            history_max_age_secs: 86_400,
            indent: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: ViewerConfig =
            serde_json::from_str(r#"{"raw_key_order": "preserved", "history_limit": 5}"#).unwrap();
        assert_eq!(cfg.raw_key_order, KeyOrder::Preserved);
        assert_eq!(cfg.history_limit, 5);
        assert_eq!(cfg.initial_expansion, InitialExpansion::All);
        assert_eq!(cfg.indent, 2);
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let res = serde_json::from_str::<ViewerConfig>(r#"{"initial_expansion": "half"}"#);
        assert!(res.is_err());
    }
}
