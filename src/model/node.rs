//! 节点模型：不可变的 JSON 标签联合，构建时自底向上预计算子树行数

use serde_json::Value;

/// JSON 节点类型（与 UI 展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

/// 解析后的 JSON 节点。
///
/// 容器的 `total_lines` 为完全展开时所占显示行数：`2 + Σ 子节点行数`，
/// 两行分别是开括号行与闭括号行。叶子节点恒为 1 行。
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Array {
        children: Vec<JsonNode>,
        total_lines: usize,
    },
    Object {
        children: Vec<(String, JsonNode)>,
        total_lines: usize,
    },
}

/// 按固定顺序判别值类型：布尔必须先于数字判断，否则布尔会被渲染成 1/0
fn classify(v: &Value) -> NodeKind {
    if v.is_boolean() {
        NodeKind::Bool
    } else if v.is_number() {
        NodeKind::Number
    } else if v.is_string() {
        NodeKind::String
    } else if v.is_array() {
        NodeKind::Array
    } else if v.is_object() {
        NodeKind::Object
    } else {
        NodeKind::Null
    }
}

impl JsonNode {
    /// 从已解析的 Value 构建节点树；无法识别的值降级为 Null，不报错
    pub fn parse(v: &Value) -> Self {
        match (classify(v), v) {
            (NodeKind::Bool, Value::Bool(b)) => JsonNode::Bool(*b),
            (NodeKind::Number, Value::Number(n)) => match n.as_f64() {
                Some(f) => JsonNode::Number(f),
                None => JsonNode::Null,
            },
            (NodeKind::String, Value::String(s)) => JsonNode::String(s.clone()),
            (NodeKind::Array, Value::Array(items)) => {
                let children: Vec<JsonNode> = items.iter().map(JsonNode::parse).collect();
                JsonNode::array(children)
            }
            (NodeKind::Object, Value::Object(map)) => {
                let children: Vec<(String, JsonNode)> = map
                    .iter()
                    .map(|(k, child)| (k.clone(), JsonNode::parse(child)))
                    .collect();
                JsonNode::object(children)
            }
            _ => JsonNode::Null,
        }
    }

    /// 由子节点构造数组，顺带计算行数
    pub fn array(children: Vec<JsonNode>) -> Self {
        let total_lines = children.iter().fold(2, |acc, c| acc + c.total_lines());
        JsonNode::Array {
            children,
            total_lines,
        }
    }

    /// 由有序键值对构造对象，键顺序原样保留
    pub fn object(children: Vec<(String, JsonNode)>) -> Self {
        let total_lines = children.iter().fold(2, |acc, (_, c)| acc + c.total_lines());
        JsonNode::Object {
            children,
            total_lines,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            JsonNode::String(_) => NodeKind::String,
            JsonNode::Number(_) => NodeKind::Number,
            JsonNode::Bool(_) => NodeKind::Bool,
            JsonNode::Null => NodeKind::Null,
            JsonNode::Array { .. } => NodeKind::Array,
            JsonNode::Object { .. } => NodeKind::Object,
        }
    }

    /// 完全展开时该子树占用的显示行数
    pub fn total_lines(&self) -> usize {
        match self {
            JsonNode::Array { total_lines, .. } | JsonNode::Object { total_lines, .. } => {
                *total_lines
            }
            _ => 1,
        }
    }

    /// 直接子元素数量（对象字段数 / 数组长度），叶子为 0
    pub fn child_count(&self) -> usize {
        match self {
            JsonNode::Array { children, .. } => children.len(),
            JsonNode::Object { children, .. } => children.len(),
            _ => 0,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, JsonNode::Array { .. } | JsonNode::Object { .. })
    }

    /// 子树中的节点总数（含自身）
    pub fn node_count(&self) -> usize {
        match self {
            JsonNode::Array { children, .. } => {
                1 + children.iter().map(JsonNode::node_count).sum::<usize>()
            }
            JsonNode::Object { children, .. } => {
                1 + children.iter().map(|(_, c)| c.node_count()).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// 开括号字符；叶子没有括号
    pub fn open_bracket(&self) -> Option<char> {
        match self {
            JsonNode::Array { .. } => Some('['),
            JsonNode::Object { .. } => Some('{'),
            _ => None,
        }
    }

    /// 叶子的显示文本：字符串带引号，数字取最短十进制形式
    pub fn display_value(&self) -> String {
        match self {
            JsonNode::String(s) => format!("\"{}\"", s),
            JsonNode::Number(n) => format_number(*n),
            JsonNode::Bool(b) => b.to_string(),
            JsonNode::Null => "null".to_string(),
            JsonNode::Array { .. } => "[]".to_string(),
            JsonNode::Object { .. } => "{}".to_string(),
        }
    }
}

impl From<&Value> for JsonNode {
    fn from(v: &Value) -> Self {
        JsonNode::parse(v)
    }
}

/// 数字的十进制字符串形式；整数值不带小数部分（`1` 而非 `1.0`）
pub fn format_number(n: f64) -> String {
    n.to_string()
}
