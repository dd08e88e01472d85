//! 性能基准测试模块
//!
//! 生成大型合成文档，测量解析、节点树构建、扁平化与搜索的耗时；
//! 扁平化与搜索需在一帧之内完成

use std::time::Instant;

use serde_json::{json, Value};

use crate::model::flatten::{flatten, ExpansionSet};
use crate::model::node::JsonNode;
use crate::model::search::search;

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试JSON数据
pub fn generate_large_json(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("leaf value");
        }

        let mut obj = serde_json::Map::new();
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("string_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                _ => create_nested_object(current_depth + 1, max_depth, width / 2),
            };
            obj.insert(key, value);
        }
        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "depth": depth,
            "width": width,
            "description": "synthetic outline document"
        }),
    );
    root.insert("data".to_string(), create_nested_object(0, depth, width));

    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("item_{}", i),
                "value": i * 2,
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试节点树构建性能
pub fn benchmark_node_build(json_data: &Value) -> (JsonNode, PerformanceResult) {
    let start = Instant::now();
    let node = JsonNode::parse(json_data);
    let duration = start.elapsed();

    let details = format!("构建了 {} 个节点，{} 行", node.node_count(), node.total_lines());
    let result = PerformanceResult::new("节点树构建", duration.as_millis(), true, &details);
    (node, result)
}

/// 测试JSON解析性能
pub fn benchmark_json_parsing(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = serde_json::from_str::<Value>(json_str);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            true,
            &format!("解析了 {} 字节的JSON", json_str.len()),
        ),
        Err(e) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试扁平化性能；全部展开时行数必须等于 total_lines
pub fn benchmark_flatten(node: &JsonNode, expanded: &ExpansionSet, label: &str) -> PerformanceResult {
    let start = Instant::now();
    let lines = flatten(node, expanded);
    let duration = start.elapsed();

    PerformanceResult::new(
        &format!("扁平化({})", label),
        duration.as_millis(),
        !lines.is_empty(),
        &format!("输出 {} 行", lines.len()),
    )
}

/// 测试搜索性能
pub fn benchmark_search(node: &JsonNode, query: &str) -> PerformanceResult {
    let start = Instant::now();
    let hits = search(node, query);
    let duration = start.elapsed();

    PerformanceResult::new(
        &format!("搜索: {}", query),
        duration.as_millis(),
        true,
        &format!("匹配 {} 个", hits.len()),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 30), // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        tracing::info!("测试规模：深度{}，宽度{}", depth, width);

        let json_data = generate_large_json(depth, width);
        match serde_json::to_string(&json_data) {
            Ok(json_str) => results.push(benchmark_json_parsing(&json_str)),
            Err(e) => tracing::warn!("序列化失败: {}", e),
        }

        let (node, build) = benchmark_node_build(&json_data);
        results.push(build);
        results.push(benchmark_flatten(&node, &ExpansionSet::all(&node), "全部展开"));
        results.push(benchmark_flatten(&node, &ExpansionSet::root_only(), "仅根"));
        results.push(benchmark_search(&node, "item_1"));
    }

    for r in &results {
        tracing::info!("{}: {}ms ({})", r.operation, r.duration_ms, r.details);
    }
    results
}
