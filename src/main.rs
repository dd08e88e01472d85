//! 程序入口：初始化日志，读取文档并在终端输出带行号的大纲视图
//!
//! 用法：json_outline [--verbose] [--config <配置文件>] [--raw] [--collapse-all] <文件> [查询]
//!       json_outline --bench

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing_subscriber::fmt::SubscriberBuilder;

use json_outline::model::highlight::Segment;
use json_outline::model::performance::run_performance_suite;
use json_outline::utils::fs::{read_config, read_document_bytes};
use json_outline::vm::bridge::{build_rows, match_indicator, status_message, RowData};
use json_outline::{ViewerConfig, ViewerSession};

const ANSI_MATCH: &str = "\x1b[30;43m";
const ANSI_CURRENT: &str = "\x1b[30;48;5;208m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Default)]
struct Args {
    verbose: bool,
    raw: bool,
    bench: bool,
    collapse_all: bool,
    config: Option<PathBuf>,
    file: Option<PathBuf>,
    query: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--verbose" | "-v" => args.verbose = true,
            "--raw" => args.raw = true,
            "--bench" => args.bench = true,
            "--collapse-all" => args.collapse_all = true,
            "--config" => {
                let p = it.next().context("--config 需要一个文件路径")?;
                args.config = Some(PathBuf::from(p));
            }
            _ if args.file.is_none() => args.file = Some(PathBuf::from(arg)),
            _ if args.query.is_none() => args.query = Some(arg),
            _ => bail!("多余的参数: {}", arg),
        }
    }
    Ok(args)
}

fn paint(segments: &[Segment], current: bool) -> String {
    let mut out = String::new();
    for s in segments {
        if s.is_match {
            out.push_str(if current { ANSI_CURRENT } else { ANSI_MATCH });
            out.push_str(&s.text);
            out.push_str(ANSI_RESET);
        } else {
            out.push_str(&s.text);
        }
    }
    out
}

fn render_row(row: &RowData, indent: usize, width: usize) -> String {
    let mut line = format!(
        "{ANSI_DIM}{:>width$} │{ANSI_RESET} {}",
        row.line_number,
        " ".repeat(row.depth * indent)
    );
    if let Some(key) = &row.key {
        line.push_str(&paint(key, row.is_current_match));
        line.push_str(": ");
    }
    line.push_str(&paint(&row.body, row.is_current_match));
    if row.suffix.starts_with(" //") {
        line.push_str(&format!("{ANSI_DIM}{}{ANSI_RESET}", row.suffix));
    } else {
        line.push_str(&row.suffix);
    }
    line
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    // 日志输出到 stderr，stdout 只保留大纲
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    if args.bench {
        let results = run_performance_suite();
        let failed = results.iter().filter(|r| !r.success).count();
        if failed > 0 {
            bail!("{} 项基准测试失败", failed);
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(p) => read_config(p).with_context(|| format!("读取配置失败: {}", p.display()))?,
        None => ViewerConfig::default(),
    };
    let indent = config.indent;
    let file = args.file.clone().context("缺少输入文件参数")?;

    let bytes = read_document_bytes(&file)
        .with_context(|| format!("读取文件失败: {}", file.display()))?;
    let mut session = ViewerSession::new(config);
    let load_result = session.load_bytes(&bytes);
    eprintln!("{}", status_message(&session));

    if let Err(e) = load_result {
        // 解析失败时仍输出原文，便于检查错误输入
        for (i, line) in session.raw_lines().iter().enumerate() {
            println!("{ANSI_DIM}{:>4} │{ANSI_RESET} {}", i + 1, line);
        }
        return Err(e).with_context(|| format!("无法打开文档: {}", file.display()));
    }

    if args.collapse_all {
        session.collapse_all();
    }
    if let Some(q) = &args.query {
        session.set_query(q);
        if let Some(indicator) = match_indicator(&session) {
            eprintln!("匹配: {}", indicator);
        }
    }

    if args.raw {
        for (i, line) in session.raw_lines().iter().enumerate() {
            println!("{ANSI_DIM}{:>4} │{ANSI_RESET} {}", i + 1, line);
        }
        return Ok(());
    }

    let rows = build_rows(&session);
    let width = rows
        .iter()
        .map(|r| r.line_number.to_string().len())
        .max()
        .unwrap_or(1)
        .max(4);
    for row in &rows {
        println!("{}", render_row(row, indent, width));
    }
    tracing::info!("输出 {} 行", rows.len());
    Ok(())
}
