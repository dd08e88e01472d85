//! IO helper: read document bytes and viewer config from disk

use std::{fs::File, io::BufReader, io::Read, path::Path};

use crate::config::ViewerConfig;
use crate::model::session::ViewerError;

/// 读取文档原始字节；是否为合法文本由会话判定
pub fn read_document_bytes(p: &Path) -> Result<Vec<u8>, ViewerError> {
    let mut buf = Vec::new();
    File::open(p)?.read_to_end(&mut buf)?;
    Ok(buf)
}

/// 从文件读取查看器配置，缺省字段取默认值
pub fn read_config(p: &Path) -> Result<ViewerConfig, ViewerError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).map_err(|e| ViewerError::Config(e.to_string()))
}
