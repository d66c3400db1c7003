// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时 CSV 文件、编码后的测试数据、常用 schema
// ==========================================

#![allow(dead_code)]

use encoding_rs::Encoding;
use std::error::Error;
use std::io::Write;
use tabular_import::importer::ImporterResult;
use tabular_import::{ImportConfig, RawRow, RowSource, SchemaFile};
use tempfile::NamedTempFile;

/// 将多行文本按指定编码写入字节（每行以 \n 结尾）
pub fn encode_lines(lines: &[&str], encoding: &'static Encoding) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in lines {
        let (encoded, _, unmappable) = encoding.encode(line);
        assert!(!unmappable, "测试数据无法以 {} 编码: {}", encoding.name(), line);
        bytes.extend_from_slice(&encoded);
        bytes.push(b'\n');
    }
    bytes
}

/// 创建临时 CSV 文件
///
/// # 返回
/// - NamedTempFile: 临时文件（需要保持存活）
pub fn write_csv(bytes: &[u8]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    Ok(temp_file)
}

/// name/age 两列的 schema，age 要求为数值
pub fn people_schema() -> SchemaFile {
    SchemaFile::new(
        "people",
        ImportConfig::new(["name", "age"], ["name", "age"], ["UTF-8"]),
    )
    .with_rule("age", "numeric")
}

/// 日文表头的 schema（候选编码可指定）
pub fn japanese_schema(candidates: &[&str]) -> SchemaFile {
    SchemaFile::new(
        "members",
        ImportConfig::new(
            ["氏名", "年齢"],
            ["name", "age"],
            candidates.iter().copied(),
        ),
    )
    .with_rule("name", "required")
    .with_rule("age", "integer")
}

/// 记录读取次数的行数据源（用于断言"未读取任何行"）
pub struct CountingSource<S> {
    pub inner: S,
    pub reads: usize,
}

impl<S: RowSource> RowSource for CountingSource<S> {
    fn next_row(&mut self) -> Option<ImporterResult<RawRow>> {
        self.reads += 1;
        self.inner.next_row()
    }

    fn row_number(&self) -> usize {
        self.inner.row_number()
    }
}
