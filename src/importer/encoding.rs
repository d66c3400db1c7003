// ==========================================
// 分隔文本导入核心 - 表头检查与行转码
// ==========================================
// 职责: 表头列集合校验 + 候选编码探测（仅表头行）
//       数据行从源编码转为规范编码（逐行）
// 探测方向: 将期望列名（规范编码）编码为各候选编码，
//           与原始表头字节逐列比较，声明顺序中首个完全匹配者胜出
// ==========================================

use crate::config::ImportConfig;
use crate::domain::record::RawRow;
use crate::importer::error::{ImportError, ImporterResult};
use encoding_rs::Encoding;
use std::collections::HashMap;
use tracing::debug;

/// 按 WHATWG 标签解析编码
///
/// 仅接受可双向转换的编码（UTF-16LE/BE、replacement 的输出编码不是自身，拒绝）。
pub fn resolve_encoding(label: &str) -> ImporterResult<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ImportError::UnknownEncoding(label.to_string()))?;

    if encoding.output_encoding() != encoding {
        return Err(ImportError::UnsupportedEncoding(encoding.name().to_string()));
    }

    Ok(encoding)
}

/// 去除单元格首尾 ASCII 空白
pub(crate) fn trim_cell(cell: &[u8], trim: bool) -> &[u8] {
    if trim {
        cell.trim_ascii()
    } else {
        cell
    }
}

// ==========================================
// 表头检查
// ==========================================

/// 将期望列名编码为目标编码（存在不可映射字符时返回 None）
fn encode_columns(columns: &[String], encoding: &'static Encoding) -> Option<Vec<Vec<u8>>> {
    columns
        .iter()
        .map(|column| {
            let (bytes, _, unmappable) = encoding.encode(column);
            if unmappable {
                None
            } else {
                Some(bytes.into_owned())
            }
        })
        .collect()
}

/// 多重集差异（记录下标）
#[derive(Debug, Default)]
struct HeaderDiff {
    missing: Vec<usize>,    // expected 中未被匹配的下标
    unexpected: Vec<usize>, // 表头中多出的下标
}

impl HeaderDiff {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    fn size(&self) -> usize {
        self.missing.len() + self.unexpected.len()
    }
}

fn multiset_diff(expected: &[Vec<u8>], actual: &[&[u8]]) -> HeaderDiff {
    let mut remaining: HashMap<&[u8], Vec<usize>> = HashMap::new();
    for (idx, cell) in actual.iter().enumerate().rev() {
        remaining.entry(*cell).or_default().push(idx);
    }

    let mut diff = HeaderDiff::default();
    for (idx, column) in expected.iter().enumerate() {
        let matched = remaining
            .get_mut(column.as_slice())
            .and_then(|indices| indices.pop());
        if matched.is_none() {
            diff.missing.push(idx);
        }
    }

    diff.unexpected = remaining.into_values().flatten().collect();
    diff.unexpected.sort_unstable();
    diff
}

/// 检查表头并探测源编码
///
/// # 参数
/// - header: 表头行原始字节
/// - config: 导入配置
/// - candidates: 已解析的候选编码（声明顺序）
///
/// # 返回
/// - Ok(&Encoding): 探测到的源编码
/// - Err(ColumnMismatch): 任一候选编码下列集合都不一致
/// - Err(EncodingUndetected): 列集合一致，但没有候选编码能逐列顺序匹配
pub fn inspect_header(
    header: &RawRow,
    config: &ImportConfig,
    candidates: &[&'static Encoding],
) -> ImporterResult<&'static Encoding> {
    let cells: Vec<&[u8]> = header
        .iter()
        .map(|cell| trim_cell(cell, config.trim_cells))
        .collect();

    let encoded: Vec<(&'static Encoding, Vec<Vec<u8>>)> = candidates
        .iter()
        .filter_map(|encoding| {
            encode_columns(&config.expected_columns, *encoding).map(|cols| (*encoding, cols))
        })
        .collect();

    // 步骤 1: 列集合校验（与顺序无关）
    let diffs: Vec<(&'static Encoding, HeaderDiff)> = encoded
        .iter()
        .map(|(encoding, expected)| (*encoding, multiset_diff(expected, &cells)))
        .collect();

    if !diffs.iter().any(|(_, diff)| diff.is_empty()) {
        return Err(column_mismatch(config, &cells, &diffs));
    }

    // 步骤 2: 编码探测（逐列、按顺序）
    for (encoding, expected) in &encoded {
        let matches = expected.len() == cells.len()
            && expected
                .iter()
                .zip(&cells)
                .all(|(expected_cell, cell)| expected_cell.as_slice() == *cell);
        if matches {
            debug!(encoding = encoding.name(), "表头编码探测命中");
            return Ok(*encoding);
        }
        debug!(encoding = encoding.name(), "表头编码探测未命中");
    }

    Err(ImportError::EncodingUndetected {
        candidates: candidates.iter().map(|e| e.name().to_string()).collect(),
    })
}

/// 构造列不匹配错误（取差异最小的候选编码来描述）
fn column_mismatch(
    config: &ImportConfig,
    cells: &[&[u8]],
    diffs: &[(&'static Encoding, HeaderDiff)],
) -> ImportError {
    let (encoding, diff) = match diffs.iter().min_by_key(|(_, diff)| diff.size()) {
        Some((encoding, diff)) => (*encoding, diff),
        None => {
            // 期望列名在所有候选编码下都不可映射
            return ImportError::ColumnMismatch {
                missing: config.expected_columns.clone(),
                unexpected: cells
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect(),
            };
        }
    };

    ImportError::ColumnMismatch {
        missing: diff
            .missing
            .iter()
            .map(|&idx| config.expected_columns[idx].clone())
            .collect(),
        unexpected: diff
            .unexpected
            .iter()
            .map(|&idx| {
                encoding
                    .decode_without_bom_handling(cells[idx])
                    .0
                    .into_owned()
            })
            .collect(),
    }
}

// ==========================================
// 行转码
// ==========================================

/// 转码失败信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeFailure {
    pub column: usize,          // 出错列（1 起）
    pub encoding: &'static str, // 源编码名
}

/// 将一行从源编码转为规范编码（UTF-8）
///
/// 严格解码（不做替换字符），任一单元格含非法字节序列即视为转码失败。
pub fn transcode_row(
    row: &RawRow,
    from: &'static Encoding,
    trim: bool,
) -> Result<Vec<String>, TranscodeFailure> {
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            from.decode_without_bom_handling_and_without_replacement(trim_cell(cell, trim))
                .map(|text| text.into_owned())
                .ok_or(TranscodeFailure {
                    column: idx + 1,
                    encoding: from.name(),
                })
        })
        .collect()
}
