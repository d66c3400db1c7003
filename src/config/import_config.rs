// ==========================================
// 分隔文本导入核心 - 导入配置
// ==========================================
// 职责: 调用方提供的导入 schema（列名 / 字段名 / 候选编码 / 行号边界）
// 红线: 运行期间不可变；任何行读取之前完成校验
// ==========================================

use crate::importer::encoding::resolve_encoding;
use crate::importer::error::{ImportError, ImporterResult};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 默认规范编码
pub const DEFAULT_CANONICAL_ENCODING: &str = "UTF-8";
/// 默认表头行号（1 起）
pub const DEFAULT_HEADER_ROW_NUMBER: usize = 1;
/// 默认最大处理行号
pub const DEFAULT_MAX_ROWS: usize = 1000;

fn default_canonical_encoding() -> String {
    DEFAULT_CANONICAL_ENCODING.to_string()
}

fn default_header_row_number() -> usize {
    DEFAULT_HEADER_ROW_NUMBER
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_delimiter() -> char {
    ','
}

fn default_trim_cells() -> bool {
    true
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 期望的表头值（按顺序）
    pub expected_columns: Vec<String>,

    /// 标准字段名（与 expected_columns 等长，按位置对应）
    pub field_names: Vec<String>,

    /// 候选编码（按声明顺序尝试，先匹配者胜出）
    pub candidate_encodings: Vec<String>,

    /// 规范编码（所有数据统一转为此编码）
    #[serde(default = "default_canonical_encoding")]
    pub canonical_encoding: String,

    /// 表头所在行号（1 起）
    #[serde(default = "default_header_row_number")]
    pub header_row_number: usize,

    /// 最大处理行号（行号 >= 此值时截断）
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// 分隔符（单个 ASCII 字符）
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// 是否去除单元格首尾空白（含表头）
    #[serde(default = "default_trim_cells")]
    pub trim_cells: bool,
}

impl ImportConfig {
    /// 创建配置（其余项取默认值）
    pub fn new<C, F, E>(expected_columns: C, field_names: F, candidate_encodings: E) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            expected_columns: expected_columns.into_iter().map(Into::into).collect(),
            field_names: field_names.into_iter().map(Into::into).collect(),
            candidate_encodings: candidate_encodings.into_iter().map(Into::into).collect(),
            canonical_encoding: default_canonical_encoding(),
            header_row_number: DEFAULT_HEADER_ROW_NUMBER,
            max_rows: DEFAULT_MAX_ROWS,
            delimiter: default_delimiter(),
            trim_cells: default_trim_cells(),
        }
    }

    pub fn with_header_row_number(mut self, header_row_number: usize) -> Self {
        self.header_row_number = header_row_number;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim_cells(mut self, trim_cells: bool) -> Self {
        self.trim_cells = trim_cells;
        self
    }

    pub fn with_canonical_encoding(mut self, canonical_encoding: impl Into<String>) -> Self {
        self.canonical_encoding = canonical_encoding.into();
        self
    }

    /// 校验配置内部一致性
    ///
    /// # 返回
    /// - Ok(()): 配置可用
    /// - Err(ImportError): 第一个违反的不变量（均为配置类错误）
    pub fn validate(&self) -> ImporterResult<()> {
        if self.expected_columns.is_empty() {
            return Err(ImportError::EmptyExpectedColumns);
        }
        if self.field_names.is_empty() {
            return Err(ImportError::EmptyFieldNames);
        }
        if self.expected_columns.len() != self.field_names.len() {
            return Err(ImportError::ColumnFieldCountMismatch {
                columns: self.expected_columns.len(),
                fields: self.field_names.len(),
            });
        }
        if self.candidate_encodings.is_empty() {
            return Err(ImportError::NoCandidateEncodings);
        }

        if self.header_row_number == 0 {
            return Err(ImportError::InvalidHeaderRowNumber);
        }
        if self.max_rows <= self.header_row_number {
            return Err(ImportError::MaxRowsTooSmall {
                max_rows: self.max_rows,
                header_row_number: self.header_row_number,
            });
        }
        if !self.delimiter.is_ascii() {
            return Err(ImportError::InvalidDelimiter(self.delimiter));
        }

        let canonical = resolve_encoding(&self.canonical_encoding)?;
        if canonical != encoding_rs::UTF_8 {
            return Err(ImportError::NonUtf8CanonicalEncoding(
                canonical.name().to_string(),
            ));
        }
        self.resolved_candidates()?;

        let mut seen = HashSet::new();
        for name in &self.field_names {
            if !seen.insert(name.as_str()) {
                return Err(ImportError::DuplicateFieldName(name.clone()));
            }
        }

        Ok(())
    }

    /// 按声明顺序解析候选编码
    pub fn resolved_candidates(&self) -> ImporterResult<Vec<&'static Encoding>> {
        self.candidate_encodings
            .iter()
            .map(|label| resolve_encoding(label))
            .collect()
    }

    /// 分隔符字节（需先通过 validate）
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}
