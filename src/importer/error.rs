// ==========================================
// 分隔文本导入核心 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: ErrorKind（配置 / 表头 / 其他），按类别映射终态状态码
// ==========================================

use crate::domain::types::ImportStatus;
use thiserror::Error;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration, // 处理前的配置错误，不重试
    Column,        // 表头校验 / 编码探测失败
    Unclassified,  // 处理中其他不可恢复错误
}

/// 导入模块错误类型
///
/// 外部错误统一以字符串捕获，保证结果可比较、可克隆。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    // ===== 配置错误 =====
    #[error("expected_columns is empty")]
    EmptyExpectedColumns,

    #[error("field_names is empty")]
    EmptyFieldNames,

    #[error("expected_columns has {columns} entries but field_names has {fields}")]
    ColumnFieldCountMismatch { columns: usize, fields: usize },

    #[error("candidate_encodings is empty")]
    NoCandidateEncodings,

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("encoding cannot be used for header detection: {0}")]
    UnsupportedEncoding(String),

    #[error("canonical encoding must be UTF-8, got {0}")]
    NonUtf8CanonicalEncoding(String),

    #[error("header_row_number must be at least 1")]
    InvalidHeaderRowNumber,

    #[error("max_rows ({max_rows}) must be greater than header_row_number ({header_row_number})")]
    MaxRowsTooSmall {
        max_rows: usize,
        header_row_number: usize,
    },

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),

    #[error("duplicate field name: {0}")]
    DuplicateFieldName(String),

    #[error("validation rules reference unknown field: {0}")]
    UnknownRuleField(String),

    #[error("invalid rule {rule:?} on field {field}: {message}")]
    InvalidRule {
        field: String,
        rule: String,
        message: String,
    },

    #[error("failed to read schema file {path}: {message}")]
    ConfigReadError { path: String, message: String },

    // ===== 表头错误 =====
    #[error("header does not match expected columns (missing: {missing:?}, unexpected: {unexpected:?})")]
    ColumnMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("header matches no candidate encoding (tried: {candidates:?})")]
    EncodingUndetected { candidates: Vec<String> },

    #[error("input ended before header row {0}")]
    HeaderRowMissing(usize),

    // ===== 其他错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::EmptyExpectedColumns
            | ImportError::EmptyFieldNames
            | ImportError::ColumnFieldCountMismatch { .. }
            | ImportError::NoCandidateEncodings
            | ImportError::UnknownEncoding(_)
            | ImportError::UnsupportedEncoding(_)
            | ImportError::NonUtf8CanonicalEncoding(_)
            | ImportError::InvalidHeaderRowNumber
            | ImportError::MaxRowsTooSmall { .. }
            | ImportError::InvalidDelimiter(_)
            | ImportError::DuplicateFieldName(_)
            | ImportError::UnknownRuleField(_)
            | ImportError::InvalidRule { .. }
            | ImportError::ConfigReadError { .. } => ErrorKind::Configuration,

            ImportError::ColumnMismatch { .. }
            | ImportError::EncodingUndetected { .. }
            | ImportError::HeaderRowMissing(_) => ErrorKind::Column,

            ImportError::FileNotFound(_)
            | ImportError::FileReadError(_)
            | ImportError::CsvParseError(_)
            | ImportError::InternalError(_) => ErrorKind::Unclassified,
        }
    }

    /// 该错误对应的终态状态码
    pub fn status(&self) -> ImportStatus {
        match self.kind() {
            ErrorKind::Configuration => ImportStatus::PropertyError,
            ErrorKind::Column => ImportStatus::ColumnError,
            ErrorKind::Unclassified => ImportStatus::Problem,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io) => ImportError::FileReadError(io.to_string()),
            _ => ImportError::CsvParseError(err.to_string()),
        }
    }
}

// schema JSON 解析失败属于配置错误
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigReadError {
            path: "<inline>".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        ImportError::InternalError(format!("{:#}", err))
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_maps_to_status() {
        assert_eq!(
            ImportError::NoCandidateEncodings.status(),
            ImportStatus::PropertyError
        );
        assert_eq!(
            ImportError::ColumnMismatch {
                missing: vec!["age".to_string()],
                unexpected: vec![],
            }
            .status(),
            ImportStatus::ColumnError
        );
        assert_eq!(
            ImportError::HeaderRowMissing(2).status(),
            ImportStatus::ColumnError
        );
        assert_eq!(
            ImportError::CsvParseError("bad quote".to_string()).status(),
            ImportStatus::Problem
        );
    }

    #[test]
    fn test_io_error_is_unclassified() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: ImportError = io.into();
        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_anyhow_error_keeps_context() {
        let err: ImportError = anyhow::anyhow!("disk gone").context("reading row 7").into();
        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert!(err.to_string().contains("reading row 7"));
        assert!(err.to_string().contains("disk gone"));
    }
}
