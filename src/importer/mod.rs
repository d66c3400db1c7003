// ==========================================
// 分隔文本导入核心 - 导入层
// ==========================================
// 职责: 表头校验、编码探测、逐行转码 / 映射 / 校验、结果汇总
// 支持: CSV（任意单字节分隔符）、内存行
// ==========================================

// 模块声明
pub mod encoding;
pub mod error;
pub mod field_mapper;
pub mod importer_impl;
pub mod importer_trait;
pub mod result_aggregator;
pub mod row_source;
pub mod rule_validator;

// 重导出核心类型
pub use encoding::{inspect_header, resolve_encoding, transcode_row, TranscodeFailure};
pub use error::{ErrorKind, ImportError, ImporterResult};
pub use field_mapper::FieldMapper;
pub use importer_impl::Importer;
pub use result_aggregator::{default_final_status, ResultAggregator};
pub use row_source::{CsvRowSource, MemoryRowSource};
pub use rule_validator::{MessageMap, RuleMap, RuleSet};

// 重导出 Trait 接口
pub use importer_trait::{ErrorSink, ImportSchema, TracingErrorSink};
pub use row_source::RowSource;
