// ==========================================
// 分隔文本导入核心 - 核心库
// ==========================================
// 职责: 未知编码的分隔文本 → 表头校验 → 编码探测 → 逐行转码 / 映射 / 校验
//       → 结构化导入结果
// 定位: 通用导入核心，具体 schema 由调用方提供
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与结果
pub mod domain;

// 导入层 - 行遍历状态机
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{ImportResult, ImportStatus, RawRow, Record};

// 配置
pub use config::{ImportConfig, SchemaFile};

// 导入器
pub use importer::{
    CsvRowSource, ErrorKind, ErrorSink, ImportError, ImportSchema, Importer, MemoryRowSource,
    RowSource, TracingErrorSink,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
