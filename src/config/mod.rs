// ==========================================
// 分隔文本导入核心 - 配置层
// ==========================================
// 职责: 导入配置定义与校验、schema 文件加载
// 存储: JSON schema 文件
// ==========================================

pub mod import_config;
pub mod schema_file;

// 重导出核心配置类型
pub use import_config::{
    ImportConfig, DEFAULT_CANONICAL_ENCODING, DEFAULT_HEADER_ROW_NUMBER, DEFAULT_MAX_ROWS,
};
pub use schema_file::SchemaFile;
