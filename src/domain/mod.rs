// ==========================================
// 分隔文本导入核心 - 领域模型层
// ==========================================
// 职责: 定义行记录、导入结果、状态码
// 红线: 不含文件读取逻辑,不含校验逻辑
// ==========================================

pub mod import_result;
pub mod record;
pub mod types;

// 重导出核心类型
pub use import_result::ImportResult;
pub use record::{RawRow, Record};
pub use types::ImportStatus;
