// ==========================================
// 分隔文本导入核心 - 领域类型定义
// ==========================================
// 职责: 导入终态状态码
// 兼容: 状态码数值对外保持不变（HTTP/CLI 消费方按整数解析）
// ==========================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ==========================================
// 导入状态 (Import Status)
// ==========================================
// 序列化格式: 整数状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportStatus {
    Success,        // 无无效行、无警告、无致命错误
    PartiallyError, // 存在行级警告，但处理完成
    PropertyError,  // 配置不变量违反（处理前）
    ColumnError,    // 表头不匹配 / 编码无法识别
    Problem,        // 其他不可恢复错误
}

impl ImportStatus {
    /// 对外状态码
    pub const fn code(self) -> u16 {
        match self {
            ImportStatus::Success => 200,
            ImportStatus::PartiallyError => 105,
            ImportStatus::PropertyError => 5,
            ImportStatus::ColumnError => 100,
            ImportStatus::Problem => 0,
        }
    }

    /// 从状态码解析（未知状态码返回 None）
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(ImportStatus::Success),
            105 => Some(ImportStatus::PartiallyError),
            5 => Some(ImportStatus::PropertyError),
            100 => Some(ImportStatus::ColumnError),
            0 => Some(ImportStatus::Problem),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        self == ImportStatus::Success
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Success => write!(f, "SUCCESS"),
            ImportStatus::PartiallyError => write!(f, "PARTIALLY_ERROR"),
            ImportStatus::PropertyError => write!(f, "PROPERTY_ERROR"),
            ImportStatus::ColumnError => write!(f, "COLUMN_ERROR"),
            ImportStatus::Problem => write!(f, "PROBLEM"),
        }
    }
}

impl Serialize for ImportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for ImportStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(deserializer)?;
        ImportStatus::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("未知状态码: {}", code)))
    }
}
