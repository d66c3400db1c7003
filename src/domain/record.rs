// ==========================================
// 分隔文本导入核心 - 行记录模型
// ==========================================
// 用途: 导入管道中间产物（行读取 → 转码 → 字段映射 → 此结构）
// 生命周期: 每行新建，校验后移入导入结果
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 原始行（未解码的单元格字节）
pub type RawRow = Vec<Vec<u8>>;

// ==========================================
// Record - 字段映射后的行记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub row_number: usize,              // 原始文件行号（1 起）
    pub fields: BTreeMap<String, String>, // 标准字段名 → 规范编码下的单元格值
}

impl Record {
    /// 创建空记录（字段映射失败时使用）
    pub fn empty(row_number: usize) -> Self {
        Self {
            row_number,
            fields: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 读取字段值（字段不存在返回 None）
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors() {
        let mut record = Record::empty(2);
        assert!(record.is_empty());

        record.insert("name", "Alice");
        record.insert("age", "30");

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("name"), Some("Alice"));
        assert_eq!(record.get("missing"), None);
    }
}
