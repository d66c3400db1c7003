// ==========================================
// 分隔文本导入核心 - 导入结果模型
// ==========================================
// 用途: execute 的唯一返回值
// 生命周期: execute 开始时初始化为空，单次遍历内由汇总器写入，
//           返回后归调用方所有，不再被修改
// ==========================================

use crate::domain::record::Record;
use crate::domain::types::ImportStatus;
use crate::importer::error::ImportError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

// ==========================================
// ImportResult - 导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    pub status: ImportStatus,                 // 终态状态码
    pub extracted: Vec<Record>,               // 校验通过的记录（按行序）
    pub invalid: BTreeMap<usize, Vec<String>>, // 行号 → 校验失败消息
    pub warnings: Vec<String>,                // 行级警告
    #[serde(serialize_with = "serialize_fatal_error")]
    pub fatal_error: Option<ImportError>,     // 仅配置/表头/不可恢复错误时设置
    pub detected_encoding: Option<String>,    // 探测到的源编码
}

impl ImportResult {
    /// 创建空结果（状态在终态判定前保持 Problem）
    pub fn new() -> Self {
        Self {
            status: ImportStatus::Problem,
            extracted: Vec::new(),
            invalid: BTreeMap::new(),
            warnings: Vec::new(),
            fatal_error: None,
            detected_encoding: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 汇总统计（日志用）
    pub fn invalid_row_count(&self) -> usize {
        self.invalid.len()
    }
}

impl Default for ImportResult {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_fatal_error<S: Serializer>(
    error: &Option<ImportError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_empty() {
        let result = ImportResult::new();
        assert!(result.extracted.is_empty());
        assert!(result.invalid.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.fatal_error.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_result_json_shape() {
        let mut result = ImportResult::new();
        result.status = ImportStatus::ColumnError;
        result.fatal_error = Some(ImportError::HeaderRowMissing(1));
        result.invalid.insert(3, vec!["age must be numeric".to_string()]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], 100);
        assert_eq!(json["invalid"]["3"][0], "age must be numeric");
        assert!(json["fatal_error"].as_str().unwrap().contains("1"));
        assert!(json["detected_encoding"].is_null());
    }
}
