// ==========================================
// 分隔文本导入核心 - 字段映射器
// ==========================================
// 职责: 转码后的行 × field_names → Record（按位置对应）
// 规则: 单元格数与字段数不一致 → 空 Record（下游视为提取失败）
// ==========================================

use crate::domain::record::Record;

pub struct FieldMapper;

impl FieldMapper {
    /// 将转码后的行映射为 Record
    ///
    /// # 参数
    /// - values: 转码后的单元格值
    /// - field_names: 标准字段名
    /// - row_number: 行号
    pub fn map_row(&self, values: Vec<String>, field_names: &[String], row_number: usize) -> Record {
        if values.len() != field_names.len() {
            return Record::empty(row_number);
        }

        let mut record = Record::empty(row_number);
        for (name, value) in field_names.iter().zip(values) {
            record.insert(name.clone(), value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_field_mapper_basic() {
        let record = FieldMapper.map_row(
            vec!["Alice".to_string(), "30".to_string()],
            &names(&["name", "age"]),
            2,
        );

        assert_eq!(record.row_number, 2);
        assert_eq!(record.get("name"), Some("Alice"));
        assert_eq!(record.get("age"), Some("30"));
    }

    #[test]
    fn test_field_mapper_cardinality_mismatch() {
        let short = FieldMapper.map_row(vec!["Alice".to_string()], &names(&["name", "age"]), 3);
        assert!(short.is_empty());

        let long = FieldMapper.map_row(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &names(&["name", "age"]),
            4,
        );
        assert!(long.is_empty());
        assert_eq!(long.row_number, 4);
    }
}
