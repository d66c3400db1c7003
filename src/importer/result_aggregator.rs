// ==========================================
// 分隔文本导入核心 - 结果汇总器
// ==========================================
// 职责: 单次遍历内收集成功记录 / 无效行 / 行级警告，计算终态
// 所有权: 由导入器独占持有，结束时按值移出 ImportResult
// ==========================================

use crate::domain::{ImportResult, ImportStatus, Record};
use crate::importer::error::ImportError;
use tracing::warn;

/// 默认终态判定
///
/// # 规则（按序）
/// 1. 无无效行 且 无警告 且 无致命错误 → Success
/// 2. 有警告 → PartiallyError
/// 3. 其他 → Problem（含"有无效行但无警告"）
pub fn default_final_status(result: &ImportResult) -> ImportStatus {
    if result.invalid.is_empty() && result.warnings.is_empty() && result.fatal_error.is_none() {
        ImportStatus::Success
    } else if !result.warnings.is_empty() {
        ImportStatus::PartiallyError
    } else {
        ImportStatus::Problem
    }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: ImportResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            result: ImportResult::new(),
        }
    }

    /// 追加行级警告
    pub fn warn(&mut self, message: String) {
        warn!(warning = %message, "行级警告");
        self.result.warnings.push(message);
    }

    /// 记录某行的校验失败消息
    pub fn record_invalid(&mut self, row_number: usize, messages: Vec<String>) {
        self.result
            .invalid
            .entry(row_number)
            .or_default()
            .extend(messages);
    }

    /// 收集校验通过的记录
    pub fn collect(&mut self, record: Record) {
        self.result.extracted.push(record);
    }

    pub fn set_detected_encoding(&mut self, encoding: &str) {
        self.result.detected_encoding = Some(encoding.to_string());
    }

    /// 当前累计结果（供终态判定读取）
    pub fn result(&self) -> &ImportResult {
        &self.result
    }

    /// 正常结束
    pub fn finalize(mut self, status: ImportStatus) -> ImportResult {
        self.result.status = status;
        self.result
    }

    /// 致命失败结束（状态取自错误类别）
    pub fn fail(mut self, error: ImportError) -> ImportResult {
        self.result.status = error.status();
        self.result.fatal_error = Some(error);
        self.result
    }
}
