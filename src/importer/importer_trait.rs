// ==========================================
// 分隔文本导入核心 - 导入 Trait
// ==========================================
// 职责: 定义具体 schema 的能力接口（带默认实现的覆写点）
//       以及致命错误上报接口
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{ImportResult, ImportStatus, Record};
use crate::importer::error::ImportError;
use crate::importer::result_aggregator::default_final_status;
use crate::importer::rule_validator::{MessageMap, RuleMap};
use tracing::error;

// ==========================================
// ImportSchema Trait
// ==========================================
// 用途: 具体导入 schema 的配置与覆写点
// 实现者: SchemaFile，或调用方自定义结构
pub trait ImportSchema: Send + Sync {
    /// schema 名称（日志与错误上报的标识）
    fn name(&self) -> &str {
        "import"
    }

    /// 导入配置（运行期间不可变）
    fn config(&self) -> &ImportConfig;

    /// 字段校验规则（字段名 → 规则表达式）
    fn rules(&self) -> RuleMap {
        RuleMap::new()
    }

    /// 校验消息模板（"字段.规则" 或 "规则" → 模板）
    fn messages(&self) -> MessageMap {
        MessageMap::new()
    }

    /// 截断判定
    ///
    /// # 默认
    /// - row_number >= max_rows 时停止遍历
    fn should_break(&self, row_number: usize, config: &ImportConfig) -> bool {
        row_number >= config.max_rows
    }

    /// 跳过判定（表头检查之后执行）
    ///
    /// # 默认
    /// - 仅跳过表头行
    fn should_skip(&self, row_number: usize, config: &ImportConfig) -> bool {
        row_number == config.header_row_number
    }

    /// 记录收集前的后处理
    fn post_process(&self, record: Record) -> Record {
        record
    }

    /// 终态判定（仅在无致命错误时调用）
    fn final_status(&self, result: &ImportResult) -> ImportStatus {
        default_final_status(result)
    }
}

// ==========================================
// ErrorSink Trait
// ==========================================
// 用途: 致命错误上报（每次致命失败调用一次，尽力而为）
// 实现者: TracingErrorSink
pub trait ErrorSink: Send + Sync {
    /// 上报致命错误
    ///
    /// # 参数
    /// - identifier: 上报标识（schema 名称）
    /// - error: 致命错误
    ///
    /// # 返回
    /// - Err: 上报自身失败（导入方仅记录，不影响结果）
    fn report(&self, identifier: &str, error: &ImportError) -> anyhow::Result<()>;
}

/// 默认上报：写入 tracing 日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, identifier: &str, err: &ImportError) -> anyhow::Result<()> {
        error!(
            identifier = identifier,
            kind = ?err.kind(),
            status = err.status().code(),
            error = %err,
            "导入失败"
        );
        Ok(())
    }
}
