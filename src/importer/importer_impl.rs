// ==========================================
// 分隔文本导入核心 - 导入器实现
// ==========================================
// 职责: 整合导入流程，单次顺序遍历行序列
// 流程: 配置校验 → 打开数据源 → 逐行(截断 → 表头 → 跳过 → 转码 → 映射 → 校验 → 收集)
//       → 终态判定
// 红线: execute 不返回错误、不向外传播 panic，所有失败以结果数据呈现
// ==========================================

use crate::domain::{ImportResult, ImportStatus};
use crate::importer::encoding::{inspect_header, transcode_row};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::importer_trait::{ErrorSink, ImportSchema, TracingErrorSink};
use crate::importer::result_aggregator::ResultAggregator;
use crate::importer::row_source::{CsvRowSource, RowSource};
use crate::importer::rule_validator::RuleSet;
use encoding_rs::Encoding;
use std::any::Any;
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, info, instrument, warn, Span};
use uuid::Uuid;

/// 单次运行的会话状态
struct Session {
    candidates: Vec<&'static Encoding>,
    rules: RuleSet,
    source_encoding: Option<&'static Encoding>, // 表头探测后设置
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: <non-string payload>".to_string()
    }
}

// ==========================================
// Importer - 通用导入器
// ==========================================
pub struct Importer<S: ImportSchema> {
    schema: S,
    error_sink: Box<dyn ErrorSink>,
}

impl<S: ImportSchema> Importer<S> {
    /// 创建导入器（默认错误上报写入 tracing 日志）
    pub fn new(schema: S) -> Self {
        Self {
            schema,
            error_sink: Box::new(TracingErrorSink),
        }
    }

    /// 替换致命错误上报
    pub fn with_error_sink(mut self, error_sink: Box<dyn ErrorSink>) -> Self {
        self.error_sink = error_sink;
        self
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// 从已准备好的行数据源导入
    ///
    /// # 返回
    /// - ImportResult: 始终返回（失败以状态码 + fatal_error 表达）
    pub fn execute<R: RowSource>(&self, source: R) -> ImportResult {
        self.run(|aggregator| {
            let mut session = self.prepare()?;
            self.extract(source, &mut session, aggregator)
        })
    }

    /// 从 CSV 文件导入（配置校验先于打开文件）
    pub fn execute_file<P: AsRef<Path>>(&self, path: P) -> ImportResult {
        self.run(|aggregator| {
            let mut session = self.prepare()?;
            let source = CsvRowSource::open(path, self.schema.config().delimiter_byte())?;
            self.extract(source, &mut session, aggregator)
        })
    }

    /// 从任意字节流导入（按 CSV 解析）
    pub fn execute_reader<R: Read>(&self, reader: R) -> ImportResult {
        self.run(|aggregator| {
            let mut session = self.prepare()?;
            let source = CsvRowSource::from_reader(reader, self.schema.config().delimiter_byte());
            self.extract(source, &mut session, aggregator)
        })
    }

    /// 顶层兜底：唯一的错误拦截点
    #[instrument(skip_all, fields(schema = %self.schema.name(), run_id = tracing::field::Empty))]
    fn run<F>(&self, body: F) -> ImportResult
    where
        F: FnOnce(&mut ResultAggregator) -> ImporterResult<()>,
    {
        Span::current().record("run_id", tracing::field::display(Uuid::new_v4()));
        info!("开始导入");

        let mut aggregator = ResultAggregator::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| -> ImporterResult<ImportStatus> {
            body(&mut aggregator)?;
            Ok(self.schema.final_status(aggregator.result()))
        }))
        .unwrap_or_else(|payload| Err(ImportError::InternalError(panic_message(payload.as_ref()))));

        let result = match outcome {
            Ok(status) => aggregator.finalize(status),
            Err(err) => {
                self.report(&err);
                aggregator.fail(err)
            }
        };

        info!(
            status = result.status.code(),
            extracted = result.extracted.len(),
            invalid_rows = result.invalid_row_count(),
            warnings = result.warnings.len(),
            "导入结束"
        );
        result
    }

    /// 致命错误上报（上报自身的失败不影响导入结果）
    fn report(&self, err: &ImportError) {
        let reported = catch_unwind(AssertUnwindSafe(|| {
            self.error_sink.report(self.schema.name(), err)
        }));

        match reported {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "致命错误上报失败"),
            Err(payload) => warn!(error = %panic_message(payload.as_ref()), "致命错误上报 panic"),
        }
    }

    /// 阶段 0: 配置校验 + 候选编码解析 + 规则编译（不做任何 I/O）
    fn prepare(&self) -> ImporterResult<Session> {
        let config = self.schema.config();
        config.validate()?;

        let candidates = config.resolved_candidates()?;
        let rules = RuleSet::compile(&self.schema.rules(), self.schema.messages(), &config.field_names)?;
        debug!(
            candidates = candidates.len(),
            columns = config.expected_columns.len(),
            "配置校验通过"
        );

        Ok(Session {
            candidates,
            rules,
            source_encoding: None,
        })
    }

    /// 行遍历状态机
    fn extract<R: RowSource>(
        &self,
        mut source: R,
        session: &mut Session,
        aggregator: &mut ResultAggregator,
    ) -> ImporterResult<()> {
        let config = self.schema.config();
        let mut header_seen = false;

        while let Some(row) = source.next_row() {
            let row = row?;
            let row_number = source.row_number();

            // === 步骤 1: 截断（优先于其他所有检查）===
            if self.schema.should_break(row_number, config) {
                aggregator.warn(format!(
                    "row {}: max_rows ({}) reached, remaining rows were not processed",
                    row_number, config.max_rows
                ));
                break;
            }

            // === 步骤 2: 表头检查 + 编码探测 ===
            if row_number == config.header_row_number {
                let encoding = inspect_header(&row, config, &session.candidates)?;
                info!(encoding = encoding.name(), "源编码探测完成");
                session.source_encoding = Some(encoding);
                aggregator.set_detected_encoding(encoding.name());
                header_seen = true;
            }

            // === 步骤 3: 跳过 ===
            if self.schema.should_skip(row_number, config) {
                debug!(row_number, "跳过");
                continue;
            }

            // === 步骤 4: 转码 ===
            let Some(encoding) = session.source_encoding else {
                aggregator.warn(format!(
                    "row {}: source encoding is not detected yet",
                    row_number
                ));
                continue;
            };
            let values = match transcode_row(&row, encoding, config.trim_cells) {
                Ok(values) => values,
                Err(failure) => {
                    aggregator.warn(format!(
                        "row {}: column {} could not be converted from {}",
                        row_number, failure.column, failure.encoding
                    ));
                    continue;
                }
            };

            // === 步骤 5: 字段映射 ===
            let record = FieldMapper.map_row(values, &config.field_names, row_number);

            // === 步骤 6: 记录校验（空记录不参与）===
            let violations = if record.is_empty() {
                Vec::new()
            } else {
                session.rules.validate(&record)
            };
            let valid = violations.is_empty();
            if !valid {
                debug!(row_number, violations = violations.len(), "校验失败");
                aggregator.record_invalid(row_number, violations);
            }

            // === 步骤 7: 收集 ===
            if valid && !record.is_empty() {
                aggregator.collect(self.schema.post_process(record));
            } else {
                aggregator.warn(format!("row {}: failed to extract", row_number));
            }
        }

        if !header_seen {
            return Err(ImportError::HeaderRowMissing(config.header_row_number));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImportConfig, SchemaFile};
    use crate::domain::Record;
    use crate::importer::row_source::MemoryRowSource;
    use std::sync::{Arc, Mutex};

    fn people_schema() -> SchemaFile {
        SchemaFile::new(
            "people",
            ImportConfig::new(["name", "age"], ["name", "age"], ["UTF-8"]),
        )
        .with_rule("age", "numeric")
    }

    #[test]
    fn test_reference_scenario() {
        let importer = Importer::new(people_schema());
        let result = importer.execute(MemoryRowSource::from_rows(vec![
            vec!["name", "age"],
            vec!["Alice", "30"],
            vec!["Bob", "x"],
        ]));

        assert_eq!(result.status, ImportStatus::PartiallyError);
        assert_eq!(result.extracted.len(), 1);
        assert_eq!(result.extracted[0].get("name"), Some("Alice"));
        assert_eq!(result.extracted[0].get("age"), Some("30"));
        assert_eq!(result.invalid.len(), 1);
        assert_eq!(result.invalid[&3], vec!["age must be numeric".to_string()]);
        assert_eq!(result.warnings, vec!["row 3: failed to extract".to_string()]);
        assert_eq!(result.detected_encoding.as_deref(), Some("UTF-8"));
        assert!(result.fatal_error.is_none());
    }

    #[test]
    fn test_cardinality_mismatch_warns_without_invalid_entry() {
        let importer = Importer::new(people_schema());
        let result = importer.execute(MemoryRowSource::from_rows(vec![
            vec!["name", "age"],
            vec!["Alice"],
        ]));

        assert_eq!(result.status, ImportStatus::PartiallyError);
        assert!(result.invalid.is_empty());
        assert_eq!(result.warnings, vec!["row 2: failed to extract".to_string()]);
    }

    #[test]
    fn test_empty_source_is_header_missing() {
        let importer = Importer::new(people_schema());
        let result = importer.execute(MemoryRowSource::default());

        assert_eq!(result.status, ImportStatus::ColumnError);
        assert_eq!(result.fatal_error, Some(ImportError::HeaderRowMissing(1)));
    }

    struct PanickingSchema {
        config: ImportConfig,
    }

    impl ImportSchema for PanickingSchema {
        fn config(&self) -> &ImportConfig {
            &self.config
        }

        fn post_process(&self, _record: Record) -> Record {
            panic!("post-process exploded")
        }
    }

    #[test]
    fn test_hook_panic_becomes_problem() {
        let importer = Importer::new(PanickingSchema {
            config: ImportConfig::new(["a"], ["a"], ["UTF-8"]),
        });
        let result = importer.execute(MemoryRowSource::from_rows(vec![vec!["a"], vec!["1"]]));

        assert_eq!(result.status, ImportStatus::Problem);
        match result.fatal_error {
            Some(ImportError::InternalError(message)) => {
                assert!(message.contains("post-process exploded"))
            }
            other => panic!("unexpected fatal error: {:?}", other),
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<(String, ImportError)>>>,
    }

    impl ErrorSink for RecordingSink {
        fn report(&self, identifier: &str, error: &ImportError) -> anyhow::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((identifier.to_string(), error.clone()));
            anyhow::bail!("sink is read-only")
        }
    }

    #[test]
    fn test_sink_called_once_and_its_failure_ignored() {
        let sink = RecordingSink::default();
        let schema = SchemaFile::new(
            "broken",
            ImportConfig::new(["a", "b"], ["a"], ["UTF-8"]),
        );
        let importer = Importer::new(schema).with_error_sink(Box::new(sink.clone()));

        let result = importer.execute(MemoryRowSource::from_rows(vec![vec!["a", "b"]]));

        assert_eq!(result.status, ImportStatus::PropertyError);
        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "broken");
        assert_eq!(
            calls[0].1,
            ImportError::ColumnFieldCountMismatch {
                columns: 2,
                fields: 1
            }
        );
    }

    #[test]
    fn test_success_reports_nothing() {
        let sink = RecordingSink::default();
        let importer = Importer::new(people_schema()).with_error_sink(Box::new(sink.clone()));
        let result = importer.execute(MemoryRowSource::from_rows(vec![
            vec!["name", "age"],
            vec!["Alice", "30"],
        ]));

        assert_eq!(result.status, ImportStatus::Success);
        assert!(sink.calls.lock().unwrap().is_empty());
    }
}
