// ==========================================
// 分隔文本导入核心 - 命令行入口
// ==========================================
// 用法:
//   tabular-import <schema.json> <input.csv> [--json-logs]
//
// 结果以 JSON 输出到 stdout（status 为整数状态码），日志输出到 stderr。
// 退出码: success → 0，其他 → 1
// ==========================================

use anyhow::bail;
use tabular_import::importer::ResultAggregator;
use tabular_import::logging::{self, LogFormat};
use tabular_import::{Importer, SchemaFile};

fn main() -> anyhow::Result<()> {
    let mut json_logs = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json-logs" => json_logs = true,
            _ => positional.push(arg),
        }
    }

    let (schema_path, input_path) = match positional.as_slice() {
        [schema, input] => (schema.clone(), input.clone()),
        _ => bail!("usage: tabular-import <schema.json> <input.csv> [--json-logs]"),
    };

    logging::init_with(LogFormat::from_flag(json_logs));

    tracing::info!("tabular-import {}", tabular_import::VERSION);

    // schema 加载失败同样以结果形式输出（PROPERTY_ERROR）
    let result = match SchemaFile::load(&schema_path) {
        Ok(schema) => Importer::new(schema).execute_file(&input_path),
        Err(err) => {
            tracing::error!(schema = %schema_path, error = %err, "schema 加载失败");
            ResultAggregator::new().fail(err)
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
