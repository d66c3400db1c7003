// ==========================================
// 分隔文本导入核心 - 日志初始化
// ==========================================
// 输出: 一律写 stderr（stdout 专用于导入结果 JSON）
// 过滤: RUST_LOG，缺省 info
// 格式: 文本行 / JSON 行
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json, // 每个事件一行 JSON，附带当前 span（schema / run_id）
}

impl LogFormat {
    /// 由命令行开关选择格式
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 按指定格式安装全局 subscriber
///
/// # 环境变量
/// - RUST_LOG: 例如 `RUST_LOG=tabular_import::importer=debug`
///
/// # 示例
/// ```no_run
/// use tabular_import::logging::{self, LogFormat};
/// logging::init_with(LogFormat::Json);
/// ```
pub fn init_with(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.with_target(true).with_line_number(true).init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

/// 文本格式
pub fn init() {
    init_with(LogFormat::Text);
}

/// JSON 行格式
pub fn init_json() {
    init_with(LogFormat::Json);
}

/// 测试用：debug 级别，输出交给测试框架捕获，可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
