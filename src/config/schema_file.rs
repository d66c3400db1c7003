// ==========================================
// 分隔文本导入核心 - Schema 文件
// ==========================================
// 职责: 以 JSON 描述一个具体导入 schema（配置 + 规则 + 消息）
// 格式: { "name", "config": ImportConfig, "rules": {字段: [规则]}, "messages": {键: 模板} }
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::importer_trait::ImportSchema;
use crate::importer::rule_validator::{MessageMap, RuleMap};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_name() -> String {
    "import".to_string()
}

/// Schema 文件（持久化对象）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// schema 名称（日志与错误上报标识）
    #[serde(default = "default_name")]
    pub name: String,

    /// 导入配置
    pub config: ImportConfig,

    /// 字段校验规则
    #[serde(default)]
    pub rules: RuleMap,

    /// 校验消息模板
    #[serde(default)]
    pub messages: MessageMap,
}

impl SchemaFile {
    pub fn new(name: impl Into<String>, config: ImportConfig) -> Self {
        Self {
            name: name.into(),
            config,
            rules: RuleMap::new(),
            messages: MessageMap::new(),
        }
    }

    /// 追加字段规则（可多次调用，按调用顺序校验）
    pub fn with_rule(mut self, field: impl Into<String>, rule: impl Into<String>) -> Self {
        self.rules.entry(field.into()).or_default().push(rule.into());
        self
    }

    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// 从 JSON 文本解析
    pub fn from_json(json: &str) -> ImporterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> ImporterResult<Self> {
        let path = path.as_ref();
        let read_error = |message: String| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| read_error(e.to_string()))
    }
}

impl ImportSchema for SchemaFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn rules(&self) -> RuleMap {
        self.rules.clone()
    }

    fn messages(&self) -> MessageMap {
        self.messages.clone()
    }
}
