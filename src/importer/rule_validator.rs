// ==========================================
// 分隔文本导入核心 - 记录校验器
// ==========================================
// 职责: 编译调用方提供的字段规则 + 消息模板，逐条校验 Record
// 规则: required / nullable / numeric / integer / min / max / between /
//       in / not_in / regex / date_format / alpha_num / email
// 消息: "<字段>.<规则>" → "<规则>" → 内置默认模板
// ==========================================

use crate::domain::record::Record;
use crate::importer::error::{ImportError, ImporterResult};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;

/// 字段 → 规则表达式
pub type RuleMap = BTreeMap<String, Vec<String>>;
/// 消息键 → 消息模板
pub type MessageMap = BTreeMap<String, String>;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

// ==========================================
// Rule - 已编译的单条规则
// ==========================================
#[derive(Debug, Clone)]
enum Rule {
    Required,
    Nullable,
    Numeric,
    Integer,
    Min(f64),
    Max(f64),
    Between(f64, f64),
    In(Vec<String>),
    NotIn(Vec<String>),
    Regex(Regex),
    DateFormat(String),
    AlphaNum,
    Email(Regex),
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Nullable => "nullable",
            Rule::Numeric => "numeric",
            Rule::Integer => "integer",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Between(_, _) => "between",
            Rule::In(_) => "in",
            Rule::NotIn(_) => "not_in",
            Rule::Regex(_) => "regex",
            Rule::DateFormat(_) => "date_format",
            Rule::AlphaNum => "alpha_num",
            Rule::Email(_) => "email",
        }
    }

    /// 解析单条规则表达式（如 "max:10"）
    fn parse(expr: &str) -> Result<Rule, String> {
        let (name, arg) = match expr.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (expr.trim(), None),
        };

        let rule = match (name, arg) {
            ("required", None) => Rule::Required,
            ("nullable", None) => Rule::Nullable,
            ("numeric", None) => Rule::Numeric,
            ("integer", None) => Rule::Integer,
            ("alpha_num", None) => Rule::AlphaNum,
            ("email", None) => Rule::Email(Regex::new(EMAIL_PATTERN).map_err(|e| e.to_string())?),
            ("min", Some(arg)) => Rule::Min(parse_bound(arg)?),
            ("max", Some(arg)) => Rule::Max(parse_bound(arg)?),
            ("between", Some(arg)) => {
                let (low, high) = arg
                    .split_once(',')
                    .ok_or_else(|| "between expects two bounds".to_string())?;
                let (low, high) = (parse_bound(low)?, parse_bound(high)?);
                if low > high {
                    return Err(format!("lower bound {} exceeds upper bound {}", low, high));
                }
                Rule::Between(low, high)
            }
            ("in", Some(arg)) => Rule::In(parse_list(arg)),
            ("not_in", Some(arg)) => Rule::NotIn(parse_list(arg)),
            ("regex", Some(arg)) => Rule::Regex(Regex::new(arg).map_err(|e| e.to_string())?),
            ("date_format", Some(arg)) => {
                if arg.is_empty() || StrftimeItems::new(arg).any(|item| matches!(item, Item::Error)) {
                    return Err(format!("invalid date format {:?}", arg));
                }
                Rule::DateFormat(arg.to_string())
            }
            (name, Some(_)) if is_flag_rule(name) => {
                return Err(format!("{} takes no argument", name));
            }
            (name, None) if is_parameterized_rule(name) => {
                return Err(format!("{} requires an argument", name));
            }
            (name, _) => return Err(format!("unknown rule {:?}", name)),
        };

        Ok(rule)
    }
}

fn is_flag_rule(name: &str) -> bool {
    matches!(
        name,
        "required" | "nullable" | "numeric" | "integer" | "alpha_num" | "email"
    )
}

fn is_parameterized_rule(name: &str) -> bool {
    matches!(
        name,
        "min" | "max" | "between" | "in" | "not_in" | "regex" | "date_format"
    )
}

fn parse_bound(arg: &str) -> Result<f64, String> {
    arg.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid bound {:?}", arg))
}

fn parse_list(arg: &str) -> Vec<String> {
    arg.split(',').map(|item| item.trim().to_string()).collect()
}

/// 拆分规则表达式（支持 "required|numeric"；regex 规则整体保留）
fn split_expressions(expr: &str) -> Vec<&str> {
    let expr = expr.trim();
    if expr.starts_with("regex:") {
        return vec![expr];
    }
    expr.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn matches_date_format(value: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(value, format).is_ok()
        || NaiveDate::parse_from_str(value, format).is_ok()
        || NaiveTime::parse_from_str(value, format).is_ok()
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

// ==========================================
// FieldRules - 单个字段的规则集合
// ==========================================
#[derive(Debug, Clone)]
struct FieldRules {
    field: String,
    rules: Vec<Rule>,
    numeric: bool, // 含 numeric/integer 时，min/max/between 按数值比较
}

/// 单次违规（规则名 + 占位符参数）
struct Violation<'a> {
    rule: &'static str,
    params: Vec<(&'static str, String)>,
    value: &'a str,
}

impl FieldRules {
    fn check<'a>(&self, value: &'a str) -> Vec<Violation<'a>> {
        let mut violations = Vec::new();

        if value.is_empty() {
            // 空值仅检查 required
            if self.rules.iter().any(|r| matches!(r, Rule::Required)) {
                violations.push(Violation {
                    rule: "required",
                    params: Vec::new(),
                    value,
                });
            }
            return violations;
        }

        let size = if self.numeric {
            parse_number(value)
        } else {
            Some(value.chars().count() as f64)
        };

        for rule in &self.rules {
            let failed: Option<Vec<(&'static str, String)>> = match rule {
                Rule::Required | Rule::Nullable => None,
                Rule::Numeric => parse_number(value).is_none().then(Vec::new),
                Rule::Integer => value.parse::<i64>().is_err().then(Vec::new),
                Rule::Min(min) => size
                    .filter(|s| s < min)
                    .map(|_| vec![("min", format_bound(*min))]),
                Rule::Max(max) => size
                    .filter(|s| s > max)
                    .map(|_| vec![("max", format_bound(*max))]),
                Rule::Between(min, max) => size.filter(|s| s < min || s > max).map(|_| {
                    vec![("min", format_bound(*min)), ("max", format_bound(*max))]
                }),
                Rule::In(items) => (!items.iter().any(|item| item == value))
                    .then(|| vec![("values", items.join(", "))]),
                Rule::NotIn(items) => items
                    .iter()
                    .any(|item| item == value)
                    .then(|| vec![("values", items.join(", "))]),
                Rule::Regex(re) => (!re.is_match(value)).then(Vec::new),
                Rule::DateFormat(format) => (!matches_date_format(value, format))
                    .then(|| vec![("format", format.clone())]),
                Rule::AlphaNum => (!value.chars().all(char::is_alphanumeric)).then(Vec::new),
                Rule::Email(re) => (!re.is_match(value)).then(Vec::new),
            };

            if let Some(params) = failed {
                violations.push(Violation {
                    rule: rule.name(),
                    params,
                    value,
                });
            }
        }

        violations
    }
}

// ==========================================
// RuleSet - 已编译的校验规则 + 消息
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
    messages: MessageMap,
}

impl RuleSet {
    /// 编译规则
    ///
    /// # 参数
    /// - rules: 字段 → 规则表达式
    /// - messages: 消息模板覆盖
    /// - field_names: 标准字段名（决定校验顺序）
    ///
    /// # 返回
    /// - Err(UnknownRuleField): 规则引用了不存在的字段
    /// - Err(InvalidRule): 规则表达式无法解析
    pub fn compile(
        rules: &RuleMap,
        messages: MessageMap,
        field_names: &[String],
    ) -> ImporterResult<Self> {
        if let Some(unknown) = rules.keys().find(|field| !field_names.contains(*field)) {
            return Err(ImportError::UnknownRuleField(unknown.clone()));
        }

        let mut fields = Vec::new();
        for field in field_names {
            let Some(expressions) = rules.get(field) else {
                continue;
            };

            let mut compiled = Vec::new();
            for expr in expressions.iter().flat_map(|e| split_expressions(e)) {
                let rule = Rule::parse(expr).map_err(|message| ImportError::InvalidRule {
                    field: field.clone(),
                    rule: expr.to_string(),
                    message,
                })?;
                compiled.push(rule);
            }

            let numeric = compiled
                .iter()
                .any(|r| matches!(r, Rule::Numeric | Rule::Integer));
            fields.push(FieldRules {
                field: field.clone(),
                rules: compiled,
                numeric,
            });
        }

        Ok(Self { fields, messages })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.rules.is_empty())
    }

    /// 校验记录
    ///
    /// # 返回
    /// - 违规消息列表（空 = 通过）
    pub fn validate(&self, record: &Record) -> Vec<String> {
        let mut messages = Vec::new();
        for field_rules in &self.fields {
            let value = record.get(&field_rules.field).unwrap_or("");
            for violation in field_rules.check(value) {
                messages.push(self.render(field_rules, &violation));
            }
        }
        messages
    }

    fn render(&self, field_rules: &FieldRules, violation: &Violation<'_>) -> String {
        let field = field_rules.field.as_str();
        let template = self
            .messages
            .get(&format!("{}.{}", field, violation.rule))
            .or_else(|| self.messages.get(violation.rule))
            .map(String::as_str)
            .unwrap_or_else(|| default_template(violation.rule, field_rules.numeric));

        let mut message = template.replace(":attribute", field);
        for (key, value) in &violation.params {
            message = message.replace(&format!(":{}", key), value);
        }
        // :values 已在上一步替换，此处只剩 :value
        message.replace(":value", violation.value)
    }
}

fn default_template(rule: &str, numeric: bool) -> &'static str {
    match (rule, numeric) {
        ("required", _) => ":attribute is required",
        ("numeric", _) => ":attribute must be numeric",
        ("integer", _) => ":attribute must be an integer",
        ("min", true) => ":attribute must be at least :min",
        ("min", false) => ":attribute must be at least :min characters",
        ("max", true) => ":attribute may not be greater than :max",
        ("max", false) => ":attribute may not be greater than :max characters",
        ("between", true) => ":attribute must be between :min and :max",
        ("between", false) => ":attribute must be between :min and :max characters",
        ("in", _) => ":attribute must be one of: :values",
        ("not_in", _) => ":attribute must not be one of: :values",
        ("regex", _) => ":attribute format is invalid",
        ("date_format", _) => ":attribute does not match the format :format",
        ("alpha_num", _) => ":attribute may only contain letters and numbers",
        ("email", _) => ":attribute must be a valid email address",
        _ => ":attribute is invalid",
    }
}
