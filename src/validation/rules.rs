//! Validation rule registry: built-in rule kinds plus named custom rules.

use crate::schema::FormValues;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a rule sees: the field's own value, the rule constraint, and the whole form.
#[derive(Clone, Copy, Debug)]
pub struct RuleInput<'a> {
    pub value: Option<&'a Value>,
    pub constraint: &'a Map<String, Value>,
    pub values: &'a FormValues,
}

impl<'a> RuleInput<'a> {
    fn constraint_f64(&self, key: &str) -> Option<f64> {
        match self.constraint.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn constraint_str(&self, key: &str) -> Option<&'a str> {
        self.constraint.get(key).and_then(Value::as_str)
    }

    fn other_field(&self) -> Option<&'a Value> {
        let name = self.constraint_str("otherField")?;
        self.values.get(name)
    }
}

/// Returns `true` when the rule fails.
pub type RuleFn = Arc<dyn Fn(&RuleInput<'_>) -> bool + Send + Sync>;

/// Built-in validation types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    Required,
    IsEmail,
    IsUrl,
    IsUuid,
    IsJson,
    IsNumber,
    IsBoolean,
    IsAlphaNumeric,
    IsUpperCase,
    IsLowerCase,
    MinLength,
    MaxLength,
    MinValue,
    MaxValue,
    Regex,
    MatchOtherField,
    NotMatchOtherField,
    LessThanOtherField,
    GreaterThanOtherField,
}

impl ValidationKind {
    pub const ALL: [ValidationKind; 19] = [
        ValidationKind::Required,
        ValidationKind::IsEmail,
        ValidationKind::IsUrl,
        ValidationKind::IsUuid,
        ValidationKind::IsJson,
        ValidationKind::IsNumber,
        ValidationKind::IsBoolean,
        ValidationKind::IsAlphaNumeric,
        ValidationKind::IsUpperCase,
        ValidationKind::IsLowerCase,
        ValidationKind::MinLength,
        ValidationKind::MaxLength,
        ValidationKind::MinValue,
        ValidationKind::MaxValue,
        ValidationKind::Regex,
        ValidationKind::MatchOtherField,
        ValidationKind::NotMatchOtherField,
        ValidationKind::LessThanOtherField,
        ValidationKind::GreaterThanOtherField,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::Required => "required",
            ValidationKind::IsEmail => "isEmail",
            ValidationKind::IsUrl => "isUrl",
            ValidationKind::IsUuid => "isUuid",
            ValidationKind::IsJson => "isJson",
            ValidationKind::IsNumber => "isNumber",
            ValidationKind::IsBoolean => "isBoolean",
            ValidationKind::IsAlphaNumeric => "isAlphaNumeric",
            ValidationKind::IsUpperCase => "isUpperCase",
            ValidationKind::IsLowerCase => "isLowerCase",
            ValidationKind::MinLength => "minLength",
            ValidationKind::MaxLength => "maxLength",
            ValidationKind::MinValue => "minValue",
            ValidationKind::MaxValue => "maxValue",
            ValidationKind::Regex => "regex",
            ValidationKind::MatchOtherField => "matchOtherField",
            ValidationKind::NotMatchOtherField => "notMatchOtherField",
            ValidationKind::LessThanOtherField => "lessThanOtherField",
            ValidationKind::GreaterThanOtherField => "greaterThanOtherField",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Message used when a rule carries no `errorMessage` of its own.
    pub fn default_message(self) -> &'static str {
        match self {
            ValidationKind::Required => "{name} is required",
            ValidationKind::IsEmail => "{name} is an invalid email",
            ValidationKind::IsUrl => "{name} is an invalid url",
            ValidationKind::IsUuid => "{name} is an invalid uuid",
            ValidationKind::IsJson => "{name} is an invalid json",
            ValidationKind::IsNumber => "{name} should be a number",
            ValidationKind::IsBoolean => "{name} should be a boolean",
            ValidationKind::IsAlphaNumeric => "{name} should contain only alphabets and numbers",
            ValidationKind::IsUpperCase => "{name} should be in upper case",
            ValidationKind::IsLowerCase => "{name} should be in lower case",
            ValidationKind::MinLength => "{name} should be greater than {length} characters",
            ValidationKind::MaxLength => "{name} should be less than {length} characters",
            ValidationKind::MinValue => "{name} should be greater than {value}",
            ValidationKind::MaxValue => "{name} should be less than {value}",
            ValidationKind::Regex => "{name} is invalid",
            ValidationKind::MatchOtherField => "{name} should match {otherField}",
            ValidationKind::NotMatchOtherField => "{name} should not match {otherField}",
            ValidationKind::LessThanOtherField => "{name} should be less than {otherField}",
            ValidationKind::GreaterThanOtherField => "{name} should be greater than {otherField}",
        }
    }

    /// Whether the rule fails for this input.
    pub fn fails(self, input: &RuleInput<'_>) -> bool {
        match (self, input.value.filter(|v| !is_empty(Some(*v)))) {
            (ValidationKind::Required, value) => value.is_none(),
            (_, None) => false,
            (kind, Some(v)) => kind.fails_on(v, input),
        }
    }

    fn fails_on(self, v: &Value, input: &RuleInput<'_>) -> bool {
        match self {
            ValidationKind::Required => false,
            ValidationKind::IsEmail => !v.as_str().map(is_email).unwrap_or(false),
            ValidationKind::IsUrl => !v.as_str().map(is_url).unwrap_or(false),
            ValidationKind::IsUuid => !v.as_str().map(|s| uuid::Uuid::parse_str(s).is_ok()).unwrap_or(false),
            ValidationKind::IsJson => match v {
                Value::String(s) => serde_json::from_str::<Value>(s).is_err(),
                Value::Object(_) | Value::Array(_) => false,
                _ => true,
            },
            ValidationKind::IsNumber => as_number(v).is_none(),
            ValidationKind::IsBoolean => match v {
                Value::Bool(_) => false,
                Value::String(s) => !matches!(s.as_str(), "true" | "false"),
                _ => true,
            },
            ValidationKind::IsAlphaNumeric => !v
                .as_str()
                .map(|s| s.chars().all(char::is_alphanumeric))
                .unwrap_or(false),
            ValidationKind::IsUpperCase => v.as_str().map(|s| s != s.to_uppercase()).unwrap_or(true),
            ValidationKind::IsLowerCase => v.as_str().map(|s| s != s.to_lowercase()).unwrap_or(true),
            ValidationKind::MinLength => match (input.constraint_f64("length"), length_of(v)) {
                (Some(min), Some(len)) => (len as f64) < min,
                _ => false,
            },
            ValidationKind::MaxLength => match (input.constraint_f64("length"), length_of(v)) {
                (Some(max), Some(len)) => (len as f64) > max,
                _ => false,
            },
            ValidationKind::MinValue => match (input.constraint_f64("value"), as_number(v)) {
                (Some(min), Some(n)) => n < min,
                _ => false,
            },
            ValidationKind::MaxValue => match (input.constraint_f64("value"), as_number(v)) {
                (Some(max), Some(n)) => n > max,
                _ => false,
            },
            ValidationKind::Regex => match (input.constraint_str("pattern"), v.as_str()) {
                (Some(pattern), Some(s)) => match Regex::new(pattern) {
                    Ok(re) => !re.is_match(s),
                    Err(e) => {
                        tracing::debug!("ignoring invalid regex constraint {:?}: {}", pattern, e);
                        false
                    }
                },
                _ => false,
            },
            ValidationKind::MatchOtherField => !value_eq(Some(v), input.other_field()),
            ValidationKind::NotMatchOtherField => value_eq(Some(v), input.other_field()),
            ValidationKind::LessThanOtherField => {
                match (as_number(v), input.other_field().and_then(as_number)) {
                    (Some(n), Some(other)) => n >= other,
                    _ => false,
                }
            }
            ValidationKind::GreaterThanOtherField => {
                match (as_number(v), input.other_field().and_then(as_number)) {
                    (Some(n), Some(other)) => n <= other,
                    _ => false,
                }
            }
        }
    }
}

/// Missing, null, blank strings and empty arrays count as empty.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn is_url(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn length_of(v: &Value) -> Option<usize> {
    match v {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

fn value_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::String(s)), Some(Value::String(t))) => s == t,
        (Some(Value::Number(n)), Some(Value::Number(m))) => n.as_f64() == m.as_f64(),
        (a, b) => a.filter(|v| !v.is_null()) == b.filter(|v| !v.is_null()),
    }
}

struct CustomRule {
    implementation: RuleFn,
    message: String,
}

/// Maps a validation-type identifier to its implementation and default message.
/// Built-in kinds always resolve; custom rules are looked up by name afterwards.
#[derive(Default)]
pub struct ValidationRegistry {
    custom: HashMap<String, CustomRule>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named rule. Built-in names cannot be shadowed; such registrations are skipped.
    pub fn register<F>(mut self, name: impl Into<String>, message: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&RuleInput<'_>) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if ValidationKind::parse(&name).is_some() {
            tracing::debug!("custom rule '{}' ignored: built-in rule of that name", name);
            return self;
        }
        self.custom.insert(
            name,
            CustomRule {
                implementation: Arc::new(implementation),
                message: message.into(),
            },
        );
        self
    }

    pub fn is_registered(&self, validation_type: &str) -> bool {
        ValidationKind::parse(validation_type).is_some() || self.custom.contains_key(validation_type)
    }

    /// `true` = validation fails. Unregistered types never fail.
    pub fn evaluate(
        &self,
        validation_type: &str,
        value: Option<&Value>,
        constraint: &Map<String, Value>,
        values: &FormValues,
    ) -> bool {
        let input = RuleInput {
            value,
            constraint,
            values,
        };
        if let Some(kind) = ValidationKind::parse(validation_type) {
            return kind.fails(&input);
        }
        match self.custom.get(validation_type) {
            Some(rule) => (rule.implementation)(&input),
            None => {
                tracing::debug!("unregistered validation type '{}' skipped", validation_type);
                false
            }
        }
    }

    pub fn default_message(&self, validation_type: &str) -> Option<&str> {
        if let Some(kind) = ValidationKind::parse(validation_type) {
            return Some(kind.default_message());
        }
        self.custom.get(validation_type).map(|r| r.message.as_str())
    }
}

impl std::fmt::Debug for ValidationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}
