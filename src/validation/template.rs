//! Error-message templates: `{placeholder}` substitution against field label and rule constraint.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\s*([A-Za-z0-9_]+)\s*\}").expect("static placeholder pattern"))
}

fn param_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute `{key}` placeholders with values from `params`. Unknown placeholders are left as written.
pub fn compile(template: &str, params: &Map<String, Value>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(v) => param_to_string(v),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Parameters for a rule's message: `name` is the field label, then every constraint entry.
pub fn message_params(label: &str, constraint: &Map<String, Value>) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("name".into(), Value::String(label.to_string()));
    for (k, v) in constraint {
        params.insert(k.clone(), v.clone());
    }
    params
}
