//! Field type registry: which input a field type renders as, and the validations it implies.

use crate::case::sluggify;
use crate::schema::types::{Selection, ValidationRule};
use crate::validation::ValidationKind;
use serde::{Deserialize, Serialize};

/// Field type identifier. Unrecognised identifiers are kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Url,
    Number,
    Selection,
    SelectionEnum,
    Reference,
    MultiSelection,
    Boolean,
    TextArea,
    RichText,
    Json,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Selection => "selection",
            FieldType::SelectionEnum => "selection-enum",
            FieldType::Reference => "reference",
            FieldType::MultiSelection => "multi-selection",
            FieldType::Boolean => "boolean",
            FieldType::TextArea => "textarea",
            FieldType::RichText => "richtext",
            FieldType::Json => "json",
            FieldType::Other(s) => s.as_str(),
        }
    }

    /// Validations applied when an entity field has none configured.
    pub fn default_validations(&self) -> Vec<ValidationRule> {
        let kind = match self {
            FieldType::Email => ValidationKind::IsEmail,
            FieldType::Url => ValidationKind::IsUrl,
            FieldType::Number => ValidationKind::IsNumber,
            FieldType::Json => ValidationKind::IsJson,
            _ => return Vec::new(),
        };
        vec![ValidationRule::new(kind.as_str())]
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "url" => FieldType::Url,
            "number" => FieldType::Number,
            "selection" => FieldType::Selection,
            "selection-enum" => FieldType::SelectionEnum,
            "reference" => FieldType::Reference,
            "multi-selection" => FieldType::MultiSelection,
            "boolean" => FieldType::Boolean,
            "textarea" => FieldType::TextArea,
            "richtext" => FieldType::RichText,
            "json" => FieldType::Json,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

/// The kind of input a field renders as.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "kebab-case")]
pub enum RenderKind {
    PlainText,
    Email,
    Password,
    Url,
    Number,
    SingleSelect(Vec<Selection>),
    MultiSelect(Vec<Selection>),
    Boolean,
    TextArea,
}

/// Selection, enum and reference fields share the select input; their options come from outside.
/// Unknown types render as plain text.
pub fn resolve_render_kind(field_type: &FieldType, selections: &[Selection]) -> RenderKind {
    match field_type {
        FieldType::Email => RenderKind::Email,
        FieldType::Password => RenderKind::Password,
        FieldType::Url => RenderKind::Url,
        FieldType::Number => RenderKind::Number,
        FieldType::Selection | FieldType::SelectionEnum | FieldType::Reference => {
            RenderKind::SingleSelect(selections.to_vec())
        }
        FieldType::MultiSelection => RenderKind::MultiSelect(selections.to_vec()),
        FieldType::Boolean => RenderKind::Boolean,
        FieldType::TextArea | FieldType::RichText | FieldType::Json => RenderKind::TextArea,
        FieldType::Text => RenderKind::PlainText,
        FieldType::Other(name) => {
            tracing::debug!("unknown field type '{}' rendered as plain text", name);
            RenderKind::PlainText
        }
    }
}

/// Form key for an input. Boolean switches key themselves off the slug of their label;
/// every other kind uses the field name it was given.
pub fn input_name(field_type: &FieldType, name: &str, label: &str) -> String {
    match field_type {
        FieldType::Boolean => sluggify(label),
        _ => name.to_string(),
    }
}
