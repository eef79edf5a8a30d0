//! Typed shapes of stored configuration records.

use serde::{Deserialize, Serialize};

/// How a related entity is displayed, e.g. `"{first_name} {last_name}"`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSettings {
    #[serde(default)]
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDiction {
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub plural: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub name: String,
    #[serde(default = "default_home_link")]
    pub home_link: String,
}

fn default_home_link() -> String {
    "/".into()
}
