//! CRUD screen toggles per entity, with the details/update/delete implication rules.

use crate::config::ConfigKey;
use crate::error::AppError;
use crate::service::ConfigurationService;
use serde::{Deserialize, Serialize};

/// Which CRUD screens are enabled for an entity. `update` or `delete` imply `details`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudSettings {
    pub create: bool,
    pub details: bool,
    pub update: bool,
    pub delete: bool,
}

impl Default for CrudSettings {
    fn default() -> Self {
        CrudSettings {
            create: true,
            details: true,
            update: true,
            delete: true,
        }
    }
}

/// A toggleable CRUD setting. The table screen is always on and has no toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudField {
    Create,
    Details,
    Update,
    Delete,
}

impl CrudSettings {
    pub fn get(&self, field: CrudField) -> bool {
        match field {
            CrudField::Create => self.create,
            CrudField::Details => self.details,
            CrudField::Update => self.update,
            CrudField::Delete => self.delete,
        }
    }

    fn slot(&mut self, field: CrudField) -> &mut bool {
        match field {
            CrudField::Create => &mut self.create,
            CrudField::Details => &mut self.details,
            CrudField::Update => &mut self.update,
            CrudField::Delete => &mut self.delete,
        }
    }

    /// Flip `field`, then restore the implication rules around `details`.
    pub fn toggle(self, field: CrudField) -> Self {
        let mut next = self;
        let flipped = !next.get(field);
        *next.slot(field) = flipped;
        match (field, flipped) {
            (CrudField::Details, false) => {
                next.update = false;
                next.delete = false;
            }
            (CrudField::Update, true) | (CrudField::Delete, true) => next.details = true,
            _ => {}
        }
        next
    }

    pub fn is_consistent(&self) -> bool {
        self.details || (!self.update && !self.delete)
    }

    /// Force `details` on when a stored record enables update or delete without it.
    pub fn normalized(self) -> Self {
        let mut next = self;
        if next.update || next.delete {
            next.details = true;
        }
        next
    }

    pub fn is_enabled(&self, screen: CrudScreen) -> bool {
        match screen.toggle_field() {
            Some(field) => self.get(field),
            None => true,
        }
    }
}

/// The five admin screens generated per entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudScreen {
    Table,
    Details,
    Create,
    Update,
    Delete,
}

impl CrudScreen {
    pub const ALL: [CrudScreen; 5] = [
        CrudScreen::Table,
        CrudScreen::Details,
        CrudScreen::Create,
        CrudScreen::Update,
        CrudScreen::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CrudScreen::Table => "Table",
            CrudScreen::Details => "Details",
            CrudScreen::Create => "Create",
            CrudScreen::Update => "Update",
            CrudScreen::Delete => "Delete",
        }
    }

    pub fn toggle_field(self) -> Option<CrudField> {
        match self {
            CrudScreen::Table => None,
            CrudScreen::Details => Some(CrudField::Details),
            CrudScreen::Create => Some(CrudField::Create),
            CrudScreen::Update => Some(CrudField::Update),
            CrudScreen::Delete => Some(CrudField::Delete),
        }
    }

    /// Key holding this screen's hidden columns. Delete has no column selection.
    pub fn hidden_columns_key(self) -> Option<ConfigKey> {
        match self {
            CrudScreen::Table => Some(ConfigKey::HiddenEntityTableColumns),
            CrudScreen::Details => Some(ConfigKey::HiddenEntityDetailsColumns),
            CrudScreen::Create => Some(ConfigKey::HiddenEntityCreateColumns),
            CrudScreen::Update => Some(ConfigKey::HiddenEntityUpdateColumns),
            CrudScreen::Delete => None,
        }
    }
}

/// One settings tab, disabled when its screen is toggled off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrudTab {
    pub screen: CrudScreen,
    pub label: &'static str,
    pub disabled: bool,
}

pub fn crud_tabs(settings: &CrudSettings) -> Vec<CrudTab> {
    CrudScreen::ALL
        .into_iter()
        .map(|screen| CrudTab {
            screen,
            label: screen.label(),
            disabled: !settings.is_enabled(screen),
        })
        .collect()
}

/// Entity fields minus the hidden ones, in field order.
pub fn visible_columns(fields: &[String], hidden: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !hidden.contains(f))
        .cloned()
        .collect()
}

/// CRUD settings for one entity within one admin session.
///
/// Each toggle commits locally first, then rewrites the whole record in the store.
/// Two sessions toggling the same entity race at last-write-wins.
pub struct CrudSettingsSession {
    entity: String,
    state: CrudSettings,
    service: ConfigurationService,
}

impl CrudSettingsSession {
    pub async fn load(service: ConfigurationService, entity: impl Into<String>) -> Result<Self, AppError> {
        let entity = entity.into();
        let state = service
            .show_as::<CrudSettings>(ConfigKey::EntityCrudSettings, Some(&entity))
            .await?
            .normalized();
        Ok(CrudSettingsSession {
            entity,
            state,
            service,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn state(&self) -> CrudSettings {
        self.state
    }

    pub fn tabs(&self) -> Vec<CrudTab> {
        crud_tabs(&self.state)
    }

    /// Apply a toggle and persist the result. A failed write is returned; the local state is kept.
    pub async fn toggle(&mut self, field: CrudField) -> Result<CrudSettings, AppError> {
        self.state = self.state.toggle(field);
        let value = serde_json::to_value(self.state)
            .map_err(|e| AppError::BadRequest(format!("crud settings: {}", e)))?;
        if let Err(e) = self
            .service
            .upsert(ConfigKey::EntityCrudSettings, value, Some(&self.entity))
            .await
        {
            tracing::warn!("persisting crud settings for {} failed: {}", self.entity, e);
            return Err(e);
        }
        Ok(self.state)
    }
}
