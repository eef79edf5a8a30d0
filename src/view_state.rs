//! View state derived from async loads: loading, error, or render.
//!
//! Precedence is error first: a reported error means a load attempt concluded, so it is shown
//! even while another loader is still pending.

use serde::Serialize;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewState {
    Loading,
    Error { message: String },
    Render,
}

impl ViewState {
    pub fn is_render(&self) -> bool {
        matches!(self, ViewState::Render)
    }
}

pub fn derive_view_state<E: Display>(is_loading: bool, error: Option<E>) -> ViewState {
    match (error, is_loading) {
        (Some(e), _) => ViewState::Error {
            message: e.to_string(),
        },
        (None, true) => ViewState::Loading,
        (None, false) => ViewState::Render,
    }
}

/// Progress of one dependent load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

impl LoadStatus {
    pub fn loading() -> Self {
        LoadStatus {
            is_loading: true,
            error: None,
        }
    }

    pub fn loaded() -> Self {
        LoadStatus::default()
    }

    pub fn failed(error: impl Display) -> Self {
        LoadStatus {
            is_loading: false,
            error: Some(error.to_string()),
        }
    }

    /// Status of a finished load.
    pub fn from_result<T, E: Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => LoadStatus::loaded(),
            Err(e) => LoadStatus::failed(e),
        }
    }
}

/// Combine several loads: loading if any is loading; the first error in order wins.
pub fn combine_view_state<'a, I>(loads: I) -> ViewState
where
    I: IntoIterator<Item = &'a LoadStatus>,
{
    let mut is_loading = false;
    let mut error = None;
    for load in loads {
        is_loading |= load.is_loading;
        if error.is_none() {
            error = load.error.as_deref();
        }
    }
    derive_view_state(is_loading, error)
}
