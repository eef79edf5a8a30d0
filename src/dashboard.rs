//! Per-widget relative date range selection on the dashboard.

use crate::error::AppError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RelativeDayOption {
    pub label: &'static str,
    /// Days back from today.
    pub value: u32,
}

pub const DASHBOARD_RELATIVE_DAYS: [RelativeDayOption; 6] = [
    RelativeDayOption { label: "Today", value: 1 },
    RelativeDayOption { label: "Last 7 Days", value: 7 },
    RelativeDayOption { label: "Last 30 Days", value: 30 },
    RelativeDayOption { label: "Last 90 Days", value: 90 },
    RelativeDayOption { label: "Last 6 Months", value: 180 },
    RelativeDayOption { label: "Last Year", value: 365 },
];

pub fn relative_day_option(value: u32) -> Option<RelativeDayOption> {
    DASHBOARD_RELATIVE_DAYS.iter().copied().find(|o| o.value == value)
}

/// Selected relative day per widget id. Widgets without a selection use their own range.
#[derive(Clone, Debug, Default)]
pub struct WidgetRelativeDateState {
    selections: HashMap<String, RelativeDayOption>,
}

impl WidgetRelativeDateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_widget_relative_date(&mut self, widget_id: &str, current_relative_day: u32) -> Result<(), AppError> {
        let option = relative_day_option(current_relative_day).ok_or_else(|| {
            AppError::BadRequest(format!("unsupported relative day: {}", current_relative_day))
        })?;
        self.selections.insert(widget_id.to_string(), option);
        Ok(())
    }

    pub fn relative_date(&self, widget_id: &str) -> Option<RelativeDayOption> {
        self.selections.get(widget_id).copied()
    }

    pub fn clear(&mut self, widget_id: &str) {
        self.selections.remove(widget_id);
    }
}
