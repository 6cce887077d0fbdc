//! Row selection tracking.
//!
//! Selection is keyed by row id, so it survives re-sorting, re-filtering and
//! paging. The derived flags are always recomputed from a live row count.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

/// Selected row ids plus the derived header-checkbox flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_ids: HashSet<String>,
    /// Every row is selected (and there is at least one row).
    pub all_selected: bool,
    /// Some, but not all, rows are selected.
    pub indeterminate: bool,
}

impl SelectionState {
    /// Check if a row is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.selected_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }

    /// Toggles one row.
    ///
    /// Without `multi`, selecting a row first clears any other selection, so
    /// at most one id is ever selected.
    pub fn toggle_row(mut self, id: &str, multi: bool, total: usize) -> Self {
        if !self.selected_ids.remove(id) {
            if !multi {
                self.selected_ids.clear();
            }
            self.selected_ids.insert(id.to_string());
        }
        self.with_total(total)
    }

    /// Selects every given id, or clears the selection if all of them are
    /// already selected.
    pub fn toggle_all<'a>(self, all_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let all_ids: HashSet<String> = all_ids.into_iter().map(str::to_string).collect();
        let total = all_ids.len();
        let selected_ids = if !all_ids.is_empty() && all_ids.is_subset(&self.selected_ids) {
            HashSet::new()
        } else {
            all_ids
        };
        Self {
            selected_ids,
            ..self
        }
        .with_total(total)
    }

    /// Drops every selected id for which `exists` returns `false`.
    pub fn retain(mut self, exists: impl Fn(&str) -> bool) -> Self {
        self.selected_ids.retain(|id| exists(id.as_str()));
        self
    }

    /// Clears the selection.
    pub fn cleared(self) -> Self {
        Self::default()
    }

    /// Re-derives `all_selected` and `indeterminate` against `total` rows.
    pub fn with_total(mut self, total: usize) -> Self {
        let selected = self.selected_ids.len();
        self.all_selected = total > 0 && selected == total;
        self.indeterminate = selected > 0 && selected < total;
        self
    }
}
