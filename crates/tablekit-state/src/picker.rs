//! Checkbox-row view models for a show/hide-columns panel.

use crate::ColumnVisibilityStore;

/// One checkbox row of the column picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub key: String,
    pub title: String,
    pub checked: bool,
    /// Set when this is the sole visible column; the panel must refuse to
    /// uncheck it.
    pub locked: bool,
}

/// Presentation adapter for a column show/hide panel.
///
/// Holds the panel's search query and projects a `ColumnVisibilityStore`
/// into renderable checkbox rows, in catalog order. Rendering itself is the
/// grid's concern.
#[derive(Debug, Clone, Default)]
pub struct ColumnPicker {
    search_query: String,
}

impl ColumnPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the search query used to narrow the column list.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Checkbox rows for the store's catalog, narrowed by the search query
    /// (case-insensitive substring match over key and title).
    pub fn items<S>(&self, store: &ColumnVisibilityStore<S>) -> Vec<PickerItem> {
        let query = self.search_query.to_lowercase();
        let last_visible = store.visible_count() == 1;
        store
            .catalog()
            .iter()
            .filter(|column| {
                query.is_empty()
                    || column.key.to_lowercase().contains(&query)
                    || column.title.to_lowercase().contains(&query)
            })
            .map(|column| {
                let checked = store.is_visible(&column.key);
                PickerItem {
                    key: column.key.clone(),
                    title: column.title.clone(),
                    checked,
                    locked: checked && last_visible,
                }
            })
            .collect()
    }
}
