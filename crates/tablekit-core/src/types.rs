//! Catalog, sort, and descriptor types.

use serde::{Deserialize, Serialize};

/// One entry of a table's column catalog.
///
/// The catalog is supplied by the page composing the grid and may grow over
/// the table's lifetime: columns whose existence is only known after an
/// earlier response (e.g. custom fields) are appended later. Entries are
/// never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column key, unique within one table.
    pub key: String,
    /// Human-readable column title.
    pub title: String,
    /// Whether the column is shown when no saved preference exists.
    #[serde(default = "default_visible")]
    pub default_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ColumnConfig {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            default_visible: true,
        }
    }

    /// Hide the column unless the user opts in.
    pub fn default_hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }
}

/// Server-side sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Normalized request parameters for the row-fetching collaborator.
///
/// Derived from query state, never stored: two descriptors with equal
/// fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    /// 1-indexed page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Free-text search term, omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Cleaned filter map, omitted when empty. Values that serialize to
    /// JSON `null` or `""` are stripped before inclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
}

/// Display state for a pagination control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationDescriptor {
    /// 1-indexed current page.
    pub current: u64,
    pub page_size: u64,
    /// Total row count reported by the fetch collaborator.
    pub total: u64,
    /// Human-readable "X–Y of Z" range.
    pub range_label: String,
}
