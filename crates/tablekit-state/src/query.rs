//! Query state for paginated, filterable, sortable grids.
//!
//! `QueryState` is the single source of truth for which subset and order of
//! rows a grid requests. It never fetches anything itself: the composing
//! page hands `descriptor()` to the data-fetch collaborator and feeds grid
//! interaction back in through `handle_grid_change`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use tablekit_core::{GridChangeEvent, PaginationDescriptor, QueryDescriptor, SortOrder};

/// Rows per page when the composing page does not configure one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Construction-time defaults for `QueryState`.
///
/// `reset` restores exactly these values, independent of any interaction
/// that happened in between.
#[derive(Debug, Clone)]
pub struct QueryStateConfig<V = Value> {
    pub page_size: u64,
    pub search: Option<String>,
    pub filters: IndexMap<String, V>,
    pub default_sort_field: Option<String>,
    pub default_sort_order: SortOrder,
}

impl<V> Default for QueryStateConfig<V> {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            filters: IndexMap::new(),
            default_sort_field: None,
            default_sort_order: SortOrder::Desc,
        }
    }
}

impl<V> QueryStateConfig<V> {
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_default_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.default_sort_field = Some(field.into());
        self.default_sort_order = order;
        self
    }

    pub fn with_filters(mut self, filters: IndexMap<String, V>) -> Self {
        self.filters = filters;
        self
    }
}

/// State for one grid's pagination, search, filter map, and sort.
///
/// Generic over the caller's filter value type; pages with a typed filter
/// schema supply their own `V`, everything else uses `serde_json::Value`.
/// Filter keys are caller-defined and not constrained here.
#[derive(Debug, Clone)]
pub struct QueryState<V = Value> {
    page: u64,
    page_size: u64,
    search: Option<String>,
    filters: IndexMap<String, V>,
    sort_field: Option<String>,
    sort_order: SortOrder,
    config: QueryStateConfig<V>,
}

impl<V: Serialize + Clone> QueryState<V> {
    pub fn new(config: QueryStateConfig<V>) -> Self {
        Self {
            page: 1,
            page_size: config.page_size,
            search: config.search.clone(),
            filters: config.filters.clone(),
            sort_field: config.default_sort_field.clone(),
            sort_order: config.default_sort_order,
            config,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filters(&self) -> &IndexMap<String, V> {
        &self.filters
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Set the current page directly. Other fields are untouched. The
    /// pagination collaborator is trusted to pass a page >= 1; exceeding the
    /// available pages is answered by the fetch collaborator with an empty
    /// row set, not corrected here.
    pub fn set_page(&mut self, page: u64) {
        self.page = page;
    }

    /// Set the page size and return to the first page; changing density
    /// invalidates the prior page offset.
    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Set the free-text search term and return to the first page. Empty
    /// text clears the term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.search = if search.is_empty() { None } else { Some(search) };
        self.page = 1;
    }

    /// Replace the whole filter map and return to the first page.
    pub fn set_filters(&mut self, filters: IndexMap<String, V>) {
        self.filters = filters;
        self.page = 1;
    }

    /// Merge one filter key into the map and return to the first page.
    pub fn update_filter(&mut self, key: impl Into<String>, value: V) {
        self.filters.insert(key.into(), value);
        self.page = 1;
    }

    /// Set the sort specification. A missing order defaults to descending.
    pub fn set_sorting(&mut self, field: Option<String>, order: Option<SortOrder>) {
        self.sort_field = field;
        self.sort_order = order.unwrap_or(SortOrder::Desc);
    }

    /// Restore every field to its construction-time value.
    pub fn reset(&mut self) {
        self.page = 1;
        self.page_size = self.config.page_size;
        self.search = self.config.search.clone();
        self.filters = self.config.filters.clone();
        self.sort_field = self.config.default_sort_field.clone();
        self.sort_order = self.config.default_sort_order;
    }

    /// Adapter for a grid widget's composite change event.
    ///
    /// Pagination is applied first, then a differing page size (which
    /// resets the page), then the first sort spec. A spec carrying both a
    /// field and a direction becomes the active sort; a spec reporting no
    /// active direction restores the configured default sort, so server-side
    /// ordering never becomes unspecified once a default was declared.
    pub fn handle_grid_change(&mut self, event: &GridChangeEvent) {
        if let Some(current) = event.pagination.current {
            self.set_page(current);
        }
        if let Some(page_size) = event.pagination.page_size {
            if page_size != self.page_size {
                self.set_page_size(page_size);
            }
        }

        let Some(spec) = event.sorter.first() else {
            return;
        };
        match (&spec.field, spec.order) {
            (Some(field), Some(order)) => {
                self.sort_field = Some(field.clone());
                self.sort_order = order.into();
            }
            (_, None) => {
                self.sort_field = self.config.default_sort_field.clone();
                self.sort_order = self.config.default_sort_order;
            }
            // A direction without a field is not an active sort; it neither
            // sets nor restores anything.
            (None, Some(_)) => {}
        }
    }

    /// Derive the normalized query descriptor for the fetch collaborator.
    ///
    /// Recomputed on every call. Filter values serializing to JSON `null`
    /// or `""` are stripped, and an empty cleaned map is omitted entirely.
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
            filters: self.cleaned_filters(),
            sort_field: self.sort_field.clone(),
            sort_order: self.sort_order,
        }
    }

    fn cleaned_filters(&self) -> Option<serde_json::Map<String, Value>> {
        let mut cleaned = serde_json::Map::new();
        for (key, value) in &self.filters {
            let value = match serde_json::to_value(value) {
                Ok(value) => value,
                Err(error) => {
                    tracing::warn!("Dropping unserializable filter '{}': {}", key, error);
                    continue;
                }
            };
            match &value {
                Value::Null => {}
                Value::String(s) if s.is_empty() => {}
                _ => {
                    cleaned.insert(key.clone(), value);
                }
            }
        }
        if cleaned.is_empty() { None } else { Some(cleaned) }
    }

    /// Pure pagination display descriptor for a supplied total row count.
    /// Has no side effects and may be called repeatedly.
    pub fn pagination_descriptor(&self, total: u64) -> PaginationDescriptor {
        let start = if total == 0 {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        };
        let end = (self.page * self.page_size).min(total);
        PaginationDescriptor {
            current: self.page,
            page_size: self.page_size,
            total,
            range_label: format!("{start}–{end} of {total}"),
        }
    }
}

impl<V: Serialize + Clone> Default for QueryState<V> {
    fn default() -> Self {
        Self::new(QueryStateConfig::default())
    }
}
