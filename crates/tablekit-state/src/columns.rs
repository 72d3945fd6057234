//! Per-table column visibility with durable persistence.
//!
//! One store owns the visible-column set for one named table. The set is
//! read from the injected `PreferenceStore` on first use, reconciled against
//! the catalog the page supplies, and written back after every mutation.
//! Catalogs may grow over the table's lifetime; an initialized set is never
//! silently altered by catalog changes.

use std::time::Duration;

use tablekit_core::ColumnConfig;
use tablekit_storage::PreferenceStore;

/// Storage key prefix for per-table visible-column lists.
pub const COLUMN_PREFS_KEY_PREFIX: &str = "table_columns_";

/// How long a persisted visible-column list is kept (one year).
pub const COLUMN_PREFS_TTL: Duration = Duration::from_secs(31_536_000);

/// Visible-column set for one named table.
///
/// Exclusively owns the storage entry `table_columns_<table_name>`; table
/// instances with different names never share state. The set is never empty
/// once initialized: hiding the last remaining column is refused.
pub struct ColumnVisibilityStore<S> {
    table_name: String,
    catalog: Vec<ColumnConfig>,
    visible: Vec<String>,
    storage: S,
}

impl<S> ColumnVisibilityStore<S> {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The current column catalog.
    pub fn catalog(&self) -> &[ColumnConfig] {
        &self.catalog
    }

    /// Currently visible keys, in toggle order.
    pub fn visible_keys(&self) -> &[String] {
        &self.visible
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.iter().any(|k| k == key)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn total_count(&self) -> usize {
        self.catalog.len()
    }

    fn in_catalog(&self, key: &str) -> bool {
        self.catalog.iter().any(|c| c.key == key)
    }

    fn default_visible(&self) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.key.clone())
            .collect()
    }

    fn storage_key(&self) -> String {
        format!("{}{}", COLUMN_PREFS_KEY_PREFIX, self.table_name)
    }
}

impl<S: PreferenceStore> ColumnVisibilityStore<S> {
    /// Create the store for `table_name`, initializing the visible set from
    /// persisted storage when a valid entry exists, else from the catalog's
    /// `default_visible` flags.
    pub fn new(table_name: impl Into<String>, catalog: Vec<ColumnConfig>, storage: S) -> Self {
        let mut store = Self {
            table_name: table_name.into(),
            catalog: Vec::new(),
            visible: Vec::new(),
            storage,
        };
        store.reconcile(catalog);
        store
    }

    /// Swap in the caller's current catalog.
    ///
    /// Idempotent; called whenever the catalog reference changes. Growth
    /// never touches an initialized set: late-arriving columns (custom
    /// fields resolved after the first fetch) are neither auto-shown nor
    /// auto-hidden, so a saved preference survives them. If the set is
    /// still empty when the catalog first becomes non-empty, initialization
    /// runs once.
    pub fn reconcile(&mut self, catalog: Vec<ColumnConfig>) {
        self.catalog = catalog;
        if !self.visible.is_empty() || self.catalog.is_empty() {
            return;
        }
        self.visible = self.initial_visible();
        tracing::debug!(
            "Initialized column visibility for '{}': {:?}",
            self.table_name,
            self.visible
        );
    }

    /// Show `key` if hidden, hide it if shown.
    ///
    /// Hiding the last visible column and toggling a key outside the
    /// catalog are no-ops; neither is an error.
    pub fn toggle(&mut self, key: &str) {
        if !self.in_catalog(key) {
            return;
        }
        if let Some(pos) = self.visible.iter().position(|k| k == key) {
            if self.visible.len() == 1 {
                return;
            }
            self.visible.remove(pos);
        } else {
            self.visible.push(key.to_string());
        }
        self.persist();
    }

    /// Discard customization and recompute the set from `default_visible`.
    pub fn reset_to_default(&mut self) {
        self.visible = self.default_visible();
        self.persist();
    }

    fn initial_visible(&self) -> Vec<String> {
        if let Some(persisted) = self.read_persisted() {
            let kept: Vec<String> = persisted
                .iter()
                .filter(|key| self.in_catalog(key))
                .cloned()
                .collect();
            let dropped = persisted.len() - kept.len();
            if dropped > 0 {
                tracing::debug!(
                    "Dropped {} persisted column key(s) absent from the '{}' catalog",
                    dropped,
                    self.table_name
                );
            }
            if !kept.is_empty() {
                return kept;
            }
        }
        self.default_visible()
    }

    fn read_persisted(&self) -> Option<Vec<String>> {
        let raw = match self.storage.get(&self.storage_key()) {
            Ok(value) => value?,
            Err(error) => {
                tracing::warn!(
                    "Failed to read column preferences for '{}': {}",
                    self.table_name,
                    error
                );
                return None;
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(keys) if !keys.is_empty() => Some(keys),
            Ok(_) => None,
            Err(error) => {
                tracing::debug!(
                    "Ignoring malformed column preferences for '{}': {}",
                    self.table_name,
                    error
                );
                None
            }
        }
    }

    // An empty list is never written; the toggle invariant makes that state
    // unreachable through the public API.
    fn persist(&self) {
        if self.visible.is_empty() {
            return;
        }
        let value = match serde_json::to_string(&self.visible) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    "Failed to encode column preferences for '{}': {}",
                    self.table_name,
                    error
                );
                return;
            }
        };
        if let Err(error) = self
            .storage
            .set(&self.storage_key(), &value, COLUMN_PREFS_TTL)
        {
            tracing::warn!(
                "Failed to persist column preferences for '{}': {}",
                self.table_name,
                error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablekit_storage::MemoryPreferenceStore;

    fn catalog() -> Vec<ColumnConfig> {
        vec![
            ColumnConfig::new("casino_name", "Casino"),
            ColumnConfig::new("geo", "Geo"),
            ColumnConfig::new("description", "Description").default_hidden(),
        ]
    }

    fn seed(storage: &MemoryPreferenceStore, table: &str, raw: &str) {
        storage
            .set(&format!("table_columns_{table}"), raw, COLUMN_PREFS_TTL)
            .unwrap();
    }

    // Scenario: no persisted data, one column hidden by default.
    #[test]
    fn test_init_from_default_visible_flags() {
        let storage = MemoryPreferenceStore::new();
        let store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
        assert!(!store.is_visible("description"));
    }

    // Scenario: persisted ["geo","notes"] against a catalog without "notes".
    #[test]
    fn test_init_intersects_persisted_with_catalog() {
        let storage = MemoryPreferenceStore::new();
        seed(&storage, "offers", r#"["geo","notes"]"#);

        let store = ColumnVisibilityStore::new(
            "offers",
            vec![
                ColumnConfig::new("casino_name", "Casino"),
                ColumnConfig::new("geo", "Geo"),
            ],
            &storage,
        );

        assert_eq!(store.visible_keys(), ["geo"]);
    }

    #[test]
    fn test_init_is_deterministic() {
        let storage = MemoryPreferenceStore::new();
        seed(&storage, "offers", r#"["geo","casino_name"]"#);

        let first = ColumnVisibilityStore::new("offers", catalog(), &storage);
        let second = ColumnVisibilityStore::new("offers", catalog(), &storage);

        assert_eq!(first.visible_keys(), second.visible_keys());
        assert_eq!(first.visible_keys(), ["geo", "casino_name"]);
    }

    #[test]
    fn test_corrupt_persisted_value_falls_back_to_defaults() {
        for raw in ["not-json", "[]", r#"{"geo":true}"#] {
            let storage = MemoryPreferenceStore::new();
            seed(&storage, "offers", raw);

            let store = ColumnVisibilityStore::new("offers", catalog(), &storage);
            assert_eq!(store.visible_keys(), ["casino_name", "geo"], "raw={raw}");
        }
    }

    #[test]
    fn test_empty_intersection_falls_back_to_defaults() {
        let storage = MemoryPreferenceStore::new();
        seed(&storage, "offers", r#"["notes","owner"]"#);

        let store = ColumnVisibilityStore::new("offers", catalog(), &storage);
        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
    }

    #[test]
    fn test_initialization_never_writes_storage() {
        let storage = MemoryPreferenceStore::new();
        seed(&storage, "offers", r#"["geo","notes"]"#);

        let _store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        // The stale "notes" key stays persisted until the next mutation.
        assert_eq!(
            storage.get("table_columns_offers").unwrap().as_deref(),
            Some(r#"["geo","notes"]"#)
        );
    }

    #[test]
    fn test_toggle_persists_full_list() {
        let storage = MemoryPreferenceStore::new();
        let mut store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        store.toggle("description");

        assert!(store.is_visible("description"));
        assert_eq!(
            storage.get("table_columns_offers").unwrap().as_deref(),
            Some(r#"["casino_name","geo","description"]"#)
        );
    }

    #[test]
    fn test_toggle_last_visible_column_is_noop() {
        let storage = MemoryPreferenceStore::new();
        seed(&storage, "offers", r#"["geo"]"#);
        let mut store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        store.toggle("geo");

        assert_eq!(store.visible_keys(), ["geo"]);
    }

    #[test]
    fn test_toggle_unknown_key_is_noop() {
        let storage = MemoryPreferenceStore::new();
        let mut store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        store.toggle("notes");

        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
        assert!(storage.get("table_columns_offers").unwrap().is_none());
    }

    #[test]
    fn test_reset_to_default_discards_customization() {
        let storage = MemoryPreferenceStore::new();
        let mut store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        store.toggle("casino_name");
        store.toggle("description");
        store.reset_to_default();

        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
        assert_eq!(
            storage.get("table_columns_offers").unwrap().as_deref(),
            Some(r#"["casino_name","geo"]"#)
        );
    }

    #[test]
    fn test_reconcile_growth_leaves_initialized_set_untouched() {
        let storage = MemoryPreferenceStore::new();
        let mut store = ColumnVisibilityStore::new("offers", catalog(), &storage);

        let mut grown = catalog();
        grown.push(ColumnConfig::new("custom_field_1", "Custom Field 1"));
        store.reconcile(grown.clone());

        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
        assert!(!store.is_visible("custom_field_1"));

        // Idempotent for an unchanged catalog.
        store.reconcile(grown);
        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
    }

    #[test]
    fn test_reconcile_initializes_once_catalog_becomes_nonempty() {
        let storage = MemoryPreferenceStore::new();
        let mut store = ColumnVisibilityStore::new("offers", Vec::new(), &storage);
        assert!(store.visible_keys().is_empty());

        store.reconcile(catalog());
        assert_eq!(store.visible_keys(), ["casino_name", "geo"]);
    }

    #[test]
    fn test_tables_do_not_share_storage() {
        let storage = MemoryPreferenceStore::new();
        let mut offers = ColumnVisibilityStore::new("offers", catalog(), &storage);
        let venues = ColumnVisibilityStore::new("venues", catalog(), &storage);

        offers.toggle("geo");

        assert_eq!(offers.visible_keys(), ["casino_name"]);
        assert_eq!(venues.visible_keys(), ["casino_name", "geo"]);
        assert!(storage.get("table_columns_venues").unwrap().is_none());
    }
}
