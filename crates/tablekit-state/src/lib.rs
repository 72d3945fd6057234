//! Tablekit State - state controllers for paginated, filterable data grids
//!
//! Two cooperating, composable state holders with no network code of their
//! own:
//!
//! - `QueryState` - owns pagination, free-text search, a caller-typed filter
//!   map, and a single sort specification; derives the `QueryDescriptor`
//!   consumed by the data-fetch layer and adapts grid change events into
//!   state mutations.
//! - `ColumnVisibilityStore` - owns the visible-column set for one named
//!   table, persists it through a `PreferenceStore`, and reconciles it
//!   against a column catalog that may grow after initial load without
//!   discarding user customization.
//!
//! `ColumnPicker` is a small presentation adapter that projects the store
//! into checkbox-row view models for a show/hide-columns panel.

mod columns;
mod picker;
mod query;

pub use columns::*;
pub use picker::*;
pub use query::*;
