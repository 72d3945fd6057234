//! Tablekit Core - shared vocabulary for data grid state controllers
//!
//! This crate provides the plain data types the other tablekit crates
//! exchange:
//!
//! - `ColumnConfig` - one entry of a table's column catalog
//! - `SortOrder` - server-side sort direction
//! - `QueryDescriptor` - normalized request parameters for the row fetcher
//! - `PaginationDescriptor` - display state for a pagination control
//! - Grid change-event shapes consumed by the query state adapter

mod events;
mod types;

pub use events::*;
pub use types::*;
