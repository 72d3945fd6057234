//! Grid change-event shapes.
//!
//! A grid widget reports pagination and sort interaction as one composite
//! change event. These types decouple query state from any particular
//! widget's callback signature; the adapter in `tablekit-state` consumes
//! them.

use serde::Deserialize;

use crate::SortOrder;

/// Composite change event emitted by a grid widget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridChangeEvent {
    #[serde(default)]
    pub pagination: PageChange,
    #[serde(default)]
    pub sorter: Sorter,
}

/// Pagination part of a grid change event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageChange {
    /// New 1-indexed page, when the user navigated.
    pub current: Option<u64>,
    /// New page size, when the user changed density.
    pub page_size: Option<u64>,
}

/// Sort part of a grid change event.
///
/// Some widgets report a single spec, others a list. Only the first entry
/// is honored downstream; there is no multi-column sort.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Sorter {
    Single(SortSpec),
    Multiple(Vec<SortSpec>),
}

impl Sorter {
    /// The first reported sort spec, if any.
    pub fn first(&self) -> Option<&SortSpec> {
        match self {
            Self::Single(spec) => Some(spec),
            Self::Multiple(specs) => specs.first(),
        }
    }
}

impl Default for Sorter {
    fn default() -> Self {
        Self::Single(SortSpec::default())
    }
}

/// A single sort specification as reported by the grid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SortSpec {
    pub field: Option<String>,
    /// `None` means the user cleared sorting.
    pub order: Option<GridSortOrder>,
}

/// The grid widget's ascending/descending vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSortOrder {
    Ascend,
    Descend,
}

impl From<GridSortOrder> for SortOrder {
    fn from(order: GridSortOrder) -> Self {
        match order {
            GridSortOrder::Ascend => SortOrder::Asc,
            GridSortOrder::Descend => SortOrder::Desc,
        }
    }
}
