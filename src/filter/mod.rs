//! Feature visibility: the filter predicate and the two legend controllers that emit it.
//!
//! - [`range`]: dual-handle selection window over a graduated legend.
//! - [`category`]: per-category visibility toggles for categorical styling.
//!
//! Controllers only ever regenerate a [`FilterPredicate`]; they never touch
//! class breaks or palettes.

pub mod category;
pub mod range;

pub use category::{CategoryToggle, ToggleKey};
pub use range::{BarGeometry, DragHandle, RangeFilter, RangeSelection};

use crate::models::Row;
use serde::Serialize;

/// Declarative, renderer-agnostic description of which features are visible.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FilterPredicate {
    /// No filter: every feature is visible.
    #[default]
    #[serde(rename = "none")]
    ShowAll,
    /// `column >= min AND column <= max`.
    Range { column: String, min: f64, max: f64 },
    /// Category value (string form) is one of `values`.
    Include { column: String, values: Vec<String> },
    /// Nothing is visible.
    AlwaysFalse,
}

impl FilterPredicate {
    pub fn is_show_all(&self) -> bool {
        matches!(self, FilterPredicate::ShowAll)
    }

    /// Evaluate against one row the way a renderer would per feature.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            FilterPredicate::ShowAll => true,
            FilterPredicate::AlwaysFalse => false,
            FilterPredicate::Range { column, min, max } => row
                .get(column)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v >= *min && v <= *max),
            FilterPredicate::Include { column, values } => row
                .get(column)
                .and_then(|v| v.category_key())
                .is_some_and(|k| values.iter().any(|x| *x == k)),
        }
    }
}
