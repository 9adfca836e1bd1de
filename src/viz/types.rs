//! Legend render model: what a legend UI shows, independent of how it is drawn.

use crate::filter::ToggleKey;
use crate::ramp::Rgb8;
use serde::Serialize;

/// Preview legends follow unapplied settings; interactive legends follow the
/// last Apply and carry filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPhase {
    Preview,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub phase: LegendPhase,
    pub title: String,
    pub opacity: f64,
    pub body: LegendBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LegendBody {
    /// One color for everything, also used for degenerate classifications.
    Swatch {
        color: Rgb8,
        label: String,
        count: Option<String>,
    },
    Categorical { rows: Vec<CategoryRow> },
    Graduated(GraduatedLegend),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub key: ToggleKey,
    pub label: String,
    pub color: Rgb8,
    pub count: usize,
    pub count_label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakRow {
    pub color: Rgb8,
    pub lower: f64,
    pub upper: f64,
    pub label: String,
    pub count: usize,
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraduatedLegend {
    pub column: String,
    /// Class colors, low to high.
    pub gradient: Vec<Rgb8>,
    pub min: f64,
    pub max: f64,
    pub min_label: String,
    pub max_label: String,
    pub rows: Vec<BreakRow>,
    /// Current selection window `(sel_min, sel_max)`; interactive legends only.
    pub selection: Option<(f64, f64)>,
}

impl Legend {
    /// Number of rows (classes or categories) the legend lists.
    pub fn row_count(&self) -> usize {
        match &self.body {
            LegendBody::Swatch { .. } => 1,
            LegendBody::Categorical { rows } => rows.len(),
            LegendBody::Graduated(g) => g.rows.len(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.phase == LegendPhase::Interactive
    }
}
