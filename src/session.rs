//! One styling session over the current result set.
//!
//! [`StyleSession`] owns every piece of mutable styling state: the settings,
//! the applied encoding, the active filter controller and the paint adapter.
//! A new result set replaces all of it in one call. Pointer drags carry a
//! [`DragToken`]; tokens from before a reset are discarded on use.

use std::sync::Arc;

use crate::classify::ClassMethod;
use crate::config::ClassifyConfig;
use crate::filter::{
    CategoryToggle, DragHandle, FilterPredicate, RangeFilter, RangeSelection, ToggleKey,
};
use crate::models::{CategoricalSample, NumericSample, ResultSet};
use crate::paint::{MapLayers, PaintAdapter};
use crate::ramp::{CategoryPalette, Rgb8};
use crate::style::{PaintExpression, StyleMode, StyleModel, StyleSettings};
use crate::viz::bar_geometry;
use crate::viz::legend::{self, LegendContext};
use crate::viz::{Legend, LegendPhase};

pub const DEFAULT_LAYER_PREFIX: &str = "results";
pub const DEFAULT_LEGEND_WIDTH: u32 = 320;

/// Encoding frozen at the last Apply.
#[derive(Debug, Clone)]
pub struct AppliedStyle {
    pub settings: StyleSettings,
    pub column: Option<String>,
    pub breaks: Vec<f64>,
    pub colors: Vec<Rgb8>,
    pub palette: CategoryPalette,
    pub expression: PaintExpression,
    pub numeric: NumericSample,
    pub categorical: CategoricalSample,
}

impl AppliedStyle {
    pub fn mode(&self) -> StyleMode {
        self.settings.mode
    }
}

/// Filter controller attached to the interactive legend.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActiveFilter {
    #[default]
    None,
    Range(RangeFilter),
    Categories(CategoryToggle),
}

impl ActiveFilter {
    pub fn predicate(&self) -> FilterPredicate {
        match self {
            ActiveFilter::None => FilterPredicate::ShowAll,
            ActiveFilter::Range(f) => f.predicate(),
            ActiveFilter::Categories(t) => t.predicate(),
        }
    }
}

/// Handle to an in-progress drag. Only valid for the session state it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragToken {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct StyleSession {
    model: StyleModel,
    applied: Option<AppliedStyle>,
    filter: ActiveFilter,
    adapter: PaintAdapter,
    generation: u64,
    legend_width: u32,
    locale: String,
}

impl StyleSession {
    pub fn new(results: Arc<ResultSet>, config: ClassifyConfig) -> Self {
        Self {
            model: StyleModel::new(results, config),
            applied: None,
            filter: ActiveFilter::None,
            adapter: PaintAdapter::new(DEFAULT_LAYER_PREFIX),
            generation: 0,
            legend_width: DEFAULT_LEGEND_WIDTH,
            locale: "en".into(),
        }
    }

    pub fn with_layer_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.adapter = PaintAdapter::new(prefix);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Legend width in pixels; pointer positions are mapped against this bar.
    pub fn with_legend_width(mut self, width: u32) -> Self {
        self.legend_width = width;
        self
    }

    pub fn model(&self) -> &StyleModel {
        &self.model
    }

    pub fn settings(&self) -> &StyleSettings {
        self.model.settings()
    }

    pub fn applied(&self) -> Option<&AppliedStyle> {
        self.applied.as_ref()
    }

    pub fn filter(&self) -> &ActiveFilter {
        &self.filter
    }

    pub fn adapter(&self) -> &PaintAdapter {
        &self.adapter
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A new result set: settings back to defaults, no applied style, no filter.
    /// Any drag in progress is invalidated.
    pub fn load_results(&mut self, results: Arc<ResultSet>) {
        log::debug!(
            "session: new result set ({} rows, {} columns), resetting style",
            results.rows.len(),
            results.columns.len()
        );
        self.model.reset(results);
        self.applied = None;
        self.filter = ActiveFilter::None;
        self.adapter.invalidate();
        self.generation += 1;
    }

    /// Replace settings and return the preview legend. Map state is untouched.
    pub fn update_settings(&mut self, settings: StyleSettings) -> Legend {
        self.model.set_settings(settings);
        self.preview()
    }

    pub fn preview(&self) -> Legend {
        legend::preview(&self.model, &self.locale)
    }

    /// Compute breaks and colors, push paint, then attach a fresh filter
    /// controller. The returned legend always reflects this application.
    pub fn apply<L: MapLayers + ?Sized>(&mut self, layers: &mut L) -> Legend {
        let settings = self.model.settings().clone();
        let column = self.model.active_column().map(str::to_string);
        let numeric = self.model.numeric_sample();
        let categorical = self.model.categorical_sample();
        let breaks = match settings.mode {
            StyleMode::Graduated => self.model.active_breaks(),
            _ => Vec::new(),
        };
        let colors = self.model.active_ramp();
        let palette = match settings.mode {
            StyleMode::Categorical => self.model.category_palette(),
            _ => CategoryPalette::default(),
        };
        let expression = self.model.paint_expression();

        log::debug!(
            "apply: mode {:?} column {:?} method {} k {} breaks {:?}",
            settings.mode,
            column,
            settings.method.label(),
            settings.class_count,
            breaks
        );

        self.adapter.push_paint(layers, &expression, settings.opacity);

        self.filter = match (settings.mode, column.as_deref()) {
            (StyleMode::Graduated, Some(col)) => match (numeric.min(), numeric.max()) {
                (Some(lo), Some(hi)) => ActiveFilter::Range(RangeFilter::new(
                    col,
                    lo,
                    hi,
                    bar_geometry(self.legend_width),
                )),
                _ => ActiveFilter::None,
            },
            (StyleMode::Categorical, Some(col)) if !palette.is_empty() => {
                ActiveFilter::Categories(CategoryToggle::new(col, &palette))
            }
            _ => ActiveFilter::None,
        };
        self.adapter.push_filter(layers, &self.filter.predicate());
        self.generation += 1;

        self.applied = Some(AppliedStyle {
            settings,
            column,
            breaks,
            colors,
            palette,
            expression,
            numeric,
            categorical,
        });
        self.legend()
    }

    /// Interactive legend after Apply, preview legend before.
    pub fn legend(&self) -> Legend {
        let Some(applied) = &self.applied else {
            return self.preview();
        };
        let ctx = LegendContext {
            phase: LegendPhase::Interactive,
            opacity: applied.settings.opacity,
            locale: &self.locale,
        };
        match (applied.mode(), applied.column.as_deref()) {
            (StyleMode::Graduated, Some(column)) => legend::graduated(
                column,
                &applied.breaks,
                &applied.colors,
                &applied.numeric,
                self.range_selection(),
                ctx,
            ),
            (StyleMode::Categorical, Some(column)) => {
                let toggle = match &self.filter {
                    ActiveFilter::Categories(t) => Some(t),
                    _ => None,
                };
                legend::categorical(column, &applied.palette, &applied.categorical, toggle, ctx)
            }
            _ => legend::single_swatch(applied.settings.single_color, ctx),
        }
    }

    pub fn range_selection(&self) -> Option<RangeSelection> {
        match &self.filter {
            ActiveFilter::Range(f) => Some(f.selection()),
            _ => None,
        }
    }

    pub fn filter_predicate(&self) -> FilterPredicate {
        self.filter.predicate()
    }

    /// Start a drag on the range selector. `None` without a range filter.
    pub fn begin_drag(&mut self, handle: DragHandle, pixel_x: f64) -> Option<DragToken> {
        let ActiveFilter::Range(f) = &mut self.filter else {
            return None;
        };
        f.pointer_down(handle, pixel_x);
        Some(DragToken {
            generation: self.generation,
        })
    }

    /// Move an active drag and push the resulting filter.
    pub fn drag_to<L: MapLayers + ?Sized>(
        &mut self,
        token: DragToken,
        pixel_x: f64,
        layers: &mut L,
    ) -> Option<FilterPredicate> {
        if token.generation != self.generation {
            log::debug!(
                "drag: discarding stale move (token {}, current {})",
                token.generation,
                self.generation
            );
            return None;
        }
        let ActiveFilter::Range(f) = &mut self.filter else {
            return None;
        };
        let predicate = f.pointer_move(pixel_x)?;
        self.adapter.push_filter(layers, &predicate);
        Some(predicate)
    }

    pub fn end_drag(&mut self, token: DragToken) {
        if token.generation != self.generation {
            return;
        }
        if let ActiveFilter::Range(f) = &mut self.filter {
            f.pointer_up();
        }
    }

    /// Set the range selection in value space and push the filter.
    pub fn set_range<L: MapLayers + ?Sized>(
        &mut self,
        min: f64,
        max: f64,
        layers: &mut L,
    ) -> Option<FilterPredicate> {
        let ActiveFilter::Range(f) = &mut self.filter else {
            return None;
        };
        let predicate = f.set_range(min, max);
        self.adapter.push_filter(layers, &predicate);
        Some(predicate)
    }

    /// Flip one legend toggle and push the filter. `None` without a categorical filter.
    pub fn toggle<L: MapLayers + ?Sized>(
        &mut self,
        key: &ToggleKey,
        layers: &mut L,
    ) -> Option<FilterPredicate> {
        let ActiveFilter::Categories(t) = &mut self.filter else {
            return None;
        };
        let predicate = t.toggle(key);
        self.adapter.push_filter(layers, &predicate);
        Some(predicate)
    }

    /// Flip one category value.
    pub fn toggle_category<L: MapLayers + ?Sized>(
        &mut self,
        value: &str,
        layers: &mut L,
    ) -> Option<FilterPredicate> {
        self.toggle(&ToggleKey::value(value), layers)
    }

    /// Flip the "Other" bucket.
    pub fn toggle_other<L: MapLayers + ?Sized>(
        &mut self,
        layers: &mut L,
    ) -> Option<FilterPredicate> {
        self.toggle(&ToggleKey::Other, layers)
    }

    /// Full visibility again. Breaks and colors stay as applied.
    pub fn reset_filter<L: MapLayers + ?Sized>(&mut self, layers: &mut L) -> FilterPredicate {
        let predicate = match &mut self.filter {
            ActiveFilter::None => FilterPredicate::ShowAll,
            ActiveFilter::Range(f) => f.reset(),
            ActiveFilter::Categories(t) => t.reset(),
        };
        self.adapter.push_filter(layers, &predicate);
        predicate
    }

    /// Drop the filter controller altogether; the applied paint remains.
    pub fn dismiss<L: MapLayers + ?Sized>(&mut self, layers: &mut L) {
        self.filter = ActiveFilter::None;
        self.generation += 1;
        self.adapter.push_filter(layers, &FilterPredicate::ShowAll);
    }

    /// Sample row indices passing the current filter; `None` when nothing is filtered.
    pub fn rows_in_selection(&self) -> Option<Vec<usize>> {
        let applied = self.applied.as_ref()?;
        match &self.filter {
            ActiveFilter::Range(f) if !f.selection().is_full() => {
                let sel = f.selection();
                Some(
                    applied
                        .numeric
                        .entries
                        .iter()
                        .filter(|(_, v)| sel.contains(*v))
                        .map(|(i, _)| *i)
                        .collect(),
                )
            }
            ActiveFilter::Categories(t) if t.any_hidden() => Some(
                applied
                    .categorical
                    .entries
                    .iter()
                    .filter(|(_, key)| t.admits(key))
                    .map(|(i, _)| *i)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Shorthand for a graduated style on `column`.
    pub fn graduated_settings(
        &self,
        column: &str,
        method: ClassMethod,
        class_count: usize,
    ) -> StyleSettings {
        StyleSettings {
            mode: StyleMode::Graduated,
            column: Some(column.to_string()),
            method,
            class_count,
            ..self.model.settings().clone()
        }
    }
}
