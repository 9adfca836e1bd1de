//! Style settings and the model deriving breaks, colors, and paint expressions from them.
//!
//! [`StyleSettings`] is the single description of styling intent. [`StyleModel`]
//! pairs it with the current result set and derives everything else on demand:
//! class breaks, ramp colors, the category palette, and a renderer-agnostic
//! [`PaintExpression`]. A new result set always resets the settings to defaults.

use crate::classify::{self, ClassMethod};
use crate::config::ClassifyConfig;
use crate::models::{CategoricalSample, ColumnKind, NumericSample, ResultSet, Value};
use crate::ramp::{self, CategoryPalette, Rgb8};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Styling mode. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    #[default]
    Single,
    Graduated,
    Categorical,
}

impl StyleMode {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "single" => Some(StyleMode::Single),
            "graduated" => Some(StyleMode::Graduated),
            "categorical" => Some(StyleMode::Categorical),
            _ => None,
        }
    }
}

pub const DEFAULT_CLASS_COUNT: usize = 5;
pub const DEFAULT_OPACITY: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSettings {
    pub mode: StyleMode,
    /// Target attribute; ignored in `single` mode.
    pub column: Option<String>,
    pub single_color: Rgb8,
    pub ramp: String,
    pub ramp_inverted: bool,
    pub method: ClassMethod,
    pub class_count: usize,
    pub opacity: f64,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            mode: StyleMode::Single,
            column: None,
            single_color: ramp::DEFAULT_SINGLE_COLOR,
            ramp: ramp::default_ramp().name.to_string(),
            ramp_inverted: false,
            method: ClassMethod::Quantile,
            class_count: DEFAULT_CLASS_COUNT,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl StyleSettings {
    /// Defaults for a freshly arrived result set: first styleable column selected.
    pub fn for_results(results: &ResultSet) -> Self {
        Self {
            column: results.styleable_columns().next().map(|c| c.name.clone()),
            ..Self::default()
        }
    }

    /// Clamp class count and opacity, replace unknown ramps with the default.
    pub fn normalized(mut self) -> Self {
        self.class_count = classify::clamp_class_count(self.class_count);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_OPACITY
        };
        if ramp::ramp_by_name(&self.ramp).is_none() {
            log::debug!("unknown ramp '{}', using default", self.ramp);
            self.ramp = ramp::default_ramp().name.to_string();
        }
        self
    }
}

/// Renderer-agnostic color encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaintExpression {
    /// Every feature gets one color.
    Constant { color: Rgb8 },
    /// `base` below the first threshold; `value >= stops[i].0` maps to `stops[i].1`.
    /// Thresholds are non-decreasing and may repeat.
    Step {
        column: String,
        base: Rgb8,
        stops: Vec<(f64, Rgb8)>,
    },
    /// Exact lookup on the value's string form, `fallback` for anything unmatched.
    Match {
        column: String,
        cases: Vec<(String, Rgb8)>,
        fallback: Rgb8,
    },
}

impl PaintExpression {
    /// Color the expression assigns to one attribute value.
    pub fn evaluate(&self, value: &Value) -> Rgb8 {
        match self {
            PaintExpression::Constant { color } => *color,
            PaintExpression::Step { base, stops, .. } => match value.as_f64() {
                Some(v) => stops
                    .iter()
                    .take_while(|(t, _)| v >= *t)
                    .last()
                    .map(|(_, c)| *c)
                    .unwrap_or(*base),
                None => *base,
            },
            PaintExpression::Match {
                cases, fallback, ..
            } => value
                .category_key()
                .and_then(|k| cases.iter().find(|(v, _)| *v == k).map(|(_, c)| *c))
                .unwrap_or(*fallback),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            PaintExpression::Constant { .. } => None,
            PaintExpression::Step { column, .. } | PaintExpression::Match { column, .. } => {
                Some(column)
            }
        }
    }
}

/// Current settings bound to the current result set.
#[derive(Debug, Clone)]
pub struct StyleModel {
    settings: StyleSettings,
    results: Arc<ResultSet>,
    config: ClassifyConfig,
}

impl StyleModel {
    pub fn new(results: Arc<ResultSet>, config: ClassifyConfig) -> Self {
        let settings = StyleSettings::for_results(&results);
        Self {
            settings,
            results,
            config,
        }
    }

    /// Replace the result set and reset settings to defaults.
    pub fn reset(&mut self, results: Arc<ResultSet>) {
        self.settings = StyleSettings::for_results(&results);
        self.results = results;
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: StyleSettings) {
        self.settings = settings.normalized();
    }

    pub fn results(&self) -> &Arc<ResultSet> {
        &self.results
    }

    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    pub fn is_graduated(&self) -> bool {
        self.settings.mode == StyleMode::Graduated
    }

    pub fn is_categorical(&self) -> bool {
        self.settings.mode == StyleMode::Categorical
    }

    /// Column the current mode styles by.
    ///
    /// A configured column missing from the schema falls back to the first
    /// styleable column of the kind the mode needs, then to the first
    /// styleable column of any kind. `None` in single mode or for an empty schema.
    pub fn active_column(&self) -> Option<&str> {
        let wanted = match self.settings.mode {
            StyleMode::Single => return None,
            StyleMode::Graduated => ColumnKind::Numeric,
            StyleMode::Categorical => ColumnKind::Categorical,
        };
        if let Some(name) = self.settings.column.as_deref()
            && let Some(col) = self.results.column(name)
        {
            return Some(col.name.as_str());
        }
        let fallback = self
            .results
            .styleable_columns()
            .find(|c| c.kind == wanted)
            .or_else(|| self.results.styleable_columns().next())
            .map(|c| c.name.as_str());
        if fallback.is_some() {
            log::debug!(
                "style column {:?} not in schema, falling back to {:?}",
                self.settings.column,
                fallback
            );
        }
        fallback
    }

    pub fn numeric_sample(&self) -> NumericSample {
        self.active_column()
            .map(|c| self.results.numeric_sample(c, self.config.max_rows))
            .unwrap_or_default()
    }

    pub fn categorical_sample(&self) -> CategoricalSample {
        self.active_column()
            .map(|c| self.results.categorical_sample(c, self.config.max_rows))
            .unwrap_or_default()
    }

    /// `class_count + 1` breaks over the active column.
    pub fn active_breaks(&self) -> Vec<f64> {
        classify::compute_breaks_capped(
            &self.numeric_sample().values(),
            self.settings.method,
            self.settings.class_count,
            self.config.max_natural_breaks_n,
        )
    }

    /// `class_count` colors from the chosen ramp.
    pub fn active_ramp(&self) -> Vec<Rgb8> {
        let base = ramp::ramp_by_name(&self.settings.ramp).unwrap_or_else(ramp::default_ramp);
        ramp::resolve_ramp(base.stops, self.settings.class_count, self.settings.ramp_inverted)
    }

    pub fn category_palette(&self) -> CategoryPalette {
        CategoryPalette::assign(
            self.categorical_sample().distinct(),
            self.config.max_categories,
        )
    }

    pub fn paint_expression(&self) -> PaintExpression {
        match (self.settings.mode, self.active_column()) {
            (StyleMode::Graduated, Some(column)) => {
                step_expression(column, &self.active_breaks(), &self.active_ramp())
            }
            (StyleMode::Categorical, Some(column)) => {
                match_expression(column, &self.category_palette())
            }
            _ => PaintExpression::Constant {
                color: self.settings.single_color,
            },
        }
    }
}

/// Step expression from `k + 1` breaks and `k` colors. Degenerate breaks yield no thresholds.
pub fn step_expression(column: &str, breaks: &[f64], colors: &[Rgb8]) -> PaintExpression {
    let base = colors.first().copied().unwrap_or(ramp::OTHER_COLOR);
    let k = breaks.len().saturating_sub(1);
    let stops = if classify::is_degenerate(breaks) || k <= 1 {
        Vec::new()
    } else {
        breaks[1..k]
            .iter()
            .zip(colors.iter().skip(1))
            .map(|(b, c)| (*b, *c))
            .collect()
    };
    PaintExpression::Step {
        column: column.to_string(),
        base,
        stops,
    }
}

pub fn match_expression(column: &str, palette: &CategoryPalette) -> PaintExpression {
    PaintExpression::Match {
        column: column.to_string(),
        cases: palette.entries().to_vec(),
        fallback: palette.fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    fn results() -> Arc<ResultSet> {
        let rows: Vec<Row> = [(0.1, "a"), (0.2, "b"), (0.2, "a"), (0.5, "c"), (0.9, "b")]
            .iter()
            .map(|(v, k)| {
                let mut r = Row::new();
                r.insert("confidence".into(), Value::Float(*v));
                r.insert("kind".into(), Value::Text((*k).into()));
                r
            })
            .collect();
        Arc::new(ResultSet::new(vec!["kind".into(), "confidence".into()], rows))
    }

    #[test]
    fn defaults_pick_first_column() {
        let model = StyleModel::new(results(), ClassifyConfig::default());
        let s = model.settings();
        assert_eq!(s.mode, StyleMode::Single);
        assert_eq!(s.column.as_deref(), Some("kind"));
        assert_eq!(s.method, ClassMethod::Quantile);
        assert_eq!(s.class_count, 5);
        assert_eq!(s.ramp, "viridis");
        assert!((s.opacity - 0.85).abs() < 1e-12);
        assert!(matches!(model.paint_expression(), PaintExpression::Constant { .. }));
    }

    #[test]
    fn graduated_step_assigns_threshold_upward() {
        let mut model = StyleModel::new(results(), ClassifyConfig::default());
        model.set_settings(StyleSettings {
            mode: StyleMode::Graduated,
            column: Some("confidence".into()),
            method: ClassMethod::EqualInterval,
            class_count: 3,
            ..StyleSettings::default()
        });
        let expr = model.paint_expression();
        let colors = model.active_ramp();
        assert_eq!(expr.evaluate(&Value::Float(0.2)), colors[0]);
        assert_eq!(expr.evaluate(&Value::Float(0.5)), colors[1]);
        assert_eq!(expr.evaluate(&Value::Float(0.9)), colors[2]);
        let b = model.active_breaks();
        assert_eq!(expr.evaluate(&Value::Float(b[1])), colors[1]);
    }

    #[test]
    fn missing_column_falls_back_by_kind() {
        let mut model = StyleModel::new(results(), ClassifyConfig::default());
        model.set_settings(StyleSettings {
            mode: StyleMode::Graduated,
            column: Some("gone".into()),
            ..StyleSettings::default()
        });
        assert_eq!(model.active_column(), Some("confidence"));
    }

    #[test]
    fn categorical_match_has_fallback() {
        let mut model = StyleModel::new(results(), ClassifyConfig::default());
        model.set_settings(StyleSettings {
            mode: StyleMode::Categorical,
            column: Some("kind".into()),
            ..StyleSettings::default()
        });
        let expr = model.paint_expression();
        assert_eq!(expr.evaluate(&Value::Text("a".into())), ramp::CATEGORY_PALETTE[0]);
        assert_eq!(expr.evaluate(&Value::Text("c".into())), ramp::CATEGORY_PALETTE[2]);
        assert_eq!(expr.evaluate(&Value::Text("zzz".into())), ramp::OTHER_COLOR);
    }

    #[test]
    fn settings_are_normalized() {
        let s = StyleSettings {
            class_count: 40,
            opacity: 3.0,
            ramp: "nope".into(),
            ..StyleSettings::default()
        }
        .normalized();
        assert_eq!(s.class_count, 9);
        assert_eq!(s.opacity, 1.0);
        assert_eq!(s.ramp, "viridis");
    }

    #[test]
    fn settings_json_uses_kebab_methods() {
        let s = StyleSettings {
            method: ClassMethod::NaturalBreaks,
            ..StyleSettings::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["method"], "natural-breaks");
        assert_eq!(json["classCount"], 5);
        assert_eq!(json["singleColor"], "#4472C4");
    }
}
