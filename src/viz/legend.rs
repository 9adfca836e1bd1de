//! Legend render models for the preview and interactive phases.
//!
//! Builders never fail: an empty or constant sample yields a single swatch.

use ahash::AHashMap;

use super::types::{BreakRow, CategoryRow, GraduatedLegend, Legend, LegendBody, LegendPhase};
use super::util::{format_count, format_range, format_value};
use crate::classify::{class_counts, is_degenerate};
use crate::filter::{CategoryToggle, RangeSelection, ToggleKey};
use crate::models::{CategoricalSample, NumericSample};
use crate::ramp::{CategoryPalette, OTHER_COLOR, Rgb8};
use crate::style::{StyleMode, StyleModel};

/// Shared presentation inputs.
#[derive(Debug, Clone, Copy)]
pub struct LegendContext<'a> {
    pub phase: LegendPhase,
    pub opacity: f64,
    pub locale: &'a str,
}

pub fn single_swatch(color: Rgb8, ctx: LegendContext<'_>) -> Legend {
    Legend {
        phase: ctx.phase,
        title: "Single color".into(),
        opacity: ctx.opacity,
        body: LegendBody::Swatch {
            color,
            label: "All features".into(),
            count: None,
        },
    }
}

/// Graduated legend: gradient, min/max labels, one row per class, and the
/// selection window when a range filter is attached.
pub fn graduated(
    column: &str,
    breaks: &[f64],
    colors: &[Rgb8],
    sample: &NumericSample,
    selection: Option<RangeSelection>,
    ctx: LegendContext<'_>,
) -> Legend {
    let title = column.to_string();
    let first_color = colors.first().copied().unwrap_or(OTHER_COLOR);

    if sample.is_empty() || is_degenerate(breaks) {
        let label = if sample.is_empty() {
            "No numeric values".to_string()
        } else {
            breaks.first().map(|b| format_value(*b)).unwrap_or_default()
        };
        return Legend {
            phase: ctx.phase,
            title,
            opacity: ctx.opacity,
            body: LegendBody::Swatch {
                color: first_color,
                label,
                count: Some(format_count(sample.len(), ctx.locale)),
            },
        };
    }

    let counts = class_counts(&sample.values(), breaks);
    let rows = breaks
        .windows(2)
        .zip(counts)
        .enumerate()
        .map(|(i, (w, count))| BreakRow {
            color: colors.get(i).copied().unwrap_or(OTHER_COLOR),
            lower: w[0],
            upper: w[1],
            label: format_range(w[0], w[1]),
            count,
            count_label: format_count(count, ctx.locale),
        })
        .collect();

    let (min, max) = (breaks[0], breaks[breaks.len() - 1]);
    Legend {
        phase: ctx.phase,
        title,
        opacity: ctx.opacity,
        body: LegendBody::Graduated(GraduatedLegend {
            column: column.to_string(),
            gradient: colors.to_vec(),
            min,
            max,
            min_label: format_value(min),
            max_label: format_value(max),
            rows,
            selection: selection.map(|s| (s.sel_min, s.sel_max)),
        }),
    }
}

/// Categorical legend: one row per palette entry with its row count, plus an
/// "Other" row when overflow categories exist.
pub fn categorical(
    column: &str,
    palette: &CategoryPalette,
    sample: &CategoricalSample,
    toggle: Option<&CategoryToggle>,
    ctx: LegendContext<'_>,
) -> Legend {
    let title = column.to_string();
    if palette.is_empty() {
        return Legend {
            phase: ctx.phase,
            title,
            opacity: ctx.opacity,
            body: LegendBody::Swatch {
                color: palette.fallback(),
                label: "No values".into(),
                count: Some(format_count(0, ctx.locale)),
            },
        };
    }

    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for (_, key) in &sample.entries {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    let visible = |key: &ToggleKey| toggle.is_none_or(|t| t.is_visible(key));

    let mut rows: Vec<CategoryRow> = palette
        .entries()
        .iter()
        .map(|(value, color)| {
            let count = counts.get(value.as_str()).copied().unwrap_or(0);
            let key = ToggleKey::value(value.as_str());
            CategoryRow {
                visible: visible(&key),
                key,
                label: value.clone(),
                color: *color,
                count,
                count_label: format_count(count, ctx.locale),
            }
        })
        .collect();

    if palette.has_overflow() {
        let count: usize = palette
            .overflow()
            .iter()
            .map(|v| counts.get(v.as_str()).copied().unwrap_or(0))
            .sum();
        rows.push(CategoryRow {
            key: ToggleKey::Other,
            label: format!("Other ({} values)", palette.overflow().len()),
            color: palette.fallback(),
            count,
            count_label: format_count(count, ctx.locale),
            visible: visible(&ToggleKey::Other),
        });
    }

    Legend {
        phase: ctx.phase,
        title,
        opacity: ctx.opacity,
        body: LegendBody::Categorical { rows },
    }
}

/// Live preview of the current, not yet applied, settings.
pub fn preview(model: &StyleModel, locale: &str) -> Legend {
    let settings = model.settings();
    let ctx = LegendContext {
        phase: LegendPhase::Preview,
        opacity: settings.opacity,
        locale,
    };
    match (settings.mode, model.active_column()) {
        (StyleMode::Graduated, Some(column)) => graduated(
            column,
            &model.active_breaks(),
            &model.active_ramp(),
            &model.numeric_sample(),
            None,
            ctx,
        ),
        (StyleMode::Categorical, Some(column)) => categorical(
            column,
            &model.category_palette(),
            &model.categorical_sample(),
            None,
            ctx,
        ),
        _ => single_swatch(settings.single_color, ctx),
    }
}
