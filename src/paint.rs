//! Map paint adapter.
//!
//! Pushes a [`PaintExpression`] and a [`FilterPredicate`] to an external map
//! renderer through the [`MapLayers`] trait, once per geometry layer. Layers
//! that do not exist yet are skipped. Writes identical to the previous push
//! are skipped as well, so repeated calls have no further side effects.
//!
//! Expressions are serialized by [`maplibre`]; nothing outside this module
//! depends on a renderer's expression syntax.

use crate::filter::FilterPredicate;
use crate::style::PaintExpression;
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Geometry layer kinds created per result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::Point,
        GeometryKind::Line,
        GeometryKind::Polygon,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            GeometryKind::Point => "points",
            GeometryKind::Line => "lines",
            GeometryKind::Polygon => "polygons",
        }
    }

    pub fn color_property(&self) -> &'static str {
        match self {
            GeometryKind::Point => "circle-color",
            GeometryKind::Line => "line-color",
            GeometryKind::Polygon => "fill-color",
        }
    }

    pub fn opacity_property(&self) -> &'static str {
        match self {
            GeometryKind::Point => "circle-opacity",
            GeometryKind::Line => "line-opacity",
            GeometryKind::Polygon => "fill-opacity",
        }
    }
}

/// The external renderer's layer API.
pub trait MapLayers {
    fn has_layer(&self, id: &str) -> bool;
    fn set_paint_property(&mut self, layer: &str, property: &str, value: Json);
    /// `None` clears the layer filter.
    fn set_filter(&mut self, layer: &str, filter: Option<Json>);
}

/// Translates style output into idempotent layer writes.
#[derive(Debug, Clone, Default)]
pub struct PaintAdapter {
    layer_prefix: String,
    written_paint: BTreeMap<(String, &'static str), Json>,
    written_filter: BTreeMap<String, Option<Json>>,
}

impl PaintAdapter {
    /// Layers are addressed as `{prefix}-{points|lines|polygons}`.
    pub fn new(layer_prefix: impl Into<String>) -> Self {
        Self {
            layer_prefix: layer_prefix.into(),
            ..Self::default()
        }
    }

    pub fn layer_id(&self, kind: GeometryKind) -> String {
        format!("{}-{}", self.layer_prefix, kind.suffix())
    }

    /// Forget what was written, e.g. after the renderer rebuilt its layers.
    pub fn invalidate(&mut self) {
        self.written_paint.clear();
        self.written_filter.clear();
    }

    /// Push color and opacity to every existing geometry layer. Returns the number of writes.
    pub fn push_paint<L: MapLayers + ?Sized>(
        &mut self,
        layers: &mut L,
        expr: &PaintExpression,
        opacity: f64,
    ) -> usize {
        let color = maplibre::paint(expr);
        let opacity = Json::from(opacity.clamp(0.0, 1.0));
        let mut writes = 0;
        for kind in GeometryKind::ALL {
            let id = self.layer_id(kind);
            if !layers.has_layer(&id) {
                log::warn!("paint: layer {id} not present, skipping");
                continue;
            }
            for (property, value) in [
                (kind.color_property(), &color),
                (kind.opacity_property(), &opacity),
            ] {
                let key = (id.clone(), property);
                if self.written_paint.get(&key) == Some(value) {
                    continue;
                }
                layers.set_paint_property(&id, property, value.clone());
                self.written_paint.insert(key, value.clone());
                writes += 1;
            }
        }
        writes
    }

    /// Push the filter to every existing geometry layer. Returns the number of writes.
    pub fn push_filter<L: MapLayers + ?Sized>(
        &mut self,
        layers: &mut L,
        predicate: &FilterPredicate,
    ) -> usize {
        let filter = maplibre::filter(predicate);
        let mut writes = 0;
        for kind in GeometryKind::ALL {
            let id = self.layer_id(kind);
            if !layers.has_layer(&id) {
                continue;
            }
            if self.written_filter.get(&id) == Some(&filter) {
                continue;
            }
            layers.set_filter(&id, filter.clone());
            self.written_filter.insert(id, filter.clone());
            writes += 1;
        }
        writes
    }
}

/// MapLibre GL style-spec expressions.
pub mod maplibre {
    use super::*;
    use serde_json::json;

    fn get_number(column: &str) -> Json {
        json!(["to-number", ["get", column]])
    }

    fn get_string(column: &str) -> Json {
        json!(["to-string", ["get", column]])
    }

    /// Color expression. Repeated step thresholds collapse onto the later
    /// (upper) class, since MapLibre requires strictly ascending stops.
    pub fn paint(expr: &PaintExpression) -> Json {
        match expr {
            PaintExpression::Constant { color } => json!(color.to_hex()),
            PaintExpression::Step {
                column,
                base,
                stops,
            } => {
                let mut merged: Vec<(f64, String)> = Vec::with_capacity(stops.len());
                for (t, c) in stops {
                    match merged.last_mut() {
                        Some(last) if last.0 == *t => last.1 = c.to_hex(),
                        _ => merged.push((*t, c.to_hex())),
                    }
                }
                if merged.is_empty() {
                    return json!(base.to_hex());
                }
                let mut out = vec![json!("step"), get_number(column), json!(base.to_hex())];
                for (t, c) in merged {
                    out.push(json!(t));
                    out.push(json!(c));
                }
                Json::Array(out)
            }
            PaintExpression::Match {
                column,
                cases,
                fallback,
            } => {
                if cases.is_empty() {
                    return json!(fallback.to_hex());
                }
                let mut out = vec![json!("match"), get_string(column)];
                for (v, c) in cases {
                    out.push(json!(v));
                    out.push(json!(c.to_hex()));
                }
                out.push(json!(fallback.to_hex()));
                Json::Array(out)
            }
        }
    }

    /// Layer filter; `None` means no filter.
    pub fn filter(predicate: &FilterPredicate) -> Option<Json> {
        match predicate {
            FilterPredicate::ShowAll => None,
            FilterPredicate::AlwaysFalse => Some(json!(false)),
            FilterPredicate::Range { column, min, max } => Some(json!([
                "all",
                [">=", get_number(column), min],
                ["<=", get_number(column), max]
            ])),
            FilterPredicate::Include { column, values } => {
                Some(json!(["in", get_string(column), ["literal", values]]))
            }
        }
    }
}

/// In-memory layer store: a stand-in renderer for tests and the CLI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryLayers {
    pub layers: BTreeMap<String, LayerState>,
    /// Total paint and filter writes received.
    pub writes: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerState {
    pub paint: BTreeMap<String, Json>,
    pub filter: Option<Json>,
}

impl InMemoryLayers {
    pub fn with_layers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            layers: ids
                .into_iter()
                .map(|id| (id.into(), LayerState::default()))
                .collect(),
            writes: 0,
        }
    }

    pub fn layer(&self, id: &str) -> Option<&LayerState> {
        self.layers.get(id)
    }
}

impl MapLayers for InMemoryLayers {
    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: Json) {
        if let Some(state) = self.layers.get_mut(layer) {
            state.paint.insert(property.to_string(), value);
            self.writes += 1;
        }
    }

    fn set_filter(&mut self, layer: &str, filter: Option<Json>) {
        if let Some(state) = self.layers.get_mut(layer) {
            state.filter = filter;
            self.writes += 1;
        }
    }
}
