//! mapclass_rs
//!
//! Thematic styling for query results shown on a map: classify a numeric
//! column into colored classes, color a categorical column from a palette,
//! and drive live map filters from an interactive legend. Pairs with the
//! `mapclass` CLI.
//!
//! ### Features
//! - Quantile, equal-interval and exact natural-breaks (Jenks) classification
//! - Built-in color ramps resampled to any class count, with inversion
//! - Renderer-agnostic paint expressions and filter predicates, plus a
//!   MapLibre-style JSON serializer
//! - Legend render models (preview and interactive) and SVG legend export
//! - Range selector and category toggles that update the map filter on every event
//!
//! ### Example
//! ```no_run
//! use std::sync::Arc;
//! use mapclass_rs::{ClassMethod, StyleSession, ClassifyConfig};
//! use mapclass_rs::paint::InMemoryLayers;
//!
//! let results = Arc::new(mapclass_rs::storage::load_result_set("results.csv")?);
//! let mut session = StyleSession::new(results, ClassifyConfig::default());
//! let settings = session.graduated_settings("confidence", ClassMethod::NaturalBreaks, 5);
//! session.update_settings(settings);
//!
//! let mut layers = InMemoryLayers::with_layers(["results-points"]);
//! let legend = session.apply(&mut layers);
//! mapclass_rs::viz::draw_legend_svg(&legend, "legend.svg", 320, 360)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod paint;
pub mod ramp;
pub mod session;
pub mod stats;
pub mod storage;
pub mod style;
pub mod viz;
pub mod viz_plotters_adapter;

pub use classify::{ClassMethod, compute_breaks};
pub use config::{ClassifyConfig, Config};
pub use filter::FilterPredicate;
pub use models::{ColumnKind, ResultSet, Value};
pub use ramp::{Rgb8, resolve_ramp};
pub use session::StyleSession;
pub use style::{PaintExpression, StyleMode, StyleSettings};
