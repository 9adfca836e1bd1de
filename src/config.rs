//! Configuration: sampling caps, default style, legend output.
//!
//! All fields are optional in JSON; missing ones take their defaults.
//!
//! ```json
//! {
//!   "classify": { "maxRows": 10000, "maxNaturalBreaksN": 4000 },
//!   "style": { "mode": "graduated", "column": "confidence", "method": "natural-breaks" },
//!   "legend": { "width": 360, "locale": "de" }
//! }
//! ```

use crate::classify::DEFAULT_NATURAL_BREAKS_CAP;
use crate::ramp::MAX_CATEGORIES;
use crate::style::StyleSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default row cap, matching the host application's result safety cap.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Bounds on how much data the classification and legend code touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifyConfig {
    /// Rows of a result set considered for samples and counts.
    pub max_rows: usize,
    /// Sample size above which natural breaks runs on a thinned sample.
    pub max_natural_breaks_n: usize,
    /// Distinct categorical values that receive their own color.
    pub max_categories: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_natural_breaks_n: DEFAULT_NATURAL_BREAKS_CAP,
            max_categories: MAX_CATEGORIES,
        }
    }
}

/// Output settings for exported legends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendConfig {
    pub width: u32,
    pub height: u32,
    /// Locale tag for count labels (`en`, `de`, `fr`, ...).
    pub locale: String,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 360,
            locale: "en".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub classify: ClassifyConfig,
    pub style: StyleSettings,
    pub legend: LegendConfig,
}

impl Config {
    /// Clamp out-of-range values so the rest of the crate can rely on them.
    pub fn normalized(mut self) -> Self {
        self.classify.max_rows = self.classify.max_rows.max(1);
        self.classify.max_natural_breaks_n = self.classify.max_natural_breaks_n.max(2);
        self.style = self.style.normalized();
        self
    }
}

/// Load a JSON configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg.normalized())
}
