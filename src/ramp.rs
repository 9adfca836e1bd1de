//! Colors, named ramps, and categorical palettes.
//!
//! - Graduated styling resamples a fixed-stop base ramp to the class count
//!   ([`resolve_ramp`]), interpolating each channel linearly in 0–255 space.
//! - Categorical styling assigns colors from [`CATEGORY_PALETTE`] in first-seen
//!   order, up to [`MAX_CATEGORIES`] values; the rest share [`OTHER_COLOR`].
//!
//! Everything here is deterministic: identical inputs produce identical colors.

use ahash::AHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 8-bit sRGB color. Serialized as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// Parse `#RRGGBB`, `RRGGBB`, or the short `#RGB` form.
    pub fn from_hex(s: &str) -> Option<Self> {
        let h = s.trim().trim_start_matches('#');
        let channel = |i: usize, len: usize| u8::from_str_radix(h.get(i..i + len)?, 16).ok();
        match h.len() {
            6 => Some(Self::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation, `t` in [0, 1].
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let mix = |a: u8, b: u8| {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb8::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb8::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

/// A named base ramp, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    pub name: &'static str,
    pub stops: &'static [Rgb8],
    /// Diverging ramps have a meaningful midpoint.
    pub diverging: bool,
}

macro_rules! stops {
    ($($hex:literal),* $(,)?) => {
        &[$(Rgb8::from_u32($hex)),*]
    };
}

/// Built-in ramps. The first entry is the default.
pub const RAMPS: &[ColorRamp] = &[
    ColorRamp {
        name: "viridis",
        stops: stops![
            0x440154, 0x472D7B, 0x3B528B, 0x2C728E, 0x21918C, 0x28AE80, 0x5EC962, 0xADDC30,
            0xFDE725,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "blues",
        stops: stops![
            0xF7FBFF, 0xDEEBF7, 0xC6DBEF, 0x9ECAE1, 0x6BAED6, 0x4292C6, 0x2171B5, 0x08519C,
            0x08306B,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "greens",
        stops: stops![
            0xF7FCF5, 0xE5F5E0, 0xC7E9C0, 0xA1D99B, 0x74C476, 0x41AB5D, 0x238B45, 0x006D2C,
            0x00441B,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "reds",
        stops: stops![
            0xFFF5F0, 0xFEE0D2, 0xFCBBA1, 0xFC9272, 0xFB6A4A, 0xEF3B2C, 0xCB181D, 0xA50F15,
            0x67000D,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "oranges",
        stops: stops![
            0xFFF5EB, 0xFEE6CE, 0xFDD0A2, 0xFDAE6B, 0xFD8D3C, 0xF16913, 0xD94801, 0xA63603,
            0x7F2704,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "purples",
        stops: stops![
            0xFCFBFD, 0xEFEDF5, 0xDADAEB, 0xBCBDDC, 0x9E9AC8, 0x807DBA, 0x6A51A3, 0x54278F,
            0x3F007D,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "yl-or-rd",
        stops: stops![
            0xFFFFCC, 0xFFEDA0, 0xFED976, 0xFEB24C, 0xFD8D3C, 0xFC4E2A, 0xE31A1C, 0xBD0026,
            0x800026,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "yl-gn-bu",
        stops: stops![
            0xFFFFD9, 0xEDF8B1, 0xC7E9B4, 0x7FCDBB, 0x41B6C4, 0x1D91C0, 0x225EA8, 0x253494,
            0x081D58,
        ],
        diverging: false,
    },
    ColorRamp {
        name: "rd-yl-bu",
        stops: stops![
            0xD73027, 0xF46D43, 0xFDAE61, 0xFEE090, 0xFFFFBF, 0xE0F3F8, 0xABD9E9, 0x74ADD1,
            0x4575B4,
        ],
        diverging: true,
    },
    ColorRamp {
        name: "spectral",
        stops: stops![
            0xD53E4F, 0xF46D43, 0xFDAE61, 0xFEE08B, 0xFFFFBF, 0xE6F598, 0xABDDA4, 0x66C2A5,
            0x3288BD,
        ],
        diverging: true,
    },
];

pub fn default_ramp() -> &'static ColorRamp {
    &RAMPS[0]
}

/// Look up a built-in ramp by name (case-insensitive, `_` and `-` equivalent).
pub fn ramp_by_name(name: &str) -> Option<&'static ColorRamp> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    RAMPS.iter().find(|r| r.name == wanted)
}

/// Resample `base` to exactly `k` colors, low to high.
///
/// A base of length `k` is returned unchanged (reversed when `inverted`).
/// Otherwise output `i` samples position `i/(k−1)` along the stop list and
/// interpolates the two bracketing stops per channel. Inversion reverses the
/// base before resampling.
pub fn resolve_ramp(base: &[Rgb8], k: usize, inverted: bool) -> Vec<Rgb8> {
    let mut stops = base.to_vec();
    if inverted {
        stops.reverse();
    }
    if k == 0 {
        return Vec::new();
    }
    if stops.is_empty() {
        return vec![OTHER_COLOR; k];
    }
    if stops.len() == k {
        return stops;
    }
    if k == 1 || stops.len() == 1 {
        return vec![stops[0]; k];
    }

    let last = stops.len() - 1;
    (0..k)
        .map(|i| {
            let pos = i as f64 / (k - 1) as f64 * last as f64;
            let lo = (pos.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            stops[lo].lerp(stops[hi], pos - lo as f64)
        })
        .collect()
}

/// Color used for the `single` style mode unless configured otherwise.
pub const DEFAULT_SINGLE_COLOR: Rgb8 = Rgb8::from_u32(0x4472C4);

/// Fallback for categories beyond the palette limit and for unmatched values.
pub const OTHER_COLOR: Rgb8 = Rgb8::from_u32(0xBDBDBD);

/// Most distinct categories that receive their own color.
pub const MAX_CATEGORIES: usize = 20;

/// Categorical palette, cycled when more categories than entries are assigned.
/// Office chart series colors first, then ten further distinct hues.
pub const CATEGORY_PALETTE: [Rgb8; 20] = [
    Rgb8::from_u32(0x4472C4), // blue
    Rgb8::from_u32(0xED7D31), // orange
    Rgb8::from_u32(0xA5A5A5), // gray
    Rgb8::from_u32(0xFFC000), // gold
    Rgb8::from_u32(0x5B9BD5), // light blue
    Rgb8::from_u32(0x70AD47), // green
    Rgb8::from_u32(0x264478), // dark blue
    Rgb8::from_u32(0x9E480E), // dark orange
    Rgb8::from_u32(0x636363), // dark gray
    Rgb8::from_u32(0x997300), // brownish
    Rgb8::from_u32(0x17BECF), // cyan
    Rgb8::from_u32(0xBCBD22), // olive
    Rgb8::from_u32(0xE377C2), // pink
    Rgb8::from_u32(0x8C564B), // brown
    Rgb8::from_u32(0x9467BD), // violet
    Rgb8::from_u32(0xD62728), // red
    Rgb8::from_u32(0x2CA02C), // dark green
    Rgb8::from_u32(0xFF9896), // salmon
    Rgb8::from_u32(0xC5B0D5), // lavender
    Rgb8::from_u32(0xF7B6D2), // light pink
];

/// Category → color assignment for one column, in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryPalette {
    entries: Vec<(String, Rgb8)>,
    overflow: Vec<String>,
}

impl CategoryPalette {
    /// Assign colors to distinct values (first-seen order) up to `limit`;
    /// later distinct values are collected as overflow.
    pub fn assign<'a, I>(distinct: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut palette = CategoryPalette::default();
        let mut seen: AHashSet<&str> = AHashSet::new();
        for value in distinct {
            if !seen.insert(value) {
                continue;
            }
            if palette.entries.len() < limit {
                let color = CATEGORY_PALETTE[palette.entries.len() % CATEGORY_PALETTE.len()];
                palette.entries.push((value.to_string(), color));
            } else {
                palette.overflow.push(value.to_string());
            }
        }
        palette
    }

    pub fn entries(&self) -> &[(String, Rgb8)] {
        &self.entries
    }

    /// Distinct values past the limit, sharing the fallback color.
    pub fn overflow(&self) -> &[String] {
        &self.overflow
    }

    pub fn has_overflow(&self) -> bool {
        !self.overflow.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|(v, _)| v == value)
    }

    pub fn color_for(&self, value: &str) -> Rgb8 {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
            .unwrap_or(OTHER_COLOR)
    }

    pub fn fallback(&self) -> Rgb8 {
        OTHER_COLOR
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_and_short_form() {
        assert_eq!(Rgb8::from_hex("#4472C4"), Some(Rgb8::new(68, 114, 196)));
        assert_eq!(Rgb8::from_hex("fff"), Some(Rgb8::new(255, 255, 255)));
        assert_eq!(Rgb8::from_hex("#12345"), None);
        assert_eq!(Rgb8::new(1, 2, 255).to_hex(), "#0102FF");
    }

    #[test]
    fn same_length_base_is_returned_as_is() {
        let base = [Rgb8::new(0, 0, 0), Rgb8::new(10, 10, 10), Rgb8::new(20, 20, 20)];
        assert_eq!(resolve_ramp(&base, 3, false), base.to_vec());
        let inv = resolve_ramp(&base, 3, true);
        assert_eq!(inv[0], Rgb8::new(20, 20, 20));
    }

    #[test]
    fn stretch_two_stops_to_five() {
        let base = [Rgb8::new(0, 0, 0), Rgb8::new(255, 100, 0)];
        let out = resolve_ramp(&base, 5, false);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], Rgb8::new(0, 0, 0));
        assert_eq!(out[2], Rgb8::new(128, 50, 0));
        assert_eq!(out[4], Rgb8::new(255, 100, 0));
    }

    #[test]
    fn compress_nine_stops_keeps_ends() {
        let ramp = ramp_by_name("Yl_Or_Rd").unwrap();
        let out = resolve_ramp(ramp.stops, 3, false);
        assert_eq!(out, vec![ramp.stops[0], ramp.stops[4], ramp.stops[8]]);
        let inv = resolve_ramp(ramp.stops, 3, true);
        assert_eq!(inv[0], ramp.stops[8]);
    }

    #[test]
    fn resolving_twice_is_stable() {
        for k in 3..=9 {
            let once = resolve_ramp(default_ramp().stops, k, false);
            assert_eq!(resolve_ramp(&once, k, false), once);
        }
    }

    #[test]
    fn palette_overflow_falls_back() {
        let values: Vec<String> = (0..25).map(|i| format!("c{i}")).collect();
        let p = CategoryPalette::assign(values.iter().map(String::as_str), MAX_CATEGORIES);
        assert_eq!(p.len(), 20);
        assert_eq!(p.overflow().len(), 5);
        assert_eq!(p.color_for("c0"), CATEGORY_PALETTE[0]);
        assert_eq!(p.color_for("c24"), OTHER_COLOR);
    }

    #[test]
    fn high_cardinality_palette_keeps_first_seen_overflow() {
        let mut values: Vec<String> = (0..10_000).map(|i| format!("id-{i}")).collect();
        values.push("id-3".into());
        values.push("id-9999".into());
        let p = CategoryPalette::assign(values.iter().map(String::as_str), MAX_CATEGORIES);
        assert_eq!(p.len(), MAX_CATEGORIES);
        assert_eq!(p.overflow().len(), 10_000 - MAX_CATEGORIES);
        assert_eq!(p.overflow()[0], "id-20");
        assert_eq!(p.overflow().last().map(String::as_str), Some("id-9999"));
    }
}
