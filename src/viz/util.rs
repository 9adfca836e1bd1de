//! Label formatting for legends: compact value labels and locale-aware counts.

use num_format::{Locale, ToFormattedString};

/// Compact value label: `1.23M`, `4.5k`, `0.37`, or a bare integer.
///
/// Presentation only; filter boundaries always use the unformatted value.
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        return "NA".to_string();
    }
    let a = v.abs();
    if a >= 1.0e6 {
        format!("{:.2}M", v / 1.0e6)
    } else if a >= 1.0e3 {
        format!("{:.1}k", v / 1.0e3)
    } else if v.fract() != 0.0 {
        format!("{:.2}", v)
    } else {
        format!("{}", v as i64)
    }
}

/// Label for a class spanning `[lower, upper]`.
pub fn format_range(lower: f64, upper: f64) -> String {
    if lower == upper {
        format_value(lower)
    } else {
        format!("{} – {}", format_value(lower), format_value(upper))
    }
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en, // default
    }
}

/// Row count with thousands separators for the given locale tag.
pub fn format_count(n: usize, locale_tag: &str) -> String {
    n.to_formatted_string(map_locale(locale_tag))
}
