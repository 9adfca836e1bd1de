//! Adapter helpers to use crate colors with the plotters crate.
//!
//! Usage example (inside a drawing function):
//! ```ignore
//!     use plotters::prelude::*;
//!     use crate::viz_plotters_adapter::{fill_style, outline_style};
//!
//!     // Class swatch at the style's opacity:
//!     area.draw(&Rectangle::new([(x0, y0), (x1, y1)], fill_style(color, 0.85)))?;
//!     // Hidden category: outline only.
//!     area.draw(&Rectangle::new([(x0, y0), (x1, y1)], outline_style(color, 1)))?;
//! ```

use plotters::prelude::*;

use crate::ramp::Rgb8;

pub fn rgb_color(color: Rgb8) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// Filled style at the given opacity (clamped to [0, 1]).
pub fn fill_style(color: Rgb8, opacity: f64) -> ShapeStyle {
    rgb_color(color).mix(opacity.clamp(0.0, 1.0)).filled()
}

/// Unfilled outline of the given stroke width.
pub fn outline_style(color: Rgb8, stroke_width: u32) -> ShapeStyle {
    ShapeStyle {
        color: rgb_color(color).to_rgba(),
        filled: false,
        stroke_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_is_clamped_into_alpha() {
        let s = fill_style(Rgb8::new(10, 20, 30), 1.7);
        assert!(s.filled);
        assert_eq!(s.color.3, 1.0);
        let s = fill_style(Rgb8::new(10, 20, 30), 0.25);
        assert!((s.color.3 - 0.25).abs() < 1e-9);
        assert_eq!((s.color.0, s.color.1, s.color.2), (10, 20, 30));
    }

    #[test]
    fn outline_is_not_filled() {
        let s = outline_style(Rgb8::new(1, 1, 1), 2);
        assert!(!s.filled);
        assert_eq!(s.stroke_width, 2);
    }
}
