//! Legend rendering.
//!
//! - [`legend`] builds renderer-independent legend models (preview and interactive)
//! - [`draw_legend`] paints a model onto any plotters drawing area
//! - [`draw_legend_svg`] writes a standalone SVG legend
//!
//! Value labels are compact (`1.23M`, `4.5k`); counts use locale separators.

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

// Re-export types for public API
pub use types::{BreakRow, CategoryRow, GraduatedLegend, Legend, LegendBody, LegendPhase};

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;
use std::path::Path;

use crate::filter::BarGeometry;
use crate::ramp::Rgb8;
use crate::viz_plotters_adapter::{fill_style, outline_style, rgb_color};
use text::truncate_to_width;

// Layout constants (must match `legend_height_px`)
const PAD: i32 = 12;
const TITLE_PX: u32 = 16;
const FONT_PX: u32 = 13;
const ROW_H: i32 = 22;
const SWATCH: i32 = 16;
const BAR_H: i32 = 16;
const COUNT_COL_W: i32 = 64;

const MUTED: RGBColor = RGBColor(150, 150, 150);
const HANDLE: Rgb8 = Rgb8::new(40, 40, 40);
const FRAME: Rgb8 = Rgb8::new(220, 220, 220);

/// Pixels needed to draw `legend` without clipping.
pub fn legend_height_px(legend: &Legend) -> u32 {
    let header = PAD + TITLE_PX as i32 + 10;
    let body = match &legend.body {
        LegendBody::Swatch { .. } => ROW_H,
        LegendBody::Categorical { rows } => ROW_H * rows.len() as i32,
        LegendBody::Graduated(g) => BAR_H + 8 + ROW_H + ROW_H * g.rows.len() as i32,
    };
    (header + body + PAD) as u32
}

/// Write `legend` to an SVG file.
pub fn draw_legend_svg<P: AsRef<Path>>(
    legend: &Legend,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let path_string = out_path.as_ref().to_string_lossy().into_owned();
    let height = height.max(legend_height_px(legend));
    let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
    draw_legend(&root, legend)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Bar placement for a drawing area of the given width; shared with pointer mapping.
pub fn bar_geometry(width_px: u32) -> BarGeometry {
    BarGeometry {
        left: PAD as f64,
        width: (width_px as i32 - 2 * PAD).max(1) as f64,
    }
}

pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &Legend,
) -> Result<()> {
    area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (w_u32, _) = area.dim_in_pixel();
    let w = w_u32 as i32;

    let title_style: TextStyle = TextStyle::from((FontFamily::SansSerif, TITLE_PX))
        .pos(Pos::new(HPos::Left, VPos::Top));
    let label_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));
    let muted_style = label_style.clone().color(&MUTED);
    let count_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Right, VPos::Center));

    let title = truncate_to_width(&legend.title, TITLE_PX, (w - 2 * PAD).max(0) as u32);
    area.draw(&Text::new(title, (PAD, PAD), title_style))
        .map_err(|e| anyhow!("{:?}", e))?;
    let mut y = PAD + TITLE_PX as i32 + 10;

    let text_x = PAD + SWATCH + 10;
    let label_w = (w - text_x - PAD - COUNT_COL_W).max(24) as u32;

    match &legend.body {
        LegendBody::Swatch {
            color,
            label,
            count,
        } => {
            area.draw(&Rectangle::new(
                [(PAD, y + 3), (PAD + SWATCH, y + 3 + SWATCH)],
                fill_style(*color, legend.opacity),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            let text = truncate_to_width(label, FONT_PX, label_w);
            area.draw(&Text::new(text, (text_x, y + ROW_H / 2), label_style.clone()))
                .map_err(|e| anyhow!("{:?}", e))?;
            if let Some(count) = count {
                area.draw(&Text::new(
                    count.as_str(),
                    (w - PAD, y + ROW_H / 2),
                    count_style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }

        LegendBody::Categorical { rows } => {
            for row in rows {
                let swatch = [(PAD, y + 3), (PAD + SWATCH, y + 3 + SWATCH)];
                let style = if row.visible {
                    fill_style(row.color, legend.opacity)
                } else {
                    outline_style(row.color, 1)
                };
                area.draw(&Rectangle::new(swatch, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
                let text = truncate_to_width(&row.label, FONT_PX, label_w);
                let style = if row.visible {
                    label_style.clone()
                } else {
                    muted_style.clone()
                };
                area.draw(&Text::new(text, (text_x, y + ROW_H / 2), style))
                    .map_err(|e| anyhow!("{:?}", e))?;
                area.draw(&Text::new(
                    row.count_label.as_str(),
                    (w - PAD, y + ROW_H / 2),
                    count_style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                y += ROW_H;
            }
        }

        LegendBody::Graduated(g) => {
            let bar = bar_geometry(w_u32);
            let classes = g.gradient.len().max(1);
            let seg_w = bar.width / classes as f64;
            for (i, color) in g.gradient.iter().enumerate() {
                let x0 = (bar.left + seg_w * i as f64).round() as i32;
                let x1 = (bar.left + seg_w * (i + 1) as f64).round() as i32;
                area.draw(&Rectangle::new(
                    [(x0, y), (x1, y + BAR_H)],
                    fill_style(*color, legend.opacity),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }

            if let Some((sel_min, sel_max)) = g.selection {
                let left = bar.pixel_of(sel_min, g.min, g.max).round() as i32;
                let right = bar.pixel_of(sel_max, g.min, g.max).round() as i32;
                let bar_l = bar.left.round() as i32;
                let bar_r = (bar.left + bar.width).round() as i32;
                let veil = WHITE.mix(0.7).filled();
                if left > bar_l {
                    area.draw(&Rectangle::new([(bar_l, y), (left, y + BAR_H)], veil))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
                if right < bar_r {
                    area.draw(&Rectangle::new([(right, y), (bar_r, y + BAR_H)], veil))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
                let dark = rgb_color(HANDLE);
                area.draw(&Rectangle::new(
                    [(left, y - 2), (right, y + BAR_H + 2)],
                    dark.stroke_width(1),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                for x in [left, right] {
                    area.draw(&Rectangle::new(
                        [(x - 2, y - 4), (x + 2, y + BAR_H + 4)],
                        dark.filled(),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
            y += BAR_H + 8;

            area.draw(&Text::new(
                g.min_label.as_str(),
                (PAD, y + ROW_H / 2),
                label_style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            area.draw(&Text::new(
                g.max_label.as_str(),
                (w - PAD, y + ROW_H / 2),
                count_style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            y += ROW_H;

            for row in &g.rows {
                area.draw(&Rectangle::new(
                    [(PAD, y + 3), (PAD + SWATCH, y + 3 + SWATCH)],
                    fill_style(row.color, legend.opacity),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                let text = truncate_to_width(&row.label, FONT_PX, label_w);
                area.draw(&Text::new(text, (text_x, y + ROW_H / 2), label_style.clone()))
                    .map_err(|e| anyhow!("{:?}", e))?;
                area.draw(&Text::new(
                    row.count_label.as_str(),
                    (w - PAD, y + ROW_H / 2),
                    count_style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                y += ROW_H;
            }
        }
    }

    // frame
    area.draw(&Rectangle::new(
        [(0, 0), (w - 1, legend_height_px(legend) as i32 - 1)],
        outline_style(FRAME, 1),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    Ok(())
}
