//! Range filter for graduated legends.
//!
//! The selection window `[sel_min, sel_max]` lives inside the absolute sample
//! range. Handles are kept at least `ε` apart (1% of the absolute range); the
//! window can be panned without changing its width. Every mutation yields a
//! fresh [`FilterPredicate`], so callers can push it to the map on each
//! pointer move rather than only on release.

use super::FilterPredicate;

/// Minimum handle separation as a fraction of the absolute range.
pub const HANDLE_EPSILON_FRACTION: f64 = 0.01;

/// Selection state. Transitions are pure: each returns the next state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSelection {
    pub abs_min: f64,
    pub abs_max: f64,
    pub sel_min: f64,
    pub sel_max: f64,
}

impl RangeSelection {
    /// Full-range selection.
    pub fn full(abs_min: f64, abs_max: f64) -> Self {
        let (lo, hi) = if abs_min <= abs_max {
            (abs_min, abs_max)
        } else {
            (abs_max, abs_min)
        };
        Self {
            abs_min: lo,
            abs_max: hi,
            sel_min: lo,
            sel_max: hi,
        }
    }

    pub fn epsilon(&self) -> f64 {
        (self.abs_max - self.abs_min) * HANDLE_EPSILON_FRACTION
    }

    pub fn is_full(&self) -> bool {
        self.sel_min <= self.abs_min && self.sel_max >= self.abs_max
    }

    /// Move the min handle; never closer than `ε` below `sel_max`.
    pub fn with_min(self, value: f64) -> Self {
        let hi = self.sel_max - self.epsilon();
        Self {
            sel_min: value.min(hi).max(self.abs_min),
            ..self
        }
    }

    /// Move the max handle; never closer than `ε` above `sel_min`.
    pub fn with_max(self, value: f64) -> Self {
        let lo = self.sel_min + self.epsilon();
        Self {
            sel_max: value.max(lo).min(self.abs_max),
            ..self
        }
    }

    /// Pan the window by `delta`, stopping at either end with its width intact.
    pub fn translate(self, delta: f64) -> Self {
        let delta = delta
            .min(self.abs_max - self.sel_max)
            .max(self.abs_min - self.sel_min);
        Self {
            sel_min: self.sel_min + delta,
            sel_max: self.sel_max + delta,
            ..self
        }
    }

    pub fn reset(self) -> Self {
        Self::full(self.abs_min, self.abs_max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.sel_min && value <= self.sel_max
    }
}

/// Horizontal placement of the legend bar, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
}

impl Default for BarGeometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            width: 240.0,
        }
    }
}

impl BarGeometry {
    /// Bar fraction of a pointer position, clamped to [0, 1].
    pub fn fraction_at(&self, pixel_x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        ((pixel_x - self.left) / self.width).clamp(0.0, 1.0)
    }

    /// `abs_min + fraction · (abs_max − abs_min)`.
    pub fn value_at(&self, pixel_x: f64, abs_min: f64, abs_max: f64) -> f64 {
        abs_min + self.fraction_at(pixel_x) * (abs_max - abs_min)
    }

    pub fn pixel_of(&self, value: f64, abs_min: f64, abs_max: f64) -> f64 {
        let span = abs_max - abs_min;
        if span <= 0.0 {
            return self.left;
        }
        self.left + ((value - abs_min) / span).clamp(0.0, 1.0) * self.width
    }
}

/// Which part of the selector a drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Min,
    Max,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    handle: DragHandle,
    start_x: f64,
    start: RangeSelection,
}

/// Range filter controller over one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    column: String,
    selection: RangeSelection,
    bar: BarGeometry,
    drag: Option<Drag>,
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, abs_min: f64, abs_max: f64, bar: BarGeometry) -> Self {
        Self {
            column: column.into(),
            selection: RangeSelection::full(abs_min, abs_max),
            bar,
            drag: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn selection(&self) -> RangeSelection {
        self.selection
    }

    pub fn bar(&self) -> BarGeometry {
        self.bar
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current predicate: none for a full selection, else an inclusive range.
    pub fn predicate(&self) -> FilterPredicate {
        if self.selection.is_full() {
            FilterPredicate::ShowAll
        } else {
            FilterPredicate::Range {
                column: self.column.clone(),
                min: self.selection.sel_min,
                max: self.selection.sel_max,
            }
        }
    }

    pub fn pointer_down(&mut self, handle: DragHandle, pixel_x: f64) {
        self.drag = Some(Drag {
            handle,
            start_x: pixel_x,
            start: self.selection,
        });
    }

    /// Apply an intermediate drag position. `None` when no drag is active.
    pub fn pointer_move(&mut self, pixel_x: f64) -> Option<FilterPredicate> {
        let drag = self.drag?;
        let RangeSelection {
            abs_min, abs_max, ..
        } = self.selection;
        self.selection = match drag.handle {
            DragHandle::Min => self
                .selection
                .with_min(self.bar.value_at(pixel_x, abs_min, abs_max)),
            DragHandle::Max => self
                .selection
                .with_max(self.bar.value_at(pixel_x, abs_min, abs_max)),
            DragHandle::Window => {
                let delta = if self.bar.width > 0.0 {
                    (pixel_x - drag.start_x) / self.bar.width * (abs_max - abs_min)
                } else {
                    0.0
                };
                drag.start.translate(delta)
            }
        };
        Some(self.predicate())
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Set both bounds directly in value space, applying the handle clamps.
    pub fn set_range(&mut self, min: f64, max: f64) -> FilterPredicate {
        self.selection = self.selection.reset().with_max(max).with_min(min);
        self.predicate()
    }

    pub fn reset(&mut self) -> FilterPredicate {
        self.drag = None;
        self.selection = self.selection.reset();
        self.predicate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> BarGeometry {
        BarGeometry {
            left: 10.0,
            width: 200.0,
        }
    }

    #[test]
    fn min_handle_clamps_below_max() {
        let s = RangeSelection::full(0.0, 100.0).with_max(80.0).with_min(90.0);
        assert_eq!(s.sel_max, 80.0);
        assert!((s.sel_min - 79.0).abs() < 1e-12);
    }

    #[test]
    fn max_handle_clamps_above_min() {
        let s = RangeSelection::full(0.0, 100.0).with_min(50.0).with_max(-10.0);
        assert!((s.sel_max - 51.0).abs() < 1e-12);
    }

    #[test]
    fn window_pan_keeps_width_at_bounds() {
        let s = RangeSelection::full(0.0, 100.0).with_min(20.0).with_max(40.0);
        let moved = s.translate(500.0);
        assert_eq!((moved.sel_min, moved.sel_max), (80.0, 100.0));
        let moved = s.translate(-500.0);
        assert_eq!((moved.sel_min, moved.sel_max), (0.0, 20.0));
    }

    #[test]
    fn pixel_mapping_is_linear_and_clamped() {
        let b = bar();
        assert_eq!(b.value_at(10.0, 0.0, 100.0), 0.0);
        assert_eq!(b.value_at(110.0, 0.0, 100.0), 50.0);
        assert_eq!(b.value_at(500.0, 0.0, 100.0), 100.0);
        assert_eq!(b.value_at(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(b.pixel_of(25.0, 0.0, 100.0), 60.0);
    }

    #[test]
    fn drag_emits_clamped_predicate_each_move() {
        let mut f = RangeFilter::new("v", 0.0, 100.0, bar());
        f.set_range(0.0, 80.0);
        f.pointer_down(DragHandle::Min, 10.0);
        // pixel 190 maps to value 90
        let p = f.pointer_move(190.0).unwrap();
        match p {
            FilterPredicate::Range { min, max, .. } => {
                assert!((min - 79.0).abs() < 1e-9);
                assert_eq!(max, 80.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        f.pointer_up();
        assert_eq!(f.pointer_move(20.0), None);
    }

    #[test]
    fn window_drag_uses_start_snapshot() {
        let mut f = RangeFilter::new("v", 0.0, 100.0, bar());
        f.set_range(20.0, 40.0);
        f.pointer_down(DragHandle::Window, 100.0);
        f.pointer_move(120.0);
        f.pointer_move(140.0);
        let s = f.selection();
        assert!((s.sel_min - 40.0).abs() < 1e-9);
        assert!((s.sel_max - 60.0).abs() < 1e-9);
    }

    #[test]
    fn reset_restores_show_all() {
        let mut f = RangeFilter::new("v", 3.0, 9.0, bar());
        f.set_range(4.0, 5.0);
        assert!(!f.predicate().is_show_all());
        assert_eq!(f.reset(), FilterPredicate::ShowAll);
        assert_eq!((f.selection().sel_min, f.selection().sel_max), (3.0, 9.0));
    }
}
