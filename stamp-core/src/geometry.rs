//! Overlay geometry - clamped drag, resize, and reset of the marker.
//!
//! The engine owns the *baseline* (last committed) position explicitly.
//! Drag ticks propose `baseline + cumulative translation`; every mutation
//! re-clamps before publishing, so the marker can never leave the canvas.

use serde::{Deserialize, Serialize};

/// Smallest allowed marker edge, in canvas pixels.
pub const MIN_MARKER_SIZE: f32 = 40.0;

/// Largest allowed marker edge, in canvas pixels.
pub const MAX_MARKER_SIZE: f32 = 180.0;

/// Default marker edge, in canvas pixels.
pub const DEFAULT_MARKER_SIZE: f32 = 90.0;

/// Default marker foreground color.
pub const DEFAULT_MARKER_COLOR: &str = "#000";

/// Quick-pick palette for the marker foreground.
pub const MARKER_COLOR_PRESETS: [&str; 7] = [
    "#000", "#2e8b57", "#e85d04", "#005af0", "#222", "#ff0000", "#edff21",
];

/// Right/bottom margins of the default marker placement.
const DEFAULT_MARGIN_X: f32 = 20.0;
const DEFAULT_MARGIN_Y: f32 = 40.0;

/// Fixed-size composition area for one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Canvas {
    /// Create a canvas with the given dimensions.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Canvas {
    /// The preview size the editor composes against.
    fn default() -> Self {
        Self::new(320.0, 500.0)
    }
}

/// A position inside the canvas, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cumulative translation of one continuous drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    /// Horizontal delta since the gesture began.
    pub dx: f32,
    /// Vertical delta since the gesture began.
    pub dy: f32,
}

impl Translation {
    /// Create a translation.
    #[must_use]
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Published marker state: live position, edge size, and foreground color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayState {
    /// Live (possibly mid-drag) position.
    pub position: Position,
    /// Marker edge in pixels, within [`MIN_MARKER_SIZE`], [`MAX_MARKER_SIZE`].
    pub size: f32,
    /// Foreground color as a hex string.
    pub color: String,
}

/// Drag lifecycle of the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    /// No gesture since the last reset.
    Idle,
    /// A gesture is in progress; the live position may differ from baseline.
    Dragging,
    /// The last gesture has been committed to the baseline.
    Committed,
}

/// Clamped drag/resize engine for the marker overlay.
///
/// Invariant: after every public mutation, both the live position and the
/// baseline satisfy `0 <= x <= width - size` and `0 <= y <= height - size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayGeometry {
    canvas: Canvas,
    /// Last committed position; the origin for the next drag's translation.
    baseline: Position,
    /// Live position published to renderers.
    live: Position,
    size: f32,
    color: String,
    phase: DragPhase,
}

impl OverlayGeometry {
    /// Create an engine with the default marker placement on `canvas`.
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        let size = DEFAULT_MARKER_SIZE.clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE);
        let start = Self::clamp_for(canvas, Self::default_position(canvas, size), size);
        Self {
            canvas,
            baseline: start,
            live: start,
            size,
            color: DEFAULT_MARKER_COLOR.to_string(),
            phase: DragPhase::Idle,
        }
    }

    /// Bottom-right default placement for the given size.
    fn default_position(canvas: Canvas, size: f32) -> Position {
        Position::new(
            canvas.width - size - DEFAULT_MARGIN_X,
            canvas.height - size - DEFAULT_MARGIN_Y,
        )
    }

    fn clamp_for(canvas: Canvas, proposed: Position, size: f32) -> Position {
        Position::new(
            proposed.x.clamp(0.0, (canvas.width - size).max(0.0)),
            proposed.y.clamp(0.0, (canvas.height - size).max(0.0)),
        )
    }

    fn clamp(&self, proposed: Position) -> Position {
        Self::clamp_for(self.canvas, proposed, self.size)
    }

    /// Apply an in-progress drag tick.
    ///
    /// Computes `baseline + translation`, clamps it into the canvas, and
    /// publishes it as the live position. The baseline is untouched, so this
    /// can be called on every tick of one continuous gesture.
    pub fn drag_update(&mut self, translation: Translation) -> Position {
        let proposed = Position::new(
            self.baseline.x + translation.dx,
            self.baseline.y + translation.dy,
        );
        self.live = self.clamp(proposed);
        self.phase = DragPhase::Dragging;
        self.live
    }

    /// End (or cancel) the current gesture, committing the clamped result
    /// as the new baseline.
    ///
    /// An end event arriving while already [`DragPhase::Committed`] is
    /// ignored; committing twice would integrate the same translation into
    /// the baseline a second time.
    pub fn drag_end(&mut self, translation: Translation) -> Position {
        if self.phase == DragPhase::Committed {
            return self.live;
        }
        let committed = self.clamp(Position::new(
            self.baseline.x + translation.dx,
            self.baseline.y + translation.dy,
        ));
        self.baseline = committed;
        self.live = committed;
        self.phase = DragPhase::Committed;
        committed
    }

    /// Change the marker size, keeping the marker inside the canvas.
    ///
    /// The requested size is clamped into the legal range first, then the
    /// baseline is re-clamped against the reduced travel range. Baseline and
    /// live position move together, so a resize never leaves a stale
    /// mid-drag position behind.
    pub fn resize(&mut self, new_size: f32) -> (Position, f32) {
        self.size = new_size.clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE);
        let repositioned = self.clamp(self.baseline);
        self.baseline = repositioned;
        self.live = repositioned;
        (repositioned, self.size)
    }

    /// Set the marker foreground color.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    /// Restore the default placement, size, and color.
    pub fn reset(&mut self) -> (Position, f32) {
        self.size = DEFAULT_MARKER_SIZE.clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE);
        let start = self.clamp(Self::default_position(self.canvas, self.size));
        self.baseline = start;
        self.live = start;
        self.color = DEFAULT_MARKER_COLOR.to_string();
        self.phase = DragPhase::Idle;
        (start, self.size)
    }

    /// The canvas this engine clamps against.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Current drag phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Last committed position.
    #[must_use]
    pub fn baseline(&self) -> Position {
        self.baseline
    }

    /// Current marker size.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Current marker color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Live marker state, as a renderer should draw it right now.
    #[must_use]
    pub fn state(&self) -> OverlayState {
        OverlayState {
            position: self.live,
            size: self.size,
            color: self.color.clone(),
        }
    }

    /// Committed marker state, safe to flatten into an output raster.
    #[must_use]
    pub fn committed_state(&self) -> OverlayState {
        OverlayState {
            position: self.baseline,
            size: self.size,
            color: self.color.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> OverlayGeometry {
        OverlayGeometry::new(Canvas::default())
    }

    #[test]
    fn default_placement_matches_canvas_margins() {
        let geo = engine();
        assert_eq!(geo.baseline(), Position::new(210.0, 370.0));
        assert_eq!(geo.size(), 90.0);
        assert_eq!(geo.color(), DEFAULT_MARKER_COLOR);
        // The default color is the first preset in the palette.
        assert_eq!(MARKER_COLOR_PRESETS[0], DEFAULT_MARKER_COLOR);
    }

    #[test]
    fn drag_clamps_to_bottom_right_corner() {
        // 320x500 canvas, size 90, baseline (210, 370): a (50, 200) drag
        // proposes (260, 570) and must clamp to (230, 410).
        let mut geo = engine();
        let live = geo.drag_update(Translation::new(50.0, 200.0));
        assert_eq!(live, Position::new(230.0, 410.0));
        // Baseline untouched mid-drag.
        assert_eq!(geo.baseline(), Position::new(210.0, 370.0));

        let committed = geo.drag_end(Translation::new(50.0, 200.0));
        assert_eq!(committed, Position::new(230.0, 410.0));
        assert_eq!(geo.baseline(), committed);
    }

    #[test]
    fn drag_clamps_to_origin() {
        let mut geo = engine();
        let live = geo.drag_update(Translation::new(-1000.0, -1000.0));
        assert_eq!(live, Position::new(0.0, 0.0));
    }

    #[test]
    fn repeated_updates_share_one_baseline() {
        let mut geo = engine();
        geo.drag_update(Translation::new(5.0, 5.0));
        geo.drag_update(Translation::new(10.0, 10.0));
        let live = geo.drag_update(Translation::new(-10.0, -20.0));
        // Cumulative translation is applied to the original baseline, not
        // accumulated across ticks.
        assert_eq!(live, Position::new(200.0, 350.0));
    }

    #[test]
    fn end_after_active_in_same_tick_commits_once() {
        let mut geo = engine();
        geo.drag_update(Translation::new(10.0, 10.0));
        geo.drag_end(Translation::new(10.0, 10.0));
        assert_eq!(geo.baseline(), Position::new(220.0, 380.0));

        // A duplicate end event must not integrate the translation again.
        geo.drag_end(Translation::new(10.0, 10.0));
        assert_eq!(geo.baseline(), Position::new(220.0, 380.0));
    }

    #[test]
    fn next_gesture_starts_from_committed_baseline() {
        let mut geo = engine();
        geo.drag_update(Translation::new(10.0, 0.0));
        geo.drag_end(Translation::new(10.0, 0.0));

        let live = geo.drag_update(Translation::new(5.0, 0.0));
        assert_eq!(live, Position::new(225.0, 370.0));
        geo.drag_end(Translation::new(5.0, 0.0));
        assert_eq!(geo.baseline(), Position::new(225.0, 370.0));
    }

    #[test]
    fn resize_pulls_marker_back_inside() {
        // Baseline x=230 with size 90; growing to 180 shrinks the travel
        // range to 320-180=140, so x must move to 140.
        let mut geo = engine();
        geo.drag_end(Translation::new(50.0, 200.0));
        assert_eq!(geo.baseline(), Position::new(230.0, 410.0));

        let (pos, size) = geo.resize(180.0);
        assert_eq!(size, 180.0);
        assert_eq!(pos, Position::new(140.0, 320.0));
        assert_eq!(geo.baseline(), pos);
    }

    #[test]
    fn resize_clamps_requested_size() {
        let mut geo = engine();
        let (_, size) = geo.resize(9999.0);
        assert_eq!(size, MAX_MARKER_SIZE);
        let (_, size) = geo.resize(1.0);
        assert_eq!(size, MIN_MARKER_SIZE);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut geo = engine();
        geo.drag_end(Translation::new(-100.0, -100.0));
        geo.resize(150.0);
        geo.set_color("#ff0000");

        let (pos, size) = geo.reset();
        assert_eq!(pos, Position::new(210.0, 370.0));
        assert_eq!(size, DEFAULT_MARKER_SIZE);
        assert_eq!(geo.color(), DEFAULT_MARKER_COLOR);
        assert_eq!(geo.phase(), DragPhase::Idle);
    }

    fn in_bounds(pos: Position, canvas: Canvas, size: f32) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x <= canvas.width - size
            && pos.y <= canvas.height - size
    }

    proptest! {
        #[test]
        fn any_drag_stays_inside_the_canvas(
            width in 200.0f32..2000.0,
            height in 200.0f32..2000.0,
            size in MIN_MARKER_SIZE..MAX_MARKER_SIZE,
            dx in -5000.0f32..5000.0,
            dy in -5000.0f32..5000.0,
        ) {
            let canvas = Canvas::new(width, height);
            let mut geo = OverlayGeometry::new(canvas);
            geo.resize(size);

            let live = geo.drag_update(Translation::new(dx, dy));
            prop_assert!(in_bounds(live, canvas, geo.size()));

            let committed = geo.drag_end(Translation::new(dx, dy));
            prop_assert!(in_bounds(committed, canvas, geo.size()));
        }

        #[test]
        fn any_resize_sequence_stays_inside_the_canvas(
            width in 200.0f32..2000.0,
            height in 200.0f32..2000.0,
            sizes in proptest::collection::vec(0.0f32..400.0, 1..8),
            dx in -5000.0f32..5000.0,
            dy in -5000.0f32..5000.0,
        ) {
            let canvas = Canvas::new(width, height);
            let mut geo = OverlayGeometry::new(canvas);
            geo.drag_end(Translation::new(dx, dy));

            for requested in sizes {
                let (pos, size) = geo.resize(requested);
                prop_assert!((MIN_MARKER_SIZE..=MAX_MARKER_SIZE).contains(&size));
                prop_assert!(in_bounds(pos, canvas, size));
            }
        }
    }
}
