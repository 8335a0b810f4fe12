//! # Drag Controller
//!
//! ```text
//!          pointer-down (primary button, unlocked element)
//!   Idle ───────────────────────────────────────────────▶ Dragging(id, offset)
//!    ▲                                                     │      ▲
//!    │                  pointer-up                         │      │ pointer-move
//!    └─────────────────────────────────────────────────────┘──────┘
//! ```
//!
//! While dragging, a pointer position is turned into a native position by
//! subtracting the container origin and the grab offset, clamping in display
//! space, then dividing by the display scale. The clamp margins are fixed and
//! do not depend on the dragged element's size, so large elements can leave
//! the canvas partly while small ones never reach the far edge.
//!
//! Pointer-move and pointer-up are only listened to while a drag is active.
//! [`PointerListeners`] hands out a [`PointerCapture`] when a drag starts; the
//! capture unregisters itself when dropped, whatever ends the drag.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{Position, TemplateElement, TemplateLayout};

/// Distance kept free at the right edge while dragging, in display pixels.
pub const DRAG_MARGIN_X: f64 = 50.0;
/// Distance kept free at the bottom edge while dragging, in display pixels.
pub const DRAG_MARGIN_Y: f64 = 20.0;

/// A point in screen (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mouse button that produced a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        element_id: String,
        /// Pointer position minus the element's on-screen origin at press time.
        offset: Point,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn element_id(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { element_id, .. } => Some(element_id),
        }
    }
}

/// On-screen origin of an element inside a container at `container_origin`.
pub fn element_screen_origin(
    layout: &TemplateLayout,
    element: &TemplateElement,
    container_origin: Point,
) -> Point {
    let scale = layout.display_scale();
    Point::new(
        container_origin.x + element.position.x * scale,
        container_origin.y + element.position.y * scale,
    )
}

/// Grab offset for a pointer-down on `element`.
pub fn grab_offset(
    layout: &TemplateLayout,
    element: &TemplateElement,
    pointer: Point,
    container_origin: Point,
) -> Point {
    let origin = element_screen_origin(layout, element, container_origin);
    Point::new(pointer.x - origin.x, pointer.y - origin.y)
}

/// Upper clamp bounds in display space: `(display width − 50, display height − 20)`.
pub fn drag_bounds(layout: &TemplateLayout) -> (f64, f64) {
    (
        layout.display_width() as f64 - DRAG_MARGIN_X,
        layout.display_height() as f64 - DRAG_MARGIN_Y,
    )
}

/// Native position for a pointer at `pointer` while dragging with `offset`.
pub fn drag_position(
    layout: &TemplateLayout,
    pointer: Point,
    container_origin: Point,
    offset: Point,
) -> Position {
    let (max_x, max_y) = drag_bounds(layout);
    let scale = layout.display_scale();

    let candidate_x = pointer.x - container_origin.x - offset.x;
    let candidate_y = pointer.y - container_origin.y - offset.y;

    // min before max: a canvas narrower than the margin pins to 0
    Position::new(
        candidate_x.min(max_x).max(0.0) / scale,
        candidate_y.min(max_y).max(0.0) / scale,
    )
}

// ============================================================================
// POINTER CAPTURE
// ============================================================================

/// Registry of active pointer-move/up subscriptions.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    active: Arc<AtomicUsize>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to pointer-move/up until the returned capture is dropped.
    pub fn capture(&self) -> PointerCapture {
        self.active.fetch_add(1, Ordering::SeqCst);
        PointerCapture {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// A live pointer-move/up subscription. Unsubscribes on drop.
#[derive(Debug)]
pub struct PointerCapture {
    active: Arc<AtomicUsize>,
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn square() -> TemplateLayout {
        Catalog::builtin().by_id("square").unwrap().clone()
    }

    #[test]
    fn grab_offset_is_relative_to_scaled_origin() {
        let layout = square();
        let price = layout.element("price").unwrap();
        // price (150, 130) → screen (225, 195) inside a container at (100, 50)
        let offset = grab_offset(&layout, price, Point::new(335.0, 255.0), Point::new(100.0, 50.0));
        assert_eq!(offset, Point::new(10.0, 10.0));
    }

    #[test]
    fn drag_converts_back_to_native_space() {
        let layout = square();
        let origin = Point::new(0.0, 0.0);
        let offset = Point::new(0.0, 0.0);
        // 50 right, 10 down from (225, 195)
        let pos = drag_position(&layout, Point::new(275.0, 205.0), origin, offset);
        assert!((pos.x - 183.333).abs() < 0.001);
        assert!((pos.y - 136.667).abs() < 0.001);
    }

    #[test]
    fn drag_clamps_in_display_space() {
        let layout = square();
        assert_eq!(drag_bounds(&layout), (550.0, 580.0));

        let far = drag_position(&layout, Point::new(5000.0, 5000.0), Point::default(), Point::default());
        assert!((far.x - 550.0 / 1.5).abs() < 1e-9);
        assert!((far.y - 580.0 / 1.5).abs() < 1e-9);

        let negative = drag_position(&layout, Point::new(-80.0, -3.0), Point::default(), Point::default());
        assert_eq!(negative, Position::new(0.0, 0.0));
    }

    #[test]
    fn capture_unregisters_on_drop() {
        let listeners = PointerListeners::new();
        assert_eq!(listeners.active(), 0);
        let capture = listeners.capture();
        assert_eq!(listeners.active(), 1);
        drop(capture);
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn drag_state_serializes_with_tag() {
        let state = DragState::Dragging {
            element_id: "price".into(),
            offset: Point::new(1.0, 2.0),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "dragging");
        assert_eq!(json["elementId"], "price");
        assert_eq!(state.element_id(), Some("price"));
        assert!(!DragState::Idle.is_dragging());
    }
}
