//! Hover tooltips and pan/zoom.
//!
//! Handlers are registered per shape through [`Subscriptions`] and run
//! synchronously when the event loop dispatches an event. They receive the
//! [`Overlay`] as explicit context instead of reaching for shared state.

mod tooltip;
mod zoom;

use std::collections::HashMap;

pub use tooltip::{tooltip_text, Tooltip, Visibility};
pub use zoom::{ViewTransform, ZoomBehavior};

use crate::scene::ShapeId;

/// Pointer position in screen cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pointer {
    pub x: i32,
    pub y: i32,
}

/// Interactive state drawn on top of the scene.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub tooltip: Tooltip,
    /// Transform applied to the map group
    pub group_transform: ViewTransform,
}

type EnterHandler = Box<dyn FnMut(&mut Overlay, Pointer)>;
type LeaveHandler = Box<dyn FnMut(&mut Overlay)>;
type GestureHandler = Box<dyn FnMut(&mut Overlay, ViewTransform)>;

/// Event handlers keyed by the shape they were attached to.
#[derive(Default)]
pub struct Subscriptions {
    enter: HashMap<ShapeId, Vec<EnterHandler>>,
    leave: HashMap<ShapeId, Vec<LeaveHandler>>,
    gesture: Vec<GestureHandler>,
}

impl Subscriptions {
    pub fn on_hover_enter<F>(&mut self, shape: ShapeId, handler: F)
    where
        F: FnMut(&mut Overlay, Pointer) + 'static,
    {
        self.enter.entry(shape).or_default().push(Box::new(handler));
    }

    pub fn on_hover_leave<F>(&mut self, shape: ShapeId, handler: F)
    where
        F: FnMut(&mut Overlay) + 'static,
    {
        self.leave.entry(shape).or_default().push(Box::new(handler));
    }

    pub fn on_gesture<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Overlay, ViewTransform) + 'static,
    {
        self.gesture.push(Box::new(handler));
    }

    pub fn hover_enter(&mut self, shape: ShapeId, overlay: &mut Overlay, pointer: Pointer) {
        if let Some(handlers) = self.enter.get_mut(&shape) {
            for handler in handlers {
                handler(&mut *overlay, pointer);
            }
        }
    }

    pub fn hover_leave(&mut self, shape: ShapeId, overlay: &mut Overlay) {
        if let Some(handlers) = self.leave.get_mut(&shape) {
            for handler in handlers {
                handler(&mut *overlay);
            }
        }
    }

    pub fn gesture(&mut self, overlay: &mut Overlay, transform: ViewTransform) {
        tracing::trace!(%transform, "gesture");
        for handler in &mut self.gesture {
            handler(&mut *overlay, transform);
        }
    }

    /// Number of shapes with a hover-enter handler.
    pub fn hover_targets(&self) -> usize {
        self.enter.len()
    }
}

/// Turns a stream of hit-test results into enter/leave events.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    current: Option<ShapeId>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<ShapeId> {
        self.current
    }

    /// Fire `leave` for the previous shape and `enter` for the new one when
    /// the shape under the pointer changes. Moving within a shape fires
    /// nothing.
    pub fn update(
        &mut self,
        hit: Option<ShapeId>,
        pointer: Pointer,
        subscriptions: &mut Subscriptions,
        overlay: &mut Overlay,
    ) {
        if hit == self.current {
            return;
        }
        if let Some(previous) = self.current.take() {
            subscriptions.hover_leave(previous, overlay);
        }
        if let Some(next) = hit {
            subscriptions.hover_enter(next, overlay, pointer);
        }
        self.current = hit;
    }
}
