use std::fmt;

/// Pan/zoom state of the map group: `screen = map * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn apply(&self, p: (f64, f64)) -> (f64, f64) {
        (p.0 * self.k + self.x, p.1 * self.k + self.y)
    }

    pub fn invert(&self, p: (f64, f64)) -> (f64, f64) {
        ((p.0 - self.x) / self.k, (p.1 - self.y) / self.k)
    }

    /// Shift by a screen-space delta.
    pub fn translate_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.k)
    }

    /// Scale by `factor` keeping the screen point `at` fixed.
    pub fn scale_about(&self, factor: f64, at: (f64, f64)) -> Self {
        Self::new(
            at.0 - (at.0 - self.x) * factor,
            at.1 - (at.1 - self.y) * factor,
            self.k * factor,
        )
    }
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Gesture recognizer for wheel zoom, drag pan and keyboard navigation.
///
/// Every method that changes the view returns the new transform; callers
/// forward it to the gesture subscribers. Zoom and pan are unbounded.
#[derive(Debug, Clone)]
pub struct ZoomBehavior {
    transform: ViewTransform,
    /// Last pointer position while a drag is in progress
    anchor: Option<(f64, f64)>,
}

impl Default for ZoomBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomBehavior {
    /// Zoom factor per wheel notch or key press
    pub const STEP: f64 = 1.25;

    pub fn new() -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            anchor: None,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// Wheel notch at a screen position
    pub fn wheel(&mut self, at: (f64, f64), zoom_in: bool) -> ViewTransform {
        let factor = if zoom_in { Self::STEP } else { 1.0 / Self::STEP };
        self.zoom_by(factor, at)
    }

    pub fn zoom_by(&mut self, factor: f64, at: (f64, f64)) -> ViewTransform {
        self.transform = self.transform.scale_about(factor, at);
        self.transform
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> ViewTransform {
        self.transform = self.transform.translate_by(dx, dy);
        self.transform
    }

    pub fn press(&mut self, at: (f64, f64)) {
        self.anchor = Some(at);
    }

    /// Pointer moved with the button held. `None` when no drag started.
    pub fn drag(&mut self, at: (f64, f64)) -> Option<ViewTransform> {
        let (last_x, last_y) = self.anchor?;
        self.anchor = Some(at);
        Some(self.pan_by(at.0 - last_x, at.1 - last_y))
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }

    pub fn reset(&mut self) -> ViewTransform {
        self.anchor = None;
        self.transform = ViewTransform::IDENTITY;
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_apply_and_invert() {
        let t = ViewTransform::new(10.0, -4.0, 2.0);
        assert_eq!(t.apply((1.0, 2.0)), (12.0, 0.0));
        assert!(close(t.invert(t.apply((3.5, -7.0))), (3.5, -7.0)));
    }

    #[test]
    fn test_zoom_keeps_pointer_fixed() {
        let mut zoom = ZoomBehavior::new();
        zoom.pan_by(5.0, 3.0);
        let before = zoom.transform().invert((40.0, 20.0));
        let after = zoom.wheel((40.0, 20.0), true);
        assert!(close(after.apply(before), (40.0, 20.0)));
        assert!((after.k - ZoomBehavior::STEP).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_is_unbounded() {
        let mut zoom = ZoomBehavior::new();
        for _ in 0..100 {
            zoom.wheel((0.0, 0.0), true);
        }
        assert!(zoom.transform().k > 1e9);
    }

    #[test]
    fn test_drag_pans_by_pointer_delta() {
        let mut zoom = ZoomBehavior::new();
        assert!(zoom.drag((3.0, 3.0)).is_none());

        zoom.press((10.0, 10.0));
        assert!(zoom.is_dragging());
        assert_eq!(zoom.drag((13.0, 8.0)), Some(ViewTransform::new(3.0, -2.0, 1.0)));
        assert_eq!(zoom.drag((14.0, 8.0)), Some(ViewTransform::new(4.0, -2.0, 1.0)));

        zoom.release();
        assert!(zoom.drag((20.0, 20.0)).is_none());
    }

    #[test]
    fn test_reset() {
        let mut zoom = ZoomBehavior::new();
        zoom.zoom_by(3.0, (7.0, 7.0));
        assert_eq!(zoom.reset(), ViewTransform::IDENTITY);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ViewTransform::new(1.5, -2.0, 3.0).to_string(),
            "translate(1.5,-2) scale(3)"
        );
    }
}
