use glam::{DMat3, DVec3};

/// Largest angle between two interpolated points of a clip-circle arc.
const ARC_STEP: f64 = 2.0 * std::f64::consts::PI / 180.0;

/// Bisection steps when locating where an edge leaves the visible cap.
const CROSSING_ITERATIONS: usize = 48;

/// Stereographic azimuthal projection.
///
/// The sphere is rotated so `(-rotate.0, -rotate.1)` faces the viewer, then
/// projected from the antipode onto the tangent plane. Screen `y` grows
/// downward.
///
/// Everything further than `clip_angle` from the centre is hidden. Single
/// points are pulled onto the clip circle; rings and lines are cut at the
/// circle (see [`Stereographic::project_ring`]).
#[derive(Debug, Clone)]
pub struct Stereographic {
    /// Pixels per unit of the raw projection
    pub scale: f64,
    /// Screen position of the projection centre
    pub translate: (f64, f64),
    rotate: (f64, f64),
    rotation: DMat3,
    clip_angle: f64,
    cos_clip: f64,
    sin_clip: f64,
}

impl Default for Stereographic {
    fn default() -> Self {
        Self::new(250.0, (480.0, 250.0))
    }
}

impl Stereographic {
    pub const DEFAULT_CLIP_ANGLE: f64 = 142.0;

    pub fn new(scale: f64, translate: (f64, f64)) -> Self {
        let mut projection = Self {
            scale,
            translate,
            rotate: (0.0, 0.0),
            rotation: DMat3::IDENTITY,
            clip_angle: 0.0,
            cos_clip: 0.0,
            sin_clip: 0.0,
        };
        projection.set_clip_angle(Self::DEFAULT_CLIP_ANGLE);
        projection
    }

    /// Rotate by `(lambda, phi)` degrees: yaw around the pole, then pitch.
    pub fn with_rotate(mut self, lambda: f64, phi: f64) -> Self {
        self.rotate = (lambda, phi);
        self.rotation =
            DMat3::from_rotation_y(-phi.to_radians()) * DMat3::from_rotation_z(lambda.to_radians());
        self
    }

    pub fn with_clip_angle(mut self, degrees: f64) -> Self {
        self.set_clip_angle(degrees);
        self
    }

    fn set_clip_angle(&mut self, degrees: f64) {
        let degrees = degrees.clamp(1.0, 179.0);
        self.clip_angle = degrees;
        self.cos_clip = degrees.to_radians().cos();
        self.sin_clip = degrees.to_radians().sin();
    }

    pub fn rotate(&self) -> (f64, f64) {
        self.rotate
    }

    pub fn clip_angle(&self) -> f64 {
        self.clip_angle
    }

    /// Screen radius of the clip circle.
    pub fn clip_radius(&self) -> f64 {
        self.scale * (self.clip_angle.to_radians() / 2.0).tan()
    }

    /// Whether a point lies inside the clip circle.
    pub fn is_visible(&self, lon: f64, lat: f64) -> bool {
        self.sees(self.rotated(lon, lat))
    }

    /// Project a geographic coordinate (lon, lat) to screen coordinates.
    /// A hidden point lands on the clip circle at its azimuth.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let p = self.rotated(lon, lat);
        if p.x < self.cos_clip {
            return self.rim(azimuth(p));
        }
        self.to_screen(p)
    }

    /// Project a closed ring, cut to the visible cap.
    ///
    /// A ring with no visible vertex yields nothing. Where a ring leaves the
    /// cap, the hidden run is replaced by an arc of the clip circle from the
    /// exit to the re-entry point, swept the way the hidden run turns.
    pub fn project_ring(&self, coords: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut points: Vec<DVec3> = coords.iter().map(|&(lon, lat)| self.rotated(lon, lat)).collect();
        if points.iter().all(|&p| self.sees(p)) {
            return points.iter().map(|&p| self.to_screen(p)).collect();
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        let Some(start) = points.iter().position(|&p| self.sees(p)) else {
            return Vec::new();
        };
        let n = points.len();
        let mut out = Vec::with_capacity(n + 2);
        // azimuth where the ring left the cap, and how far it has turned since
        let mut exit = 0.0;
        let mut swept = 0.0;
        let mut last = 0.0;

        for i in 0..n {
            let a = points[(start + i) % n];
            let b = points[(start + i + 1) % n];
            match (self.sees(a), self.sees(b)) {
                (true, true) => out.push(self.to_screen(a)),
                (true, false) => {
                    out.push(self.to_screen(a));
                    exit = azimuth(self.crossing(a, b));
                    out.push(self.rim(exit));
                    last = azimuth(b);
                    swept = turn(exit, last);
                }
                (false, false) => {
                    swept += turn(last, azimuth(b));
                    last = azimuth(b);
                }
                (false, true) => {
                    let entry = azimuth(self.crossing(b, a));
                    swept += turn(last, entry);
                    let steps = (swept.abs() / ARC_STEP).ceil() as usize;
                    for j in 1..steps {
                        out.push(self.rim(exit + swept * j as f64 / steps as f64));
                    }
                    out.push(self.rim(entry));
                }
            }
        }

        if let Some(&first) = out.first() {
            out.push(first);
        }
        out
    }

    /// Project an open line, split into its visible pieces.
    pub fn project_line(&self, coords: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
        let points: Vec<DVec3> = coords.iter().map(|&(lon, lat)| self.rotated(lon, lat)).collect();
        let mut pieces = Vec::new();
        let mut piece = Vec::new();

        if let Some(&first) = points.first().filter(|&&p| self.sees(p)) {
            piece.push(self.to_screen(first));
        }
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (self.sees(a), self.sees(b)) {
                (true, true) => piece.push(self.to_screen(b)),
                (true, false) => {
                    piece.push(self.to_screen(self.crossing(a, b)));
                    pieces.push(std::mem::take(&mut piece));
                }
                (false, true) => {
                    piece.push(self.to_screen(self.crossing(b, a)));
                    piece.push(self.to_screen(b));
                }
                (false, false) => {}
            }
        }
        pieces.push(piece);
        pieces.retain(|piece| piece.len() >= 2);
        pieces
    }

    fn sees(&self, p: DVec3) -> bool {
        p.x >= self.cos_clip
    }

    /// Where the great-circle edge from `inside` to `outside` meets the
    /// clip circle.
    fn crossing(&self, inside: DVec3, outside: DVec3) -> DVec3 {
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..CROSSING_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            if self.sees(inside.lerp(outside, mid).normalize_or_zero()) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let p = inside.lerp(outside, lo).normalize_or_zero();
        self.rim_vec(azimuth(p))
    }

    fn rim_vec(&self, azimuth: f64) -> DVec3 {
        DVec3::new(
            self.cos_clip,
            azimuth.cos() * self.sin_clip,
            azimuth.sin() * self.sin_clip,
        )
    }

    /// Screen point on the clip circle.
    fn rim(&self, azimuth: f64) -> (f64, f64) {
        self.to_screen(self.rim_vec(azimuth))
    }

    fn to_screen(&self, p: DVec3) -> (f64, f64) {
        let k = 1.0 + p.x;
        let (x, y) = (p.y / k, p.z / k);

        (
            self.translate.0 + x * self.scale,
            self.translate.1 - y * self.scale,
        )
    }

    fn rotated(&self, lon: f64, lat: f64) -> DVec3 {
        self.rotation * lonlat_to_vec3(lon, lat)
    }
}

/// Angle of a rotated point around the projection centre.
fn azimuth(p: DVec3) -> f64 {
    p.z.atan2(p.y)
}

/// Signed change of angle from `from` to `to`, in (-pi, pi].
fn turn(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(std::f64::consts::TAU);
    if d > std::f64::consts::PI {
        d - std::f64::consts::TAU
    } else {
        d
    }
}

/// Unit vector for (lon, lat); +x points at (0, 0), +z at the north pole.
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
    }

    #[test]
    fn test_project_center() {
        let p = Stereographic::default();
        assert!(close(p.project(0.0, 0.0), (480.0, 250.0)));
    }

    #[test]
    fn test_quarter_sphere_lands_at_scale() {
        let p = Stereographic::new(100.0, (0.0, 0.0));
        assert!(close(p.project(90.0, 0.0), (100.0, 0.0)));
        // north is up
        assert!(close(p.project(0.0, 90.0), (0.0, -100.0)));
    }

    #[test]
    fn test_rotation_recenters() {
        let p = Stereographic::new(100.0, (5.0, 7.0)).with_rotate(-10.0, -50.0);
        assert!(close(p.project(10.0, 50.0), (5.0, 7.0)));
    }

    #[test]
    fn test_points_beyond_clip_are_clamped() {
        let p = Stereographic::new(100.0, (0.0, 0.0));
        assert!(!p.is_visible(170.0, 0.0));
        let (x, y) = p.project(170.0, 0.0);
        let r = (x * x + y * y).sqrt();
        assert!((r - p.clip_radius()).abs() < 1e-6);
        assert!(x > 0.0);
    }

    fn radius(p: (f64, f64)) -> f64 {
        (p.0 * p.0 + p.1 * p.1).sqrt()
    }

    #[test]
    fn test_hidden_ring_vanishes() {
        let p = Stereographic::new(100.0, (0.0, 0.0)).with_clip_angle(90.0);
        let ring = [(150.0, -5.0), (160.0, -5.0), (160.0, 5.0), (150.0, -5.0)];
        assert!(p.project_ring(&ring).is_empty());
    }

    #[test]
    fn test_visible_ring_is_untouched() {
        let p = Stereographic::new(100.0, (0.0, 0.0)).with_clip_angle(90.0);
        let ring = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)];
        let projected = p.project_ring(&ring);
        assert_eq!(projected.len(), 4);
        assert!(close(projected[1], p.project(10.0, 0.0)));
    }

    #[test]
    fn test_ring_crossing_the_rim_follows_the_clip_circle() {
        let p = Stereographic::new(100.0, (0.0, 0.0)).with_clip_angle(90.0);
        let ring = [(60.0, -10.0), (120.0, -10.0), (120.0, 10.0), (60.0, 10.0), (60.0, -10.0)];
        let projected = p.project_ring(&ring);

        assert_eq!(projected.first(), projected.last());
        assert!(projected.iter().all(|&q| radius(q) <= 100.0 + 1e-6));
        let on_rim = projected
            .iter()
            .filter(|&&q| (radius(q) - 100.0).abs() < 1e-6)
            .count();
        assert!(on_rim >= 2);
        // the hidden corners sit on the far side: the cut stays east of the
        // visible corners and close to the equator
        for &(x, y) in projected.iter().filter(|&&q| (radius(q) - 100.0).abs() < 1e-6) {
            assert!(x > 90.0);
            assert!(y.abs() < 25.0);
        }
    }

    #[test]
    fn test_line_splits_at_the_rim() {
        let p = Stereographic::new(100.0, (0.0, 0.0)).with_clip_angle(90.0);
        let line = [(0.0, 0.0), (60.0, 0.0), (120.0, 0.0), (180.0, 0.0), (300.0, 0.0), (350.0, 0.0)];
        let pieces = p.project_line(&line);

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 3);
        assert!(close(pieces[0][2], (100.0, 0.0)));
        assert_eq!(pieces[1].len(), 3);
        assert!(close(pieces[1][0], (-100.0, 0.0)));
    }

    #[test]
    fn test_clip_radius() {
        let p = Stereographic::new(1.0, (0.0, 0.0)).with_clip_angle(90.0);
        assert!((p.clip_radius() - 1.0).abs() < 1e-9);
        assert_eq!(p.clip_angle(), 90.0);
    }
}
