use std::fmt::Write;

use geojson::{Geometry, Value};

use crate::map::projection::Stereographic;

/// Screen-space point.
pub type Point = (f64, f64);

/// Number of segments used to draw the sphere outline.
const SPHERE_SEGMENTS: usize = 180;

/// Axis-aligned bounds in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn around(p: Point) -> Self {
        Self {
            min_x: p.0,
            min_y: p.1,
            max_x: p.0,
            max_y: p.1,
        }
    }

    fn extend(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.0);
        self.min_y = self.min_y.min(p.1);
        self.max_x = self.max_x.max(p.0);
        self.max_y = self.max_y.max(p.1);
    }

    pub fn contains(&self, p: Point) -> bool {
        p.0 >= self.min_x && p.0 <= self.max_x && p.1 >= self.min_y && p.1 <= self.max_y
    }
}

/// A geometry after projection: closed rings (fillable) and open lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projected {
    pub rings: Vec<Vec<Point>>,
    pub lines: Vec<Vec<Point>>,
    pub bounds: Option<Bounds>,
}

impl Projected {
    fn push_ring(&mut self, ring: Vec<Point>) {
        if ring.is_empty() {
            return;
        }
        self.include(&ring);
        self.rings.push(ring);
    }

    fn push_line(&mut self, line: Vec<Point>) {
        if line.is_empty() {
            return;
        }
        self.include(&line);
        self.lines.push(line);
    }

    fn include(&mut self, points: &[Point]) {
        for &p in points {
            match self.bounds.as_mut() {
                Some(b) => b.extend(p),
                None => self.bounds = Some(Bounds::around(p)),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() && self.lines.is_empty()
    }

    /// SVG path data: `M` / `L` commands, rings closed with `Z`.
    pub fn to_path(&self) -> String {
        let mut d = String::new();
        for ring in &self.rings {
            write_polyline(&mut d, ring);
            d.push('Z');
        }
        for line in &self.lines {
            write_polyline(&mut d, line);
        }
        d
    }
}

fn write_polyline(d: &mut String, points: &[Point]) {
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{x:.2},{y:.2}");
    }
}

/// Positions with fewer than two values are skipped.
fn lon_lat(coords: &[Vec<f64>]) -> Vec<(f64, f64)> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

/// Turns geometries into screen-space shapes and SVG path data.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    projection: Stereographic,
}

impl PathBuilder {
    pub fn new(projection: Stereographic) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &Stereographic {
        &self.projection
    }

    /// Project a geometry, cut to the visible side of the globe. Points
    /// carry no area and are dropped.
    pub fn project(&self, geometry: &Geometry) -> Projected {
        let mut out = Projected::default();
        self.project_value(&geometry.value, &mut out);
        out
    }

    fn project_value(&self, value: &Value, out: &mut Projected) {
        match value {
            Value::Point(_) | Value::MultiPoint(_) => {}
            Value::LineString(coords) => self.push_line(coords, out),
            Value::MultiLineString(lines) => {
                for coords in lines {
                    self.push_line(coords, out);
                }
            }
            Value::Polygon(rings) => {
                for coords in rings {
                    out.push_ring(self.projection.project_ring(&lon_lat(coords)));
                }
            }
            Value::MultiPolygon(polygons) => {
                for coords in polygons.iter().flatten() {
                    out.push_ring(self.projection.project_ring(&lon_lat(coords)));
                }
            }
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.project_value(&g.value, out);
                }
            }
        }
    }

    fn push_line(&self, coords: &[Vec<f64>], out: &mut Projected) {
        for piece in self.projection.project_line(&lon_lat(coords)) {
            out.push_line(piece);
        }
    }

    /// SVG path data for a geometry.
    pub fn path_for(&self, geometry: &Geometry) -> String {
        self.project(geometry).to_path()
    }

    /// The outline of the whole globe: the clip circle.
    pub fn sphere(&self) -> Projected {
        let (cx, cy) = self.projection.translate;
        let r = self.projection.clip_radius();
        let ring = (0..=SPHERE_SEGMENTS)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / SPHERE_SEGMENTS as f64;
                (cx + r * a.cos(), cy - r * a.sin())
            })
            .collect();

        let mut out = Projected::default();
        out.push_ring(ring);
        out
    }
}
