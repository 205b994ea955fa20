use crate::interaction::ViewTransform;
use crate::map::color::Rgb;
use crate::map::geometry::{draw_polyline, fill_row};
use crate::map::path::Point;
use crate::raster::ColorCanvas;
use crate::scene::Scene;
use rayon::prelude::*;

/// Sphere background
pub const OCEAN: Rgb = Rgb(0x1b, 0x2b, 0x3c);

/// How much country outlines are darkened relative to their fill
const BORDER_DARKEN: f64 = 0.4;

/// Display settings for the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_borders: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_borders: true }
    }
}

/// A shape moved into pixel space, ready for the scanline pass
struct Layer {
    rings: Vec<Vec<Point>>,
    lines: Vec<Vec<Point>>,
    min_y: f64,
    max_y: f64,
    color: Rgb,
}

impl Layer {
    fn new(rings: &[Vec<Point>], lines: &[Vec<Point>], color: Rgb, place: impl Fn(Point) -> Point) -> Self {
        let map = |ring: &Vec<Point>| ring.iter().map(|&p| place(p)).collect::<Vec<_>>();
        let rings: Vec<Vec<Point>> = rings.iter().map(map).collect();
        let lines: Vec<Vec<Point>> = lines.iter().map(map).collect();

        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in rings.iter().chain(lines.iter()).flatten() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        Self {
            rings,
            lines,
            min_y,
            max_y,
            color,
        }
    }

    fn spans_row(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }
}

/// Rasterize the scene at the given view transform onto a fresh canvas of
/// `width` x `height` cells.
///
/// Draw order: sphere, then every shape in scene order, then outlines.
pub fn rasterize(
    scene: &Scene,
    transform: &ViewTransform,
    width: usize,
    height: usize,
    options: RenderOptions,
) -> ColorCanvas {
    let mut canvas = ColorCanvas::new(width, height);
    let (ox, oy) = scene.offset();
    let place = |p: Point| transform.apply((p.0 + ox, p.1 + oy));

    let mut layers = Vec::with_capacity(scene.shapes().len() + 1);
    if let Some(sphere) = scene.sphere() {
        layers.push(Layer::new(&sphere.rings, &[], OCEAN, &place));
    }
    layers.extend(
        scene
            .shapes()
            .iter()
            .map(|shape| Layer::new(&shape.projected.rings, &shape.projected.lines, shape.fill, &place)),
    );

    canvas.par_rows_mut().for_each(|(y, row)| {
        let centre = y as f64 + 0.5;
        for layer in layers.iter().filter(|l| l.spans_row(centre)) {
            fill_row(row, y, &layer.rings, layer.color);
        }
    });

    // Skip the sphere: its outline would frame the globe in the ocean colour.
    for layer in layers.iter().skip(usize::from(scene.sphere().is_some())) {
        for line in &layer.lines {
            draw_polyline(&mut canvas, line, layer.color);
        }
        if options.show_borders {
            let border = layer.color.darken(BORDER_DARKEN);
            for ring in &layer.rings {
                draw_polyline(&mut canvas, ring, border);
            }
        }
    }

    canvas
}
