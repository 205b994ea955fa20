use crate::map::color::Rgb;
use crate::map::path::Point;
use crate::raster::ColorCanvas;

/// Clip the segment `a`-`b` to the rectangle `[0, w] x [0, h]`
/// (Liang-Barsky). `None` when nothing of it is left.
fn clip_segment(a: Point, b: Point, w: f64, h: f64) -> Option<(Point, Point)> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [(-dx, a.0), (dx, w - a.0), (-dy, a.1), (dy, h - a.1)] {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Stroke one segment given in pixel coordinates.
///
/// The segment is clipped to the canvas first, so the walk never takes more
/// steps than the canvas is wide or tall, however far away its ends are.
pub fn draw_segment(canvas: &mut ColorCanvas, a: Point, b: Point, color: Rgb) {
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    let Some((a, b)) = clip_segment(a, b, w, h) else {
        return;
    };

    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        // negative rounding noise saturates to pixel 0
        let (x, y) = ((a.0 + t * dx).floor(), (a.1 + t * dy).floor());
        canvas.set_pixel(x as usize, y as usize, color);
    }
}

/// Stroke a polyline in pixel coordinates.
pub fn draw_polyline(canvas: &mut ColorCanvas, points: &[Point], color: Rgb) {
    for seg in points.windows(2) {
        draw_segment(canvas, seg[0], seg[1], color);
    }
}

/// X positions where the horizontal line `y` crosses the rings, sorted.
///
/// Edges are half-open in y so a vertex shared by two edges counts once.
pub fn scanline_crossings(rings: &[Vec<Point>], y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for ring in rings {
        let n = ring.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            if (y0 <= y) != (y1 <= y) {
                xs.push(x0 + (y - y0) / (y1 - y0) * (x1 - x0));
            }
        }
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    xs
}

/// Fill one pixel row of a set of rings with the even-odd rule.
///
/// Pixel `x` is filled when its centre lies inside.
pub fn fill_row(row: &mut [Option<Rgb>], y: usize, rings: &[Vec<Point>], color: Rgb) {
    let width = row.len() as f64;
    let xs = scanline_crossings(rings, y as f64 + 0.5);
    for span in xs.chunks_exact(2) {
        let start = (span[0] - 0.5).ceil().max(0.0);
        let end = (span[1] - 0.5).floor().min(width - 1.0);
        if end < start {
            continue;
        }
        for px in &mut row[start as usize..=end as usize] {
            *px = Some(color);
        }
    }
}

/// Even-odd point-in-polygon test over every ring.
pub fn rings_contain(rings: &[Vec<Point>], p: Point) -> bool {
    scanline_crossings(rings, p.1)
        .iter()
        .filter(|&&x| x < p.0)
        .count()
        % 2
        == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgb = Rgb(1, 2, 3);

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = ColorCanvas::new(5, 1);
        draw_segment(&mut canvas, (0.5, 0.5), (4.5, 0.5), INK);
        for x in 0..5 {
            assert_eq!(canvas.get(x, 0), Some(INK));
        }
        assert_eq!(canvas.get(0, 1), None);
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = ColorCanvas::new(1, 2);
        draw_segment(&mut canvas, (0.5, 0.5), (0.5, 3.5), INK);
        for y in 0..4 {
            assert_eq!(canvas.get(0, y), Some(INK));
        }
    }

    #[test]
    fn test_diagonal_line_is_connected() {
        let mut canvas = ColorCanvas::new(4, 2);
        draw_segment(&mut canvas, (0.5, 0.5), (3.5, 3.5), INK);
        for i in 0..4 {
            assert_eq!(canvas.get(i, i), Some(INK));
        }
        assert_eq!(canvas.get(3, 0), None);
    }

    #[test]
    fn test_far_away_ends_are_clipped() {
        let mut canvas = ColorCanvas::new(10, 2);
        draw_segment(&mut canvas, (-1e15, 1.5), (1e15, 1.5), INK);
        for x in 0..10 {
            assert_eq!(canvas.get(x, 1), Some(INK));
        }
        assert_eq!(canvas.get(0, 0), None);
        assert_eq!(canvas.get(0, 2), None);
    }

    #[test]
    fn test_segment_missing_the_canvas_draws_nothing() {
        let mut canvas = ColorCanvas::new(4, 2);
        // crosses the corner's extension without entering
        draw_segment(&mut canvas, (-5.0, 3.0), (3.0, -5.0), INK);
        draw_segment(&mut canvas, (f64::NAN, 0.0), (1.0, 1.0), INK);
        assert_eq!(canvas.to_string(), "    \n    ");
    }

    #[test]
    fn test_clip_keeps_inner_part() {
        let (a, b) = clip_segment((-10.0, 5.0), (30.0, 5.0), 20.0, 10.0).unwrap();
        assert_eq!(a, (0.0, 5.0));
        assert_eq!(b, (20.0, 5.0));
        assert!(clip_segment((-10.0, 20.0), (30.0, 20.0), 20.0, 10.0).is_none());
    }

    #[test]
    fn test_polyline_off_canvas_is_skipped() {
        let mut canvas = ColorCanvas::new(4, 2);
        draw_polyline(&mut canvas, &[(-10.0, -10.0), (-5.0, -1.0)], INK);
        assert_eq!(canvas.to_string(), "    \n    ");
    }

    #[test]
    fn test_fill_row_interior_only() {
        let mut row = vec![None; 10];
        fill_row(&mut row, 3, &[square(2.0, 2.0, 4.0)], INK);
        let filled: Vec<usize> = (0..10).filter(|&x| row[x].is_some()).collect();
        assert_eq!(filled, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_fill_row_respects_holes() {
        let mut row = vec![None; 12];
        let rings = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
        fill_row(&mut row, 5, &rings, INK);
        let filled: Vec<usize> = (0..12).filter(|&x| row[x].is_some()).collect();
        assert_eq!(filled, vec![0, 1, 2, 7, 8, 9]);
    }

    #[test]
    fn test_fill_row_clips_to_width() {
        let mut row = vec![None; 4];
        fill_row(&mut row, 1, &[square(-5.0, 0.0, 20.0)], INK);
        assert!(row.iter().all(Option::is_some));
    }

    #[test]
    fn test_rings_contain() {
        let rings = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
        assert!(rings_contain(&rings, (1.0, 1.0)));
        assert!(!rings_contain(&rings, (5.0, 5.0)));
        assert!(!rings_contain(&rings, (11.0, 5.0)));
    }
}
