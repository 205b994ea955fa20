use rayon::prelude::*;

use crate::map::color::Rgb;

/// Upper half block: foreground paints the top pixel, background the bottom.
const UPPER_HALF: char = '▀';
const LOWER_HALF: char = '▄';

/// One terminal cell of a rendered canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBlock {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Option<Rgb>,
}

/// Colour canvas for terminal graphics.
/// Each character cell holds two vertically stacked pixels drawn with
/// half-block glyphs, so pixels are roughly square.
pub struct ColorCanvas {
    width: usize,  // Pixels (= characters)
    height: usize, // Pixels (= characters * 2)
    pixels: Vec<Option<Rgb>>,
}

impl ColorCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width x height*2
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height: height * 2,
            pixels: vec![None; width * height * 2],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = Some(color);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            None
        }
    }

    /// Pixel rows, in parallel, with their y coordinate.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, &mut [Option<Rgb>])> {
        let width = self.width.max(1);
        self.pixels.par_chunks_mut(width).enumerate()
    }

    /// The glyph for a character cell, or `None` when both pixels are empty.
    pub fn cell(&self, col: usize, row: usize) -> Option<HalfBlock> {
        let top = self.get(col, row * 2);
        let bottom = self.get(col, row * 2 + 1);
        match (top, bottom) {
            (None, None) => None,
            (Some(fg), bg) => Some(HalfBlock {
                ch: UPPER_HALF,
                fg,
                bg,
            }),
            (None, Some(fg)) => Some(HalfBlock {
                ch: LOWER_HALF,
                fg,
                bg: None,
            }),
        }
    }

    /// Character rows rendered as plain glyphs (colour dropped)
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height / 2)
            .map(|row| {
                (0..self.width)
                    .map(|col| self.cell(col, row).map_or(' ', |c| c.ch))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb(255, 0, 0);
    const BLUE: Rgb = Rgb(0, 0, 255);

    #[test]
    fn test_single_pixel() {
        let mut canvas = ColorCanvas::new(1, 1);
        canvas.set_pixel(0, 0, RED);
        assert_eq!(canvas.to_string(), "▀");
        assert_eq!(
            canvas.cell(0, 0),
            Some(HalfBlock {
                ch: '▀',
                fg: RED,
                bg: None
            })
        );
    }

    #[test]
    fn test_bottom_pixel_only() {
        let mut canvas = ColorCanvas::new(1, 1);
        canvas.set_pixel(0, 1, BLUE);
        assert_eq!(canvas.cell(0, 0).unwrap().ch, '▄');
    }

    #[test]
    fn test_both_pixels() {
        let mut canvas = ColorCanvas::new(1, 1);
        canvas.set_pixel(0, 0, RED);
        canvas.set_pixel(0, 1, BLUE);
        assert_eq!(
            canvas.cell(0, 0),
            Some(HalfBlock {
                ch: '▀',
                fg: RED,
                bg: Some(BLUE)
            })
        );
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut canvas = ColorCanvas::new(2, 1);
        canvas.set_pixel(5, 0, RED);
        canvas.set_pixel(0, 7, RED);
        assert_eq!(canvas.to_string(), "  ");
    }

    #[test]
    fn test_parallel_rows_cover_canvas() {
        let mut canvas = ColorCanvas::new(3, 2);
        canvas.par_rows_mut().for_each(|(y, row)| {
            if y % 2 == 0 {
                row.fill(Some(RED));
            }
        });
        assert_eq!(canvas.get(2, 0), Some(RED));
        assert_eq!(canvas.get(2, 1), None);
        assert_eq!(canvas.get(0, 2), Some(RED));
    }
}
