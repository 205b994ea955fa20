use crate::map::color::{ColorScale, Rgb};

/// Placement of the legend: a vertical stack of swatches with labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendLayout {
    /// Position of the first swatch
    pub origin: (f64, f64),
    pub radius: f64,
    /// Vertical distance between entries
    pub spacing: f64,
    /// Horizontal distance from swatch centre to label
    pub text_offset: f64,
}

impl LegendLayout {
    /// Layout used for SVG output.
    pub const SVG: LegendLayout = LegendLayout {
        origin: (160.0, 500.0),
        radius: 15.0,
        spacing: 45.0,
        text_offset: 25.0,
    };

    /// Layout in terminal cells; the origin is resolved against the map area.
    pub const TERMINAL: LegendLayout = LegendLayout {
        origin: (0.0, 0.0),
        radius: 1.0,
        spacing: 2.0,
        text_offset: 3.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub category: String,
    pub label: String,
    pub color: Rgb,
    /// Swatch centre
    pub position: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub layout: LegendLayout,
    entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn empty(layout: LegendLayout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
        }
    }

    /// One entry per domain value, listed in reverse domain order.
    pub fn new(scale: &ColorScale, layout: LegendLayout) -> Self {
        let entries = scale
            .domain()
            .iter()
            .rev()
            .enumerate()
            .map(|(i, category)| LegendEntry {
                category: category.clone(),
                label: category_label(category).to_string(),
                color: scale.color(Some(category)),
                position: (layout.origin.0, layout.origin.1 + i as f64 * layout.spacing),
            })
            .collect();

        Self { layout, entries }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display part of a category such as `"5. High income"`: the text after
/// the first `.`, trimmed. Values without a separator are shown whole.
pub fn category_label(category: &str) -> &str {
    match category.split_once('.') {
        Some((_, rest)) => rest.trim(),
        None => category.trim(),
    }
}
