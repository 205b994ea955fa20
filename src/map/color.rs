use std::collections::HashMap;
use std::fmt;

use geojson::Feature;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self(r, g, b))
    }

    /// Mix towards black by `amount` in `0.0..=1.0`.
    pub fn darken(self, amount: f64) -> Self {
        let f = (1.0 - amount).clamp(0.0, 1.0);
        Self(
            (self.0 as f64 * f) as u8,
            (self.1 as f64 * f) as u8,
            (self.2 as f64 * f) as u8,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.0, c.1, c.2)
    }
}

/// ColorBrewer YlOrBr, one entry per class count from 3 to 9.
const YL_OR_BR: [&str; 7] = [
    "fff7bcfec44fd95f0e",
    "ffffd4fed98efe9929cc4c02",
    "ffffd4fed98efe9929d95f0e993404",
    "ffffd4fee391fec44ffe9929d95f0e993404",
    "ffffd4fee391fec44ffe9929ec7014cc4c028c2d04",
    "ffffe5fff7bcfee391fec44ffe9929ec7014cc4c028c2d04",
    "ffffe5fff7bcfee391fec44ffe9929ec7014cc4c02993404662506",
];

pub const MIN_CLASSES: usize = 3;
pub const MAX_CLASSES: usize = 9;

/// Fill for features whose category is missing or outside the domain.
pub const UNKNOWN: Rgb = Rgb(0x8c, 0x8c, 0x8c);

/// The YlOrBr palette for `classes` categories.
///
/// Fewer than three classes take the first colours of the three-class
/// scheme. More than nine classes get the nine-class scheme; the scale then
/// reuses colours.
pub fn yl_or_br(classes: usize) -> Vec<Rgb> {
    let scheme = YL_OR_BR[classes.clamp(MIN_CLASSES, MAX_CLASSES) - MIN_CLASSES];
    let colors: Vec<Rgb> = scheme
        .as_bytes()
        .chunks(6)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok().and_then(Rgb::from_hex))
        .collect();

    if classes < MIN_CLASSES {
        colors.into_iter().take(classes).collect()
    } else {
        colors
    }
}

/// Category value of a feature, read from its property bag.
pub fn category<'a>(feature: &'a Feature, column: &str) -> Option<&'a str> {
    feature.properties.as_ref()?.get(column)?.as_str()
}

/// Every feature's category, sorted then reversed.
///
/// Repeats are kept; the scale collapses them. Features without the
/// category contribute nothing.
pub fn build_domain(features: &[Feature], column: &str) -> Vec<String> {
    let mut domain: Vec<String> = features
        .iter()
        .filter_map(|f| category(f, column))
        .map(str::to_string)
        .collect();
    domain.sort();
    domain.reverse();
    domain
}

/// Ordinal scale from category to colour.
#[derive(Debug, Clone)]
pub struct ColorScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    range: Vec<Rgb>,
    unknown: Rgb,
}

impl ColorScale {
    /// Build a scale over `domain` (first occurrence wins) cycling through
    /// `range`.
    pub fn ordinal<I>(domain: I, range: Vec<Rgb>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut distinct = Vec::new();
        let mut index = HashMap::new();
        for value in domain {
            if !index.contains_key(&value) {
                index.insert(value.clone(), distinct.len());
                distinct.push(value);
            }
        }

        Self {
            domain: distinct,
            index,
            range,
            unknown: UNKNOWN,
        }
    }

    /// Distinct domain values in assignment order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> &[Rgb] {
        &self.range
    }

    pub fn color(&self, value: Option<&str>) -> Rgb {
        value
            .and_then(|v| self.index.get(v))
            .and_then(|&i| {
                if self.range.is_empty() {
                    None
                } else {
                    Some(self.range[i % self.range.len()])
                }
            })
            .unwrap_or(self.unknown)
    }
}

/// Scale with the YlOrBr palette sized to the distinct values of `domain`.
pub fn assign_colors(domain: Vec<String>) -> ColorScale {
    let mut scale = ColorScale::ordinal(domain, Vec::new());
    let classes = scale.domain.len();
    if classes > MAX_CLASSES {
        tracing::warn!(
            classes,
            palette = MAX_CLASSES,
            "more categories than palette colours, colours will repeat"
        );
    }
    scale.range = yl_or_br(classes);
    scale
}
