//! Drawable shapes produced from the joined features.

use geojson::Feature;
use rayon::prelude::*;

use crate::config::Columns;
use crate::data::feature_key;
use crate::interaction::{Subscriptions, ViewTransform};
use crate::map::color::{category, ColorScale, Rgb};
use crate::map::geometry::rings_contain;
use crate::map::path::{PathBuilder, Point, Projected};

/// Index of a shape in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

/// One country on the map.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub feature_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    /// SVG path data
    pub path: String,
    pub fill: Rgb,
    pub projected: Projected,
}

impl Shape {
    /// Name shown in tooltips: the name column, else the feature id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.feature_id.as_deref())
            .unwrap_or("Unknown")
    }
}

fn string_property(feature: &Feature, column: &str) -> Option<String> {
    feature
        .properties
        .as_ref()?
        .get(column)?
        .as_str()
        .map(str::to_string)
}

/// Background sphere plus country shapes, all drawn inside a group
/// translated by a fixed offset.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    offset: (f64, f64),
    sphere: Option<Projected>,
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(offset: (f64, f64)) -> Self {
        Self {
            offset,
            sphere: None,
            shapes: Vec::new(),
        }
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn sphere(&self) -> Option<&Projected> {
        self.sphere.as_ref()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn add_sphere(&mut self, builder: &PathBuilder) {
        self.sphere = Some(builder.sphere());
    }

    /// Append one shape per feature and wire its hover handlers.
    ///
    /// Calling this twice appends the features twice.
    pub fn add_countries(
        &mut self,
        features: &[Feature],
        builder: &PathBuilder,
        scale: &ColorScale,
        columns: &Columns,
        subscriptions: &mut Subscriptions,
    ) {
        let projected: Vec<Projected> = features
            .par_iter()
            .map(|feature| {
                feature
                    .geometry
                    .as_ref()
                    .map(|g| builder.project(g))
                    .unwrap_or_default()
            })
            .collect();

        let first = self.shapes.len();
        for (i, (feature, projected)) in features.iter().zip(projected).enumerate() {
            let id = ShapeId(first + i);
            let group = category(feature, &columns.category).map(str::to_string);
            let shape = Shape {
                id,
                feature_id: feature_key(feature),
                name: string_property(feature, &columns.name),
                fill: scale.color(group.as_deref()),
                path: projected.to_path(),
                category: group,
                projected,
            };

            let name = shape.display_name().to_string();
            let label = shape.category.clone();
            subscriptions.on_hover_enter(id, move |overlay, pointer| {
                overlay.tooltip.show(&name, label.as_deref(), pointer);
            });
            subscriptions.on_hover_leave(id, |overlay| overlay.tooltip.hide());

            self.shapes.push(shape);
        }

        tracing::debug!(shapes = self.shapes.len(), "scene built");
    }

    /// Topmost shape under a screen point.
    pub fn hit_test(&self, screen: Point, transform: &ViewTransform) -> Option<ShapeId> {
        let (x, y) = transform.invert(screen);
        let local = (x - self.offset.0, y - self.offset.1);

        self.shapes
            .iter()
            .rev()
            .find(|shape| {
                shape.projected.bounds.is_some_and(|b| b.contains(local))
                    && rings_contain(&shape.projected.rings, local)
            })
            .map(|shape| shape.id)
    }
}
