//! Headless SVG rendering of the scene.

use std::fmt::Write;

use crate::interaction::{tooltip_text, ViewTransform};
use crate::map::legend::Legend;
use crate::map::renderer::OCEAN;
use crate::scene::Scene;

/// Document size used by `--svg`.
pub const WIDTH: u32 = 960;
pub const HEIGHT: u32 = 600;

/// Escape the five XML special characters.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the scene and legend as a standalone SVG document.
///
/// Countries sit in a group translated by the scene offset, inside a group
/// carrying the pan/zoom transform. Each country has a `<title>` with its
/// tooltip text.
pub fn to_svg(scene: &Scene, legend: &Legend, transform: &ViewTransform, width: u32, height: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
    );

    let (ox, oy) = scene.offset();
    let _ = writeln!(out, r#"  <g class="zoom" transform="{transform}">"#);
    let _ = writeln!(out, r#"    <g class="map" transform="translate({ox},{oy})">"#);

    if let Some(sphere) = scene.sphere() {
        let _ = writeln!(
            out,
            r#"      <path class="sphere" d="{}" fill="{OCEAN}"/>"#,
            sphere.to_path()
        );
    }

    for shape in scene.shapes() {
        let title = tooltip_text(shape.display_name(), shape.category.as_deref());
        let _ = writeln!(
            out,
            r#"      <path class="countries" d="{}" fill="{}" stroke="{}"><title>{}</title></path>"#,
            shape.path,
            shape.fill,
            shape.fill.darken(0.4),
            xml_escape(&title),
        );
    }

    let _ = writeln!(out, "    </g>");
    let _ = writeln!(out, "  </g>");

    if !legend.is_empty() {
        let layout = legend.layout;
        let (lx, ly) = layout.origin;
        let _ = writeln!(out, r#"  <g class="legend" transform="translate({lx},{ly})">"#);
        for entry in legend.entries() {
            let (x, y) = (entry.position.0 - lx, entry.position.1 - ly);
            let _ = writeln!(
                out,
                r#"    <circle cx="{x}" cy="{y}" r="{}" fill="{}"/>"#,
                layout.radius, entry.color,
            );
            let _ = writeln!(
                out,
                r#"    <text x="{}" y="{y}" dy="0.32em">{}</text>"#,
                x + layout.text_offset,
                xml_escape(&entry.label),
            );
        }
        let _ = writeln!(out, "  </g>");
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Columns;
    use crate::interaction::Subscriptions;
    use crate::map::color::{assign_colors, build_domain};
    use crate::map::legend::LegendLayout;
    use crate::map::path::PathBuilder;
    use geojson::{Feature, Geometry, JsonObject, Value};

    fn country(name: &str, income: &str, lon: f64) -> Feature {
        let mut props = JsonObject::new();
        props.insert("name".into(), name.into());
        props.insert("income_grp".into(), income.into());
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![vec![
                vec![lon, 0.0],
                vec![lon + 5.0, 0.0],
                vec![lon + 5.0, 5.0],
                vec![lon, 0.0],
            ]]))),
            id: None,
            properties: Some(props),
            foreign_members: None,
        }
    }

    fn render() -> String {
        let features = vec![
            country("Bosnia & Herzegovina", "3. Upper middle income", 10.0),
            country("Chad", "5. Low income", 20.0),
        ];
        let builder = PathBuilder::default();
        let scale = assign_colors(build_domain(&features, "income_grp"));
        let mut scene = Scene::new((265.0, 100.0));
        scene.add_sphere(&builder);
        scene.add_countries(
            &features,
            &builder,
            &scale,
            &Columns::default(),
            &mut Subscriptions::default(),
        );
        let legend = Legend::new(&scale, LegendLayout::SVG);
        to_svg(&scene, &legend, &ViewTransform::IDENTITY, WIDTH, HEIGHT)
    }

    #[test]
    fn test_escape() {
        assert_eq!(xml_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_document_structure() {
        let svg = render();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"viewBox="0 0 960 600""#));
        assert!(svg.contains(r#"transform="translate(265,100)""#));
        assert!(svg.contains(r#"transform="translate(0,0) scale(1)""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="sphere""#).count(), 1);
    }

    #[test]
    fn test_one_path_per_country_with_title() {
        let svg = render();
        assert_eq!(svg.matches(r#"class="countries""#).count(), 2);
        assert!(svg.contains("<title>Bosnia &amp; Herzegovina: Upper middle income</title>"));
        assert!(svg.contains("<title>Chad: Low income</title>"));
    }

    #[test]
    fn test_legend_layout() {
        let svg = render();
        assert!(svg.contains(r#"<g class="legend" transform="translate(160,500)">"#));
        assert!(svg.contains(r#"<circle cx="0" cy="0" r="15""#));
        assert!(svg.contains(r#"<circle cx="0" cy="45" r="15""#));
        assert!(svg.contains(r#"<text x="25" y="0""#));
    }
}
