//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::data::{Location, Sources};
use crate::map::legend::LegendLayout;
use crate::map::projection::Stereographic;

pub const DEFAULT_TABLE: &str = "https://unpkg.com/world-atlas@1.1.4/world/50m.tsv";
pub const DEFAULT_TOPOLOGY: &str = "https://unpkg.com/world-atlas@1.1.4/world/50m.json";

/// Choropleth world map of income groups
#[derive(Parser, Debug, Clone)]
#[command(name = "income-atlas")]
#[command(about = "Interactive world map coloured by income group")]
pub struct Args {
    /// Tab-separated country table (URL or path)
    #[arg(long, default_value = DEFAULT_TABLE, env = "ATLAS_TABLE")]
    pub table: String,

    /// TopoJSON world topology (URL or path)
    #[arg(long, default_value = DEFAULT_TOPOLOGY, env = "ATLAS_TOPOLOGY")]
    pub topology: String,

    /// Topology object holding the countries
    #[arg(long, default_value = "countries")]
    pub object: String,

    /// Table column matched against feature ids
    #[arg(long, default_value = "iso_n3")]
    pub key_column: String,

    /// Table column shown in tooltips
    #[arg(long, default_value = "name")]
    pub name_column: String,

    /// Table column that drives the colour
    #[arg(long, default_value = "income_grp")]
    pub category_column: String,

    /// Projection scale (default: fit the terminal, 250 for SVG)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Projection rotation as LON,LAT degrees
    #[arg(long, default_value = "0,0", value_parser = parse_rotate, allow_hyphen_values = true)]
    pub rotate: (f64, f64),

    /// Clip angle in degrees
    #[arg(long, default_value_t = Stereographic::DEFAULT_CLIP_ANGLE)]
    pub clip_angle: f64,

    /// Write an SVG document to this path instead of starting the UI
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn sources(&self) -> Sources {
        Sources {
            table: Location::parse(&self.table),
            topology: Location::parse(&self.topology),
        }
    }

    pub fn columns(&self) -> Columns {
        Columns {
            key: self.key_column.clone(),
            name: self.name_column.clone(),
            category: self.category_column.clone(),
        }
    }

    fn projection(&self, scale: f64, translate: (f64, f64)) -> Stereographic {
        Stereographic::new(scale, translate)
            .with_rotate(self.rotate.0, self.rotate.1)
            .with_clip_angle(self.clip_angle)
    }

    /// Layout for an SVG document.
    pub fn svg_scene(&self) -> SceneConfig {
        SceneConfig::svg(self.projection(self.scale.unwrap_or(SceneConfig::SVG_SCALE), SceneConfig::SVG_TRANSLATE))
    }

    /// Layout for a terminal canvas of `width` x `height` pixels.
    pub fn canvas_scene(&self, width: usize, height: usize) -> SceneConfig {
        let mut projection = self.projection(1.0, (0.0, 0.0));
        projection.scale = self
            .scale
            .unwrap_or_else(|| SceneConfig::fit_scale(&projection, width, height));
        SceneConfig::for_canvas(projection, width, height)
    }
}

fn parse_rotate(raw: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT, got {raw:?}"))?;
    let lon = lon.trim().parse::<f64>().map_err(|e| format!("longitude: {e}"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("latitude: {e}"))?;
    Ok((lon, lat))
}

/// Names of the table columns used for the join, tooltip and colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub key: String,
    pub name: String,
    pub category: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            key: "iso_n3".into(),
            name: "name".into(),
            category: "income_grp".into(),
        }
    }
}

/// Where the map and legend are placed.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub projection: Stereographic,
    /// Fixed translation of the map group
    pub offset: (f64, f64),
    pub legend: LegendLayout,
}

impl SceneConfig {
    pub const SVG_SCALE: f64 = 250.0;
    pub const SVG_TRANSLATE: (f64, f64) = (480.0, 250.0);
    pub const SVG_OFFSET: (f64, f64) = (265.0, 100.0);

    pub fn svg(projection: Stereographic) -> Self {
        Self {
            projection,
            offset: Self::SVG_OFFSET,
            legend: LegendLayout::SVG,
        }
    }

    /// Globe centred in the canvas.
    pub fn for_canvas(projection: Stereographic, width: usize, height: usize) -> Self {
        Self {
            projection,
            offset: (width as f64 / 2.0, height as f64 / 2.0),
            legend: LegendLayout::TERMINAL,
        }
    }

    /// Scale at which the clip circle just fits the smaller canvas side.
    pub fn fit_scale(projection: &Stereographic, width: usize, height: usize) -> f64 {
        let side = width.min(height).max(1) as f64;
        let unit = (projection.clip_angle().to_radians() / 2.0).tan();
        side / (2.0 * unit)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::svg(Stereographic::default())
    }
}
