//! Interactive choropleth of world income groups.
//!
//! A country table and a world topology are loaded together, joined by
//! country code, projected stereographically and coloured by income group.
//! The result is drawn in the terminal with hover tooltips, a legend and
//! pan/zoom, or written out as SVG.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod interaction;
pub mod map;
pub mod raster;
pub mod scene;
pub mod svg;
pub mod ui;

pub use error::{LoadError, LoadResult};
