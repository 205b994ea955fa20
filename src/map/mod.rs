pub mod color;
pub mod geometry;
pub mod legend;
pub mod path;
pub mod projection;
pub mod renderer;

pub use color::{assign_colors, build_domain, ColorScale, Rgb};
pub use legend::{Legend, LegendLayout};
pub use path::PathBuilder;
pub use projection::Stereographic;
pub use renderer::{rasterize, RenderOptions};
