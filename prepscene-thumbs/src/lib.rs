/// Offline thumbnail driver: catalog in, one SVG (and optionally PNG) per entry out
pub mod batch;
pub mod raster;

pub use batch::{run, BatchOptions, Format, Summary};
pub use raster::Rasterizer;
