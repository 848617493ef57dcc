/// SVG to PNG rasterization
use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::Context as _;

/// Rasterizes thumbnail SVGs; system fonts are loaded on first use and shared.
#[derive(Clone, Default)]
pub struct Rasterizer {
    fontdb: OnceLock<Arc<usvg::fontdb::Database>>,
}

fn load_fonts() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.faces().count(), "loaded system fonts");
    Arc::new(db)
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `svg` at `scale` times its size onto a white background.
    pub fn rasterize(&self, svg: &str, scale: f32) -> anyhow::Result<image::RgbaImage> {
        if !(scale.is_finite() && scale > 0.0) {
            anyhow::bail!("invalid raster scale {scale}");
        }
        let opts = usvg::Options {
            fontdb: Arc::clone(self.fontdb.get_or_init(load_fonts)),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts).context("parse svg tree")?;

        let size = tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .with_context(|| format!("allocate {width}x{height} pixmap"))?;
        pixmap.fill(resvg::tiny_skia::Color::WHITE);

        let xform = resvg::tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        // Opaque background, so premultiplied and straight alpha agree.
        image::RgbaImage::from_raw(width, height, pixmap.take())
            .context("pixmap size does not match image buffer")
    }

    pub fn write_png(&self, svg: &str, scale: f32, path: &Path) -> anyhow::Result<()> {
        let image = self.rasterize(svg, scale)?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))
    }
}
