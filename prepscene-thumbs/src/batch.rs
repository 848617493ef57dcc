/// Parallel thumbnail generation for a whole catalog
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use nalgebra::Point3;
use prepscene_core::{render_thumbnail_svg, Catalog, CatalogEntry};
use rayon::prelude::*;

use crate::raster::Rasterizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Svg,
    Png,
    Both,
}

impl Format {
    fn svg(self) -> bool {
        matches!(self, Self::Svg | Self::Both)
    }

    fn png(self) -> bool {
        matches!(self, Self::Png | Self::Both)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub format: Format,
    pub locale: String,
    /// Only these entries; all when empty.
    pub ids: Vec<String>,
    pub camera: Option<Point3<f32>>,
    /// PNG size relative to the SVG canvas.
    pub scale: f32,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub written: Vec<PathBuf>,
    pub succeeded: usize,
    /// `(entry id, error)` for every entry that was skipped.
    pub failed: Vec<(String, String)>,
}

impl Summary {
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0 && !self.failed.is_empty()
    }
}

fn check_id(id: &str) -> anyhow::Result<()> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control);
    anyhow::ensure!(valid, "entry id `{id}` is not usable as a file name");
    Ok(())
}

fn render_entry(
    entry: &CatalogEntry,
    opts: &BatchOptions,
    raster: &Rasterizer,
) -> anyhow::Result<Vec<PathBuf>> {
    check_id(&entry.id)?;
    let mut scene = entry.scene_for(&opts.locale)?;
    if let Some(camera) = opts.camera {
        scene = scene.with_camera_position(camera);
    }
    let svg = render_thumbnail_svg(&scene);

    let mut written = Vec::new();
    if opts.format.svg() {
        let path = opts.out_dir.join(format!("{}.svg", entry.id));
        std::fs::write(&path, &svg).with_context(|| format!("write svg '{}'", path.display()))?;
        written.push(path);
    }
    if opts.format.png() {
        let path = opts.out_dir.join(format!("{}.png", entry.id));
        raster.write_png(&svg, opts.scale, &path)?;
        written.push(path);
    }
    Ok(written)
}

fn prepare_out_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

/// Render every selected entry; failures are logged and skipped.
pub fn run(catalog: &Catalog, opts: &BatchOptions, raster: &Rasterizer) -> anyhow::Result<Summary> {
    prepare_out_dir(&opts.out_dir)?;

    let selected: Vec<&CatalogEntry> = catalog
        .entries
        .iter()
        .filter(|e| opts.ids.is_empty() || opts.ids.contains(&e.id))
        .collect();
    for id in &opts.ids {
        if catalog.get(id).is_none() {
            tracing::warn!(id = %id, "requested entry is not in the catalog");
        }
    }
    anyhow::ensure!(!selected.is_empty(), "no catalog entries selected");

    let results: Vec<(String, anyhow::Result<Vec<PathBuf>>)> = selected
        .par_iter()
        .map(|entry| (entry.id.clone(), render_entry(entry, opts, raster)))
        .collect();

    let mut summary = Summary::default();
    for (id, result) in results {
        match result {
            Ok(paths) => {
                for path in &paths {
                    tracing::info!(id = %id, path = %path.display(), "wrote thumbnail");
                }
                summary.written.extend(paths);
                summary.succeeded += 1;
            }
            Err(err) => {
                tracing::error!(id = %id, error = %format!("{err:#}"), "skipping entry");
                summary.failed.push((id, format!("{err:#}")));
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "prepscene-thumbs-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn options(dir: PathBuf, format: Format) -> BatchOptions {
        BatchOptions {
            out_dir: dir,
            format,
            locale: "en".to_string(),
            ids: Vec::new(),
            camera: None,
            scale: 1.0,
        }
    }

    const CATALOG: &str = r#"{"entries": [
        {"id": "in", "category": "space", "scene": {"kind": "cube"}},
        {"id": "around", "scene": {"kind": "cube", "cube": {"variant": "ringCubes"}}},
        {"id": "at", "category": "time", "scene": {"kind": "cube"}},
        {"id": "../escape", "scene": {"kind": "cube"}},
        {"id": "broken", "scene": {"kind": "cube", "cube": {"position": [0, 1]}}}
    ]}"#;

    #[test]
    fn test_writes_svgs_and_skips_bad_entries() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let dir = out_dir("svg");
        let summary = run(&catalog, &options(dir.clone(), Format::Svg), &Rasterizer::new()).unwrap();

        assert_eq!(summary.succeeded, 3);
        let failed: Vec<&str> = summary.failed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, ["../escape", "broken"]);
        assert!(summary.failed[1].1.contains("entry `broken`"));
        assert!(!summary.all_failed());
        assert!(!dir.join("broken.svg").exists());

        let svg = std::fs::read_to_string(dir.join("around.svg")).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(dir.join("at.svg").exists());
        assert!(!dir.join("in.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_filter_and_png() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let dir = out_dir("png");
        let opts = BatchOptions {
            ids: vec!["in".to_string()],
            ..options(dir.clone(), Format::Both)
        };
        let summary = run(&catalog, &opts, &Rasterizer::new()).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.written.len(), 2);
        assert!(dir.join("in.svg").exists());
        assert!(dir.join("in.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_filter_selects_nothing() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let opts = BatchOptions {
            ids: vec!["missing".to_string()],
            ..options(out_dir("none"), Format::Svg)
        };
        assert!(run(&catalog, &opts, &Rasterizer::new()).is_err());
    }

    #[test]
    fn test_check_id() {
        assert!(check_id("towards").is_ok());
        assert!(check_id("..").is_err());
        assert!(check_id("a/b").is_err());
        assert!(check_id("").is_err());
    }
}
