/// Prepscene Terminal - live view of one scene
///
/// Controls:
///   - Mouse drag: orbit the camera, or move the ball when grabbed
///   - Scroll / + / -: zoom
///   - P: play the motion path
///   - R: reset the camera
///   - Q/ESC: quit
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;
use clap::Parser;
use prepscene_core::{parse, Catalog, SceneConfig};
use prepscene_terminal::TerminalApp;

#[derive(Parser, Debug)]
#[command(name = "prepscene-terminal", version)]
struct Args {
    /// Catalog JSON to pick the scene from (a single cube is shown otherwise).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Catalog entry id (defaults to the first entry).
    #[arg(long)]
    id: Option<String>,

    /// Locale for labels.
    #[arg(long, default_value = "en")]
    locale: String,

    /// Camera position override, e.g. "2.6, 2, 3.4".
    #[arg(long)]
    camera: Option<String>,

    /// Motion path override, e.g. "0,0,1.4 -> 0,0,0.1".
    #[arg(long)]
    path: Option<String>,

    /// Write logs to this file (the screen belongs to the renderer).
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_logging(path: &PathBuf) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create log file '{}'", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_scene(args: &Args) -> anyhow::Result<(SceneConfig, String)> {
    let (mut scene, title) = match &args.catalog {
        Some(path) => {
            let catalog = Catalog::load(path)
                .with_context(|| format!("load catalog '{}'", path.display()))?;
            let entry = match &args.id {
                Some(id) => catalog
                    .get(id)
                    .with_context(|| format!("no entry '{id}' in '{}'", path.display()))?,
                None => catalog
                    .entries
                    .first()
                    .with_context(|| format!("catalog '{}' is empty", path.display()))?,
            };
            (entry.scene_for(&args.locale)?, entry.id.clone())
        }
        None => (SceneConfig::cube(), "cube".to_string()),
    };

    if let Some(literal) = &args.camera {
        scene = scene.with_camera_position(parse::point3(literal)?);
    }
    if let Some(literal) = &args.path {
        scene = scene.with_motion_path(parse::path(literal)?);
    }
    Ok((scene, title))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let (scene, title) = load_scene(&args)?;
    tracing::info!(scene = %title, locale = %args.locale, "starting terminal view");

    let mut app = TerminalApp::new(scene, format!("Prepscene | {title}"))
        .context("query terminal size")?;
    app.run().context("terminal renderer")?;

    tracing::info!("terminal view closed");
    Ok(())
}
