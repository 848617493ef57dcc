use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use prepscene_core::{parse, Catalog};
use prepscene_thumbs::{BatchOptions, Format, Rasterizer};

#[derive(Parser, Debug)]
#[command(name = "prepscene-thumbs", version)]
struct Args {
    /// Catalog JSON.
    #[arg(long)]
    catalog: PathBuf,

    /// Output directory.
    #[arg(long, default_value = "thumbnails")]
    out_dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Locale for labels.
    #[arg(long, default_value = "en")]
    locale: String,

    /// Only render these entries (repeatable).
    #[arg(long = "id")]
    ids: Vec<String>,

    /// Camera position override for every entry, e.g. "2.6, 2, 3.4".
    #[arg(long)]
    camera: Option<String>,

    /// PNG size relative to the 120px canvas.
    #[arg(long, default_value_t = 2.0)]
    scale: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("load catalog '{}'", args.catalog.display()))?;
    let camera = args
        .camera
        .as_deref()
        .map(parse::point3)
        .transpose()
        .context("parse --camera")?;

    let opts = BatchOptions {
        out_dir: args.out_dir,
        format: args.format,
        locale: args.locale,
        ids: args.ids,
        camera,
        scale: args.scale,
    };
    let summary = prepscene_thumbs::run(&catalog, &opts, &Rasterizer::new())?;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        files = summary.written.len(),
        "batch finished"
    );
    if summary.all_failed() {
        anyhow::bail!("every catalog entry failed to render");
    }
    Ok(())
}
