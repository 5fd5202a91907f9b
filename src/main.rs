use clap::Parser;
use glyphsplit::glyph::export::{DEFAULT_INPUT, DEFAULT_OUT_DIR};
use glyphsplit::ExportConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "glyphsplit", version)]
#[command(about = "Write each mapped glyph of an SVG font to its own SVG file", long_about = None)]
struct Cli {
    /// SVG font to read
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Existing directory for the tile files
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = ExportConfig {
        input: cli.input,
        out_dir: cli.out_dir,
    };

    let summary = glyphsplit::run(&config)?;
    info!("Done: {} files in {}", summary.written, config.out_dir.display());
    Ok(())
}
