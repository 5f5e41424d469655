use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod build;
mod config;
mod error;

#[derive(Parser)]
#[command(name = "frontend-build")]
#[command(version, about = "Build the Wikitext Simplified frontend")]
#[command(after_help = "Examples:
  frontend-build                    # Build WASM and install dependencies
  frontend-build --build            # Full production build
  frontend-build --dev              # Build and start dev server
  frontend-build --skip-wasm        # Skip WASM build (use existing)")]
struct Cli {
    /// Build frontend for production
    #[arg(long)]
    build: bool,

    /// Start development server after building (ignored with --build)
    #[arg(long)]
    dev: bool,

    /// Skip WASM build (use existing WASM module)
    #[arg(long)]
    skip_wasm: bool,

    /// Skip npm install (use existing node_modules)
    #[arg(long)]
    skip_install: bool,

    /// Project root containing wikitext-wasm/ and frontend/ [default: discovered from the current directory]
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Print the commands that would run without running them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.build && cli.dev {
        warn!("--dev ignored because --build was given");
    }

    let config = config::BuildConfig {
        project_root: build::project::resolve_root(cli.project_root)?,
        mode: config::Mode::from_flags(cli.build, cli.dev),
        skip_wasm: cli.skip_wasm,
        skip_install: cli.skip_install,
        dry_run: cli.dry_run,
    };
    build::run(&config)?;

    Ok(())
}
