//! raycaster: render a sphere/plane scene description to a PPM image
//!
//! Usage:
//!   raycaster 640 480 scene.json out.ppm
//!   raycaster 80 60 scene.json out.ppm --format p3 --preview

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use raycaster::config::RenderConfig;
use raycaster::ppm::{write_ppm, PpmFormat};
use raycaster::{load_scene, Renderer, TerminalPreview};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// ASCII samples
    P3,
    /// Binary samples
    P6,
}

impl From<FormatArg> for PpmFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::P3 => PpmFormat::P3,
            FormatArg::P6 => PpmFormat::P6,
        }
    }
}

#[derive(Parser)]
#[command(name = "raycaster")]
#[command(version = "0.1.0")]
#[command(about = "Render a sphere/plane scene to a PPM image")]
#[command(long_about = "
raycaster casts one ray per pixel from a camera at the origin looking down +z,
shades hits with Phong diffuse and specular terms and hard shadows, and writes
the result as a PPM image.

Example usage:
  raycaster 640 480 scene.json out.ppm
  raycaster 80 60 scene.json out.ppm --format p3 --preview
")]
struct Cli {
    /// Image width in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Image height in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Scene description file
    input: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Path to render config file (defaults to ./raycaster.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output image format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Override the shader depth budget (1 to 16)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=raycaster::MAX_RECURSION_DEPTH as i64))]
    depth: Option<u32>,

    /// Print a character-art preview after rendering
    #[arg(long)]
    preview: bool,

    /// Print the parsed scene before rendering
    #[arg(long)]
    print_scene: bool,

    /// Render on a single thread
    #[arg(long)]
    sequential: bool,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    run(&cli, &config)
}

/// Load the config file and apply CLI overrides
fn load_config(cli: &Cli) -> anyhow::Result<RenderConfig> {
    let mut config = RenderConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load render configuration")?;

    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(depth) = cli.depth {
        config.render.recursion_depth = depth;
    }
    if cli.sequential {
        config.render.parallel = false;
    }
    if cli.preview {
        config.preview.enabled = true;
    }

    config.validate()?;
    tracing::debug!(?config, "Configuration resolved");

    Ok(config)
}

fn run(cli: &Cli, config: &RenderConfig) -> anyhow::Result<()> {
    tracing::info!("Loading scene from {:?}", cli.input);
    let scene = load_scene(&cli.input)
        .with_context(|| format!("Failed to load scene {}", cli.input.display()))?;

    tracing::info!(
        surfaces = scene.surfaces.len(),
        lights = scene.lights.len(),
        "Scene loaded"
    );

    if cli.print_scene {
        println!("{}", scene);
    }

    let mut renderer = Renderer::new(cli.width as usize, cli.height as usize).with_settings(&config.render);
    renderer.render(&scene);

    write_ppm(&cli.output, renderer.framebuffer(), config.output.format)
        .with_context(|| format!("Failed to write image {}", cli.output.display()))?;

    if config.preview.enabled {
        TerminalPreview::new(&config.preview)
            .render(renderer.framebuffer())
            .context("Failed to write preview")?;
    }

    Ok(())
}
