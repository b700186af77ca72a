use clap::Parser;
use log::{error, info};
use orbit_sketch::app::{run_gui, run_headless};
use orbit_sketch::io::config::Config;
use orbit_sketch::sketches::SketchKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Orbit-camera scene sketches", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sketch to run; overrides the configuration.
    #[arg(short, long, value_enum)]
    sketch: Option<SketchKind>,

    /// Render to an image file instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Headless only: animation ticks to run before saving.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Headless only: output image path.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from '{}'", path.display());
            Config::load(path).map_err(|e| {
                error!("{e}");
                e.to_string()
            })?
        }
        None => Config::default(),
    };
    if let Some(sketch) = cli.sketch {
        config.sketch = sketch;
    }

    let result = if cli.headless {
        run_headless(&config, cli.ticks, cli.output).map(|path| {
            info!("Frame written to '{}'", path.display());
        })
    } else {
        run_gui(config)
    };

    result.map_err(|e| {
        error!("{e}");
        e.to_string()
    })
}
