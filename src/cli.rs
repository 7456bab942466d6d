// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::sketches::SketchKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "sketches")]
#[command(about = "Generative sketches rendered with WebGPU", long_about = None)]
pub struct Cli {
    /// Sketch to run
    #[arg(value_enum, default_value_t = SketchKind::Polka)]
    pub sketch: SketchKind,

    /// Hide the overlay with frame rate and playback controls
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Render every frame offscreen into DIR instead of opening a window
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// JSON file whose keys override the sketch's settings
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory textures are loaded from
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Seed for sketches that place things at random
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}
