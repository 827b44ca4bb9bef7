// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::model::Model;
use crate::shading::ShadingMode;
use crate::viewer::ViewerState;

#[derive(Parser, Debug, Clone)]
#[command(name = "toon-viewer")]
#[command(about = "Stylized mesh viewer: flat, warm-cool and cel shading with outlines", long_about = None)]
pub struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Directory holding teapot and bunny_1k meshes (.obj, .gltf or .glb)
    #[arg(long = "models-dir", default_value = "assets/models")]
    pub models_dir: PathBuf,

    /// Disable the HUD overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial model: teapot, bunny or quad
    #[arg(long, default_value = "bunny")]
    pub model: String,

    /// Initial shading: flat, warm-cool or cel
    #[arg(long, default_value = "flat")]
    pub shading: String,

    /// Start with outlines enabled
    #[arg(long)]
    pub outline: bool,
}

impl Cli {
    /// Viewer state the session starts from; unknown names fall back with a warning
    pub fn initial_state(&self) -> ViewerState {
        ViewerState {
            model: Model::from_name(&self.model),
            mode: ShadingMode::from_name(&self.shading),
            outline: self.outline,
            ..Default::default()
        }
    }
}
