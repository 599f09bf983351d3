use clap::Parser;
use std::path::PathBuf;

/// `card_viewer` - interactive 3D skill card.
///
/// Shows one card at a time from a catalog of skills. Hovering tilts the card
/// towards the pointer, clicking cycles to the next skill, and the card
/// wobbles on its own while left alone.
#[derive(Parser, Debug, Clone)]
#[command(name = "card_viewer", version, about, long_about = None)]
pub struct Config {
    /// JSON catalog of items to cycle through.
    ///
    /// An array of `{ name, level, tint, art, background }` records. When
    /// omitted the built-in demo catalog is used.
    #[arg(long, env = "CARD_VIEWER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Directory that resource ids such as `/raw_texture.webp` resolve against.
    #[arg(long, env = "CARD_VIEWER_ASSETS", default_value = "public")]
    pub assets: PathBuf,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Optional instruction line shown in the HUD.
    #[arg(long)]
    pub hint: Option<String>,

    /// Decode textures on the render thread instead of the worker pool.
    #[arg(long, default_value_t = false)]
    pub inline_loads: bool,
}
