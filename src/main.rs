//! Splitris: falling blocks that split apart when rows clear, in the terminal.

mod app;
mod keyboard;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::KeyCode;
use splitris::GameConfig;
use splitris::config::{DEFAULT_HEIGHT, DEFAULT_PREVIEW, DEFAULT_WIDTH};

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref())
        .with_context(|| format!("loading theme {:?}", args.theme))?;
    let mut app = App::new(&args, theme)?;
    app.run()?;
    Ok(())
}

/// Falling-block puzzle where cleared rows cut pieces apart.
#[derive(Debug, Parser)]
#[command(
    name = "splitris",
    version,
    about = "Falling-block puzzle in the terminal where cleared rows split pieces apart.",
    long_about = "Splitris is a falling-block puzzle in the terminal.\n\n\
        Full rows are emptied in place; nothing above them shifts down. Pieces cut by a \
        cleared row break into fragments that fall on their own until they land.\n\n\
        CONTROLS:\n  Left/Right  Move      Down   Soft drop   s      Slide to floor\n  \
        c           Rotate CW Up     Rotate CCW\n  \
        Enter/r     Start     p      Pause       e      Stop   q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (theme[key]=\"#RRGGBB\")."
)]
pub struct Args {
    /// Playfield width in columns (grid cells).
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS", value_parser = parse_dimension)]
    pub width: usize,

    /// Playfield height in rows (grid cells).
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS", value_parser = parse_dimension)]
    pub height: usize,

    /// Number of upcoming pieces shown and queued.
    #[arg(long, default_value_t = DEFAULT_PREVIEW, value_name = "N")]
    pub preview: usize,

    /// Seed for the piece sequence (random when not set).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Disable the row-clear fade (cleared rows vanish at once).
    #[arg(long)]
    pub no_animation: bool,

    /// Milliseconds between game loop ticks.
    #[arg(long, default_value = "20", value_name = "MS")]
    pub tick_ms: u64,
}

/// Largest accepted width or height. Anything bigger cannot be drawn.
const MAX_DIMENSION: usize = 1000;

fn parse_dimension(value: &str) -> Result<usize, String> {
    let n: usize = value.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_DIMENSION).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {MAX_DIMENSION}"))
    }
}

impl Args {
    pub fn game_config(&self) -> GameConfig<KeyCode> {
        let config = GameConfig::new(keyboard::default_bindings())
            .with_size(self.width, self.height)
            .with_preview(self.preview);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}
