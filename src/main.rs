//! Blockstack — falling-block puzzle minigame in the terminal.

mod app;
mod clock;
mod game;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Options derived from CLI that affect the engine.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// Seed for the piece order; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|_| {
        let mut theme = theme::Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let config = GameConfig { seed: args.seed };
    let mut app = App::new(&config, theme);
    app.run()?;
    Ok(())
}

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockstack",
    version,
    about = "Falling-block puzzle in the terminal. Fill a row edge-to-edge to clear it for 100 points.",
    long_about = "Blockstack is a small falling-block puzzle on a 10x20 field.\n\n\
        Pieces fall one row every 800 ms. Full rows are removed and score 100 each. \
        The game ends when a piece locks without having left the top row.\n\n\
        CONTROLS:\n  Left/h   Move left    Right/l   Move right   Down/j   Soft drop\n  \
        Up/k/i   Rotate       R         Restart      P        Pause\n  Q / Esc  Quit"
)]
pub struct Args {
    /// Seed for the piece order (same seed, same pieces).
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the neon defaults if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
