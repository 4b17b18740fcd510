//! beatloop - terminal player for generated beat scores
//!
//! Run with: cargo run -- path/to/beat.mid [style]
//!
//! The file stands in for the generation service; press `g` to re-read it
//! as a fresh generation, space to play/stop, `d` to save a copy, `q` to
//! quit.

mod app;
mod ui;

use app::Player;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| eyre!("usage: beatloop <score.mid> [style]"))?;
    let style = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| eyre!(e))?;

    Player::new(path, style).run()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
