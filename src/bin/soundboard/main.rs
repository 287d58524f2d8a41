//! soundboard - audition the UI sound catalog from a terminal
//!
//! Run with: cargo run --bin soundboard
//! Logs go to `soundboard.log` next to the settings file; set `RUST_LOG` to
//! change the level.

mod app;
mod ui;

use std::{fs::File, path::Path, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use tracing_subscriber::EnvFilter;

use app::Soundboard;
use sfx_synth::{binding::SoundControls, host::CpalHost, store::FileStore, SoundEngine};

/// Samples buffered between the audio thread and the oscilloscope.
const SCOPE_CAPACITY: usize = 8192;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let store = FileStore::in_config_dir()?;
    init_logging(&store.path().with_file_name("soundboard.log"))?;
    tracing::info!(settings = %store.path().display(), "starting soundboard");

    let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
    let host = CpalHost::new().with_scope(scope_tx);
    let mut controls = SoundControls::new(SoundEngine::new(Box::new(host), Box::new(store)));
    controls.initialize();

    let mut terminal = ratatui::init();
    let result = Soundboard::new(controls, scope_rx).run(&mut terminal);
    ratatui::restore();
    result
}

fn init_logging(path: &Path) -> EyreResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
