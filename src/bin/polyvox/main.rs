//! polyvox - plays a short scripted MIDI performance through the voice pool
//!
//! Run with: cargo run -- [sine|theremin]
//!
//! Set POLYVOX_CONFIG to a JSON file to override engine settings and RUST_LOG
//! (e.g. `RUST_LOG=polyvox=debug`) to watch the dispatched events.

mod app;
mod score;

use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use polyvox::{EngineConfig, InstrumentKind};
use tracing_subscriber::EnvFilter;

use app::App;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let instrument = match std::env::args().nth(1).as_deref() {
        None | Some("sine") => InstrumentKind::SineEnv,
        Some("theremin") => InstrumentKind::Theremin,
        Some(other) => bail!("unknown instrument '{other}', expected 'sine' or 'theremin'"),
    };

    let config = match std::env::var_os("POLYVOX_CONFIG") {
        Some(path) => EngineConfig::from_json_file(&path)
            .wrap_err_with(|| format!("failed to load config from {}", path.to_string_lossy()))?,
        None => EngineConfig::for_instrument(instrument),
    };

    App::new(config).run()
}
