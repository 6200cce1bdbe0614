//! Application-wide structured logging.
//!
//! Events are written as Bunyan-formatted JSON lines. The level filter comes
//! from `RUST_LOG` and falls back to the level passed by the caller. Records
//! emitted through the `log` facade (sqlx, reqwest internals) are bridged into
//! `tracing` so they land in the same stream.

use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

/// Builds the subscriber without installing it.
///
/// `sink` decides where lines go; `main` passes `std::io::stdout`, tests can
/// pass `std::io::sink`.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default and bridges `log` records.
///
/// # Errors
/// Fails if a global subscriber or logger was already installed.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
