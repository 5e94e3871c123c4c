use crate::config::{ConfigError, LayoutConfig};
use crate::layer::JsonEventLayer;
use crate::layout::JsonEventLayout;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error returned by [`init_tracing_from_env`].
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid layout configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that writes every event to `sink`
/// as a logstash JSON line.
///
/// **Parameters**
/// - `sink`: implementation of [`LogSink`] that receives the encoded lines.
/// - `config`: [`LayoutConfig`] for the [`JsonEventLayout`].
///
/// **Returns**
/// - `Err(..)` if a global default subscriber was already set.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayoutConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = JsonEventLayer::new(JsonEventLayout::new(config), sink);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber)
}

/// Equivalent to [`init_tracing_with_config`] with [`LayoutConfig::default`].
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(sink, LayoutConfig::default())
}

/// Like [`init_tracing_with_config`], reading the configuration from the
/// `LOGSTASH_LAYOUT_*` environment variables.
pub fn init_tracing_from_env(sink: Arc<dyn LogSink>) -> Result<(), InitError> {
    let config = LayoutConfig::from_env()?;
    init_tracing_with_config(sink, config)?;
    Ok(())
}
