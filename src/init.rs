use crate::formatter::LogLineFormatter;
use crate::layer::AppLogLayer;
use crate::sink::LineSink;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Settings for the globally installed layer.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top so events are also printed to the console.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that formats events with
/// `formatter` and writes them to `sink`.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`AppLogLayer`] as the global
/// default subscriber, so all `tracing` events in the process are seen
/// by the layer. Callers that want level filtering build the subscriber
/// themselves with a per-layer filter on [`AppLogLayer`]. Fails if another global subscriber is already set.
pub fn init_tracing_with_config(
    formatter: LogLineFormatter,
    sink: Arc<dyn LineSink>,
    config: LayerConfig,
) -> Result<(), InitError> {
    let layer = AppLogLayer::new(formatter, sink);

    // Two subscriber shapes, one per stdout setting, since their types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Equivalent to [`init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn init_tracing(formatter: LogLineFormatter, sink: Arc<dyn LineSink>) -> Result<(), InitError> {
    init_tracing_with_config(formatter, sink, LayerConfig::default())
}
