use std::{fs::File, path::Path, sync::Mutex};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{alerts, errors::Error, Result};

/// Initialize logging for the bot: console, a log file truncated on start,
/// and the chat alert layer.
///
/// Returns the queue the alert layer feeds; dropping it turns alerting off.
pub fn init(service_name: &str, log_file: &Path) -> Result<alerts::AlertQueue> {
    // Default: info for our crates and everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("info,hwb_core=info,{service_name}=info"))
    });

    let file = File::create(log_file)?;
    let (alert_layer, queue) = alerts::channel();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_line_number(true))
        .with(
            fmt::layer()
                .with_target(false)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(alert_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))?;

    Ok(queue)
}
