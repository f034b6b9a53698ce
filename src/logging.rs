//! Tracing setup driven by the `logging` section of the configuration.
//!
//! The subscriber is installed before the configuration is read, with the
//! default filter, so loader diagnostics are not lost. Once the
//! configuration is known its `logging` section replaces the filter.
//!
//! The section is opaque to the configuration loader. Here it is read as
//! either a filter directive string, or an object carrying `filter` or
//! `level`. `RUST_LOG` always wins when set.

use serde_json::Value;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Derives the filter directive from the `logging` configuration value.
pub fn directive(logging: &Value) -> String {
    match logging {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Object(map) => map
            .get("filter")
            .or_else(|| map.get("level"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DIRECTIVE)
            .to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

/// Handle to the installed subscriber's filter.
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set and must not be replaced
    from_env: bool,
}

/// Installs the global tracing subscriber with the default filter.
pub fn init() -> anyhow::Result<LoggingHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::try_new(DEFAULT_DIRECTIVE)?, false),
    };

    let (subscriber, handle) = reloadable(filter, from_env, std::io::stdout);
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(handle)
}

fn reloadable<W>(
    filter: EnvFilter,
    from_env: bool,
    writer: W,
) -> (impl tracing::Subscriber + Send + Sync + 'static, LoggingHandle)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false));

    (
        subscriber,
        LoggingHandle {
            filter: handle,
            from_env,
        },
    )
}

impl LoggingHandle {
    /// Switches the filter to the one described by the `logging` section.
    pub fn apply(&self, logging: &Value) -> anyhow::Result<()> {
        if self.from_env {
            return Ok(());
        }

        let filter = EnvFilter::try_new(directive(logging))?;
        self.filter.reload(filter)?;
        Ok(())
    }
}
