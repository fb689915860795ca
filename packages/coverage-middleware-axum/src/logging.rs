use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogOptions {
    /// One of `error`, `warn`, `info`, `debug`, `trace`. Nothing is installed
    /// when unset or unknown.
    pub level: Option<String>,
    pub enable_trace: bool,
}

impl LogOptions {
    pub fn max_level(&self) -> Option<tracing::Level> {
        match self.level.as_deref() {
            Some("error") => Some(tracing::Level::ERROR),
            Some("warn") => Some(tracing::Level::WARN),
            Some("info") => Some(tracing::Level::INFO),
            Some("debug") => Some(tracing::Level::DEBUG),
            Some("trace") => Some(tracing::Level::TRACE),
            _ => None,
        }
    }
}

/// Installs the global fmt subscriber. Fails if another subscriber was
/// installed before.
pub fn init_logging(log_options: &LogOptions) -> Result<(), InitError> {
    let log_level = match log_options.max_level() {
        Some(log_level) => log_level,
        None => return Ok(()),
    };

    let builder = tracing_subscriber::fmt().with_max_level(log_level);

    let builder = if log_options.enable_trace {
        builder.with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
    } else {
        builder
    };

    builder
        .with_ansi(false)
        .event_format(tracing_subscriber::fmt::format().pretty())
        .try_init()
}
