//! # Logging
//!
//! One call to [`init_logging`] installs a `tracing` subscriber with:
//! - pretty (debug builds), JSON (release builds) or compact output
//! - an `EnvFilter` that keeps workspace crates at the configured level and
//!   HTTP/SQL dependencies at `warn`
//! - optional mirroring of events to a host [`LoggerSink`], with API keys
//!   and similar values redacted
//!
//! ```ignore
//! use bridge_traits::time::LogLevel;
//! use core_runtime::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_level(LogLevel::Debug))?;
//! tracing::info!("Briefing core started");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};

use crate::error::{Error, Result};

/// Crates whose events follow the configured level.
const WORKSPACE_CRATES: &[&str] = &[
    "core_runtime",
    "core_playback",
    "core_history",
    "core_service",
    "provider_gemini",
    "bridge_desktop",
];

/// Noisy dependencies, capped at `warn` unless a custom filter is given.
const QUIET_DEPENDENCIES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "rustls", "sqlx"];

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line text
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Replaces the generated filter entirely, e.g. `core_playback=trace`.
    pub filter: Option<String>,
    /// Redact secret-looking fields before they reach the sink.
    pub redact_secrets: bool,
    pub sink: Option<Arc<dyn LoggerSink>>,
    /// Log span open/close (pretty) or the span list (JSON).
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            redact_secrets: true,
            sink: None,
            span_events: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("redact_secrets", &self.redact_secrets)
            .field("sink", &self.sink.as_ref().map(|_| "LoggerSink { ... }"))
            .field("span_events", &self.span_events)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact_secrets = redact;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_span_events(mut self, enable: bool) -> Self {
        self.span_events = enable;
        self
    }

    /// Filter directives derived from this configuration.
    pub fn filter_directives(&self) -> String {
        if let Some(custom) = &self.filter {
            return custom.clone();
        }

        let level = self.level.as_str();
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, level))
            .chain(QUIET_DEPENDENCIES.iter().map(|dep| format!("{}=warn", dep)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// [`Error::Config`] when the filter does not parse or a global subscriber
/// is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    let output = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(if config.span_events {
                FmtSpan::NEW | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(config.span_events)
            .with_span_list(config.span_events)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stdout)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(config.sink.clone().map(|sink| SinkLayer {
            sink,
            redact: config.redact_secrets,
        }))
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(config.filter_directives())
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

// ============================================================================
// Host sink
// ============================================================================

/// Mirrors events to a [`LoggerSink`].
struct SinkLayer {
    sink: Arc<dyn LoggerSink>,
    redact: bool,
}

impl SinkLayer {
    fn deliver(&self, entry: LogEntry) {
        let sink = Arc::clone(&self.sink);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = sink.log(entry).await {
                        eprintln!("LoggerSink error: {}", err);
                    }
                });
            }
            Err(_) => {
                if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                    eprintln!("LoggerSink error: {}", err);
                }
            }
        }
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = match *metadata.level() {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        };
        if level < self.sink.min_level() {
            return;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let mut entry = LogEntry::new(
            level,
            metadata.target(),
            fields.message.take().unwrap_or_default(),
        );
        for (name, value) in fields.values {
            let value = if self.redact {
                redact_if_sensitive(&name, &value)
            } else {
                value
            };
            entry = entry.with_field(name, value);
        }
        if let Some(span) = ctx.event_span(event) {
            entry = entry.in_span(span.name());
        }

        self.deliver(entry);
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: BTreeMap<String, String>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_debug(field, &format_args!("{}", value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_debug(field, &format_args!("{}", value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.values.insert(field.name().to_string(), text);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `[REDACTED]` when `field_name` looks like it holds a credential.
///
/// ```ignore
/// tracing::debug!(api_key = %redact_if_sensitive("api_key", &key), "Configured Gemini");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SENSITIVE: &[&str] = &[
        "api_key",
        "apikey",
        "x-goog-api-key",
        "token",
        "secret",
        "authorization",
    ];

    let name = field_name.to_ascii_lowercase();
    if SENSITIVE.iter().any(|s| name.contains(s)) || value.contains("key=") {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// File name of `path`, so logs do not leak the user's directory layout.
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    #[async_trait]
    impl LoggerSink for RecordingSink {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Debug
        }
    }

    fn with_sink(redact: bool, f: impl FnOnce()) -> Vec<LogEntry> {
        let sink = Arc::new(RecordingSink::default());
        let subscriber = tracing_subscriber::registry().with(SinkLayer {
            sink: sink.clone(),
            redact,
        });
        tracing::subscriber::with_default(subscriber, f);
        let entries = sink.entries.lock().unwrap().clone();
        entries
    }

    #[test]
    fn test_default_directives() {
        let directives = LoggingConfig::default()
            .with_level(LogLevel::Debug)
            .filter_directives();
        assert!(directives.contains("core_playback=debug"));
        assert!(directives.contains("provider_gemini=debug"));
        assert!(directives.contains("sqlx=warn"));
        assert!(build_filter(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_custom_filter() {
        let config = LoggingConfig::default().with_filter("core_playback=[[[");
        assert!(matches!(build_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_sink_receives_fields_and_span() {
        let entries = with_sink(false, || {
            let span = tracing::info_span!("generate");
            let _entered = span.enter();
            tracing::info!(target: "core_playback", frames = 4u64, "Audio ready");
        });

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "core_playback");
        assert_eq!(entries[0].message, "Audio ready");
        assert_eq!(entries[0].fields.get("frames").map(String::as_str), Some("4"));
        assert_eq!(entries[0].span.as_deref(), Some("generate"));
    }

    #[test]
    fn test_sink_redacts_and_filters_by_level() {
        let entries = with_sink(true, || {
            tracing::trace!("too verbose for the sink");
            tracing::warn!(api_key = "AIza-secret", model = "gemini-2.5-flash", "Request failed");
        });

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fields.get("api_key").map(String::as_str), Some(REDACTED));
        assert_eq!(
            entries[0].fields.get("model").map(String::as_str),
            Some("gemini-2.5-flash")
        );
    }
}
