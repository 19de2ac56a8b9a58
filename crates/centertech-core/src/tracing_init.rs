//! Logging setup for Centertech binaries.
//!
//! Verbosity comes from `RUST_LOG` when set, otherwise from the configured
//! level applied to the Centertech crates only. Output always goes to stderr
//! so command output on stdout stays machine-readable.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Crate targets the configured level applies to.
const LOG_TARGETS: &[&str] = &["centertech_core", "centertech_cli", "centertech"];

/// Line format for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("Unknown log format: {other}"))),
        }
    }
}

/// Filter directives for `level` across the Centertech crates, e.g.
/// `centertech_core=debug,centertech_cli=debug,centertech=debug`.
pub fn level_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the filter. `rust_log` wins when present; a level that does not
/// parse falls back to `info`.
fn build_filter(level: &str, rust_log: Option<String>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|v| !v.trim().is_empty())
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }
    EnvFilter::try_new(level_directives(level))
        .unwrap_or_else(|_| EnvFilter::new(level_directives("info")))
}

/// Install the global subscriber.
///
/// Fails when a subscriber is already installed, so callers embedding the
/// library can keep their own.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = build_filter(level, std::env::var("RUST_LOG").ok());
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("Failed to install log subscriber: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            level_directives(" DEBUG "),
            "centertech_core=debug,centertech_cli=debug,centertech=debug"
        );
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let filter = build_filter("debug", Some("warn".into()));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn blank_rust_log_uses_configured_level() {
        let filter = build_filter("trace", Some("  ".into()));
        assert!(filter.to_string().contains("centertech_core=trace"));
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let filter = build_filter("loud", None);
        assert!(filter.to_string().contains("centertech_core=info"));
    }

    #[test]
    fn log_format_parses() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!(matches!("xml".parse::<LogFormat>(), Err(Error::Config(_))));
    }
}
