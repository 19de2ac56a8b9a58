//! Sanitizer subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use serde_json::Value;

use centertech_core::sanitize::{SanitizeKind, to_positive_number};

/// Print `value` run through the `kind` sanitizer.
pub fn run_sanitize(kind: SanitizeKind, value: &str) -> anyhow::Result<()> {
    writeln!(io::stdout(), "{}", kind.apply(value))?;
    Ok(())
}

/// Print `value` coerced to a non-negative number, or `fallback`.
pub fn run_number(value: &str, fallback: f64) -> anyhow::Result<()> {
    let n = to_positive_number(&Value::String(value.to_string()), fallback);
    writeln!(io::stdout(), "{n}")?;
    Ok(())
}
