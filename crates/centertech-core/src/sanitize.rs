//! Input sanitizers for storefront form fields.
//!
//! Every function is total: malformed input is normalized, never rejected.
//! Applying a sanitizer to its own output returns the same string.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));
static WHITESPACE_RUN_2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex is valid"));

/// The string sanitizers, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeKind {
    Text,
    Multiline,
    Email,
    Phone,
    Numeric,
    Currency,
    Code,
    Url,
}

impl SanitizeKind {
    pub const ALL: [Self; 8] = [
        Self::Text,
        Self::Multiline,
        Self::Email,
        Self::Phone,
        Self::Numeric,
        Self::Currency,
        Self::Code,
        Self::Url,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Multiline => "multiline",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Numeric => "numeric",
            Self::Currency => "currency",
            Self::Code => "code",
            Self::Url => "url",
        }
    }

    /// Run the sanitizer for this kind.
    pub fn apply(self, input: &str) -> String {
        match self {
            Self::Text => sanitize_text(input),
            Self::Multiline => sanitize_multiline(input),
            Self::Email => sanitize_email(input),
            Self::Phone => sanitize_phone(input),
            Self::Numeric => sanitize_numeric(input),
            Self::Currency => sanitize_currency(input),
            Self::Code => sanitize_code(input),
            Self::Url => sanitize_url(input),
        }
    }
}

impl fmt::Display for SanitizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SanitizeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown sanitizer '{s}': expected one of {}", names.join(", "))
            })
    }
}

/// Sanitize a loosely typed form value. Anything but a JSON string yields `""`.
pub fn sanitize_value(kind: SanitizeKind, value: &Value) -> String {
    value.as_str().map(|s| kind.apply(s)).unwrap_or_default()
}

/// Collapse whitespace runs to one space and strip leading whitespace.
/// Trailing whitespace is kept so a field can be sanitized while typing.
pub fn sanitize_text(input: &str) -> String {
    WHITESPACE_RUN
        .replace_all(input, " ")
        .trim_start()
        .to_string()
}

/// Like [`sanitize_text`] but only runs of two or more whitespace characters
/// collapse, so single line breaks survive.
pub fn sanitize_multiline(input: &str) -> String {
    WHITESPACE_RUN_2
        .replace_all(input, " ")
        .trim_start()
        .to_string()
}

pub fn sanitize_email(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

pub fn sanitize_phone(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | ' ' | '-'))
        .collect()
}

pub fn sanitize_numeric(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

pub fn sanitize_currency(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect()
}

/// Ticket/coupon codes: ASCII letters, digits and `-`, uppercased.
pub fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn sanitize_url(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Coerce a number or numeric string to a non-negative finite `f64`.
///
/// Strings accept a decimal comma (`"12,5"` is `12.5`) and surrounding
/// whitespace; an empty string counts as `0`. Negative, non-finite,
/// unparsable and non-numeric values all yield `fallback`.
pub fn to_positive_number(value: &Value, fallback: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 => n,
        _ => fallback,
    }
}

/// [`to_positive_number`] with a fallback of `0`.
pub fn positive_number_or_zero(value: &Value) -> f64 {
    to_positive_number(value, 0.0)
}

fn parse_decimal(s: &str) -> Option<f64> {
    let normalized = s.trim().replace(',', ".");
    if normalized.is_empty() {
        return Some(0.0);
    }
    normalized.parse::<f64>().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_collapses_whitespace_and_trims_start_only() {
        assert_eq!(sanitize_text("  Maria \t\n da   Silva  "), "Maria da Silva ");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn multiline_keeps_single_line_breaks() {
        assert_eq!(sanitize_multiline("\n  linha um\nlinha  dois"), "linha um\nlinha dois");
        assert_eq!(sanitize_multiline("a\n\nb"), "a b");
    }

    #[test]
    fn email_strips_whitespace_and_lowercases() {
        let inputs = [" Foo@Example.COM ", "a b@c d.com", "\tX@Y.Z\n", "already@clean.io"];
        for input in inputs {
            let once = sanitize_email(input);
            assert_eq!(sanitize_email(&once), once);
            assert!(!once.chars().any(char::is_whitespace));
            assert_eq!(once, once.to_lowercase());
        }
        assert_eq!(sanitize_email(" Foo@Example.COM "), "foo@example.com");
    }

    #[test]
    fn phone_keeps_dial_characters() {
        assert_eq!(sanitize_phone("+55 (11) 98765-4321 ramal#2"), "+55 (11) 98765-4321 2");
    }

    #[test]
    fn numeric_and_currency_filters() {
        assert_eq!(sanitize_numeric("123.456.789-00"), "12345678900");
        assert_eq!(sanitize_numeric("١٢٣"), "");
        assert_eq!(sanitize_currency("R$ 1.234,56"), "1.234,56");
    }

    #[test]
    fn code_is_upper_alnum_dash() {
        let inputs = ["abc-123 xyz", "ção-ß-9", "!!", "ALREADY-OK"];
        for input in inputs {
            let once = sanitize_code(input);
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
            );
            assert_eq!(sanitize_code(&once), once);
        }
        assert_eq!(sanitize_code("abc-123 xyz"), "ABC-123XYZ");
        assert_eq!(sanitize_code("ção-ß-9"), "CO--9");
    }

    #[test]
    fn url_strips_whitespace() {
        assert_eq!(sanitize_url(" https://x.io/a b\n"), "https://x.io/ab");
    }

    #[test]
    fn non_string_values_sanitize_to_empty() {
        for value in [json!(null), json!(42), json!(true), json!(["a"]), json!({"a": 1})] {
            assert_eq!(sanitize_value(SanitizeKind::Text, &value), "");
        }
        assert_eq!(sanitize_value(SanitizeKind::Email, &json!(" A@B.C")), "a@b.c");
    }

    #[test]
    fn positive_number_coercion() {
        assert_eq!(positive_number_or_zero(&json!("12,5")), 12.5);
        assert_eq!(positive_number_or_zero(&json!(" 3.25 ")), 3.25);
        assert_eq!(positive_number_or_zero(&json!(8)), 8.0);
        assert_eq!(positive_number_or_zero(&json!("-3")), 0.0);
        assert_eq!(positive_number_or_zero(&json!(-1.5)), 0.0);
        assert_eq!(positive_number_or_zero(&json!("")), 0.0);
        assert_eq!(to_positive_number(&json!("abc"), 7.0), 7.0);
        assert_eq!(to_positive_number(&json!("NaN"), 7.0), 7.0);
        assert_eq!(to_positive_number(&json!("inf"), 7.0), 7.0);
        assert_eq!(to_positive_number(&json!(null), 7.0), 7.0);
    }

    #[test]
    fn kind_parses_from_name() {
        for kind in SanitizeKind::ALL {
            assert_eq!(kind.as_str().parse::<SanitizeKind>().unwrap(), kind);
        }
        assert_eq!("EMAIL".parse::<SanitizeKind>().unwrap(), SanitizeKind::Email);
        assert!("zip".parse::<SanitizeKind>().is_err());
    }
}
