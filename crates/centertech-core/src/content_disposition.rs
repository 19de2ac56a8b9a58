//! Download filename extraction from `Content-Disposition` headers.

/// Extract the filename from a `Content-Disposition` header value.
///
/// The RFC 5987 `filename*=charset'lang'value` form wins over a plain
/// `filename=` parameter. Parameter names are case-insensitive; values may
/// be quoted. Returns `None` when neither parameter is present or usable.
pub fn extract_filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for param in split_params(header) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                if let Some(decoded) = decode_ext_value(value).filter(|f| !f.is_empty()) {
                    return Some(decoded);
                }
            }
            "filename" if plain.is_none() => plain = Some(unquote(value)),
            _ => {}
        }
    }
    plain.filter(|f| !f.is_empty())
}

/// Split on `;` outside of quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode an extended value: `UTF-8''a%20b.txt`. ISO-8859-1 is mapped byte
/// to char; anything else is decoded as UTF-8.
fn decode_ext_value(value: &str) -> Option<String> {
    let value = value.trim_matches('"');
    let mut parts = value.splitn(3, '\'');
    let (charset, encoded) = match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_lang), Some(encoded)) => (charset, encoded),
        _ => ("utf-8", value),
    };
    if charset.eq_ignore_ascii_case("iso-8859-1") || charset.eq_ignore_ascii_case("latin1") {
        let bytes = urlencoding::decode_binary(encoded.as_bytes());
        return Some(bytes.iter().map(|&b| char::from(b)).collect());
    }
    urlencoding::decode(encoded).ok().map(std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        assert_eq!(
            extract_filename_from_content_disposition(r#"attachment; filename="a b.txt""#),
            Some("a b.txt".to_string())
        );
    }

    #[test]
    fn extended_filename_is_percent_decoded() {
        assert_eq!(
            extract_filename_from_content_disposition("attachment; filename*=UTF-8''a%20b.txt"),
            Some("a b.txt".to_string())
        );
    }

    #[test]
    fn extended_wins_over_plain() {
        let header = r#"attachment; filename="fallback.csv"; filename*=utf-8''relat%C3%B3rio.csv"#;
        assert_eq!(
            extract_filename_from_content_disposition(header),
            Some("relatório.csv".to_string())
        );
    }

    #[test]
    fn missing_filename_is_none() {
        assert_eq!(extract_filename_from_content_disposition("attachment"), None);
        assert_eq!(extract_filename_from_content_disposition("inline; name=\"x\""), None);
        assert_eq!(extract_filename_from_content_disposition(""), None);
        assert_eq!(extract_filename_from_content_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn bare_and_case_insensitive() {
        assert_eq!(
            extract_filename_from_content_disposition("Attachment; FileName=ganhadores.pdf"),
            Some("ganhadores.pdf".to_string())
        );
    }

    #[test]
    fn semicolon_and_escape_inside_quotes() {
        assert_eq!(
            extract_filename_from_content_disposition(r#"attachment; filename="a;b \"c\".txt""#),
            Some(r#"a;b "c".txt"#.to_string())
        );
    }

    #[test]
    fn latin1_extended_value() {
        assert_eq!(
            extract_filename_from_content_disposition("attachment; filename*=ISO-8859-1''caf%E9.txt"),
            Some("café.txt".to_string())
        );
    }
}
