//! Value normalization shared by both extraction strategies

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use url::Url;

fn digits_pattern() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

/// Coerces text to an integer
///
/// The trimmed text is parsed directly; failing that, the first run of digits
/// anywhere in it is used. Returns `None` when the text holds no digits or
/// the number does not fit in an `i64`; out-of-range values count as absent.
///
/// # Examples
///
/// ```
/// use yc_harvest::extract::coerce_int;
///
/// assert_eq!(coerce_int("2014"), Some(2014));
/// assert_eq!(coerce_int("Founded: 2014"), Some(2014));
/// assert_eq!(coerce_int("unknown"), None);
/// assert_eq!(coerce_int("99999999999999999999"), None);
/// ```
pub fn coerce_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    digits_pattern()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Coerces a JSON value to an integer, see [`coerce_int`]
pub fn coerce_json_int(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| coerce_int(&n.to_string())),
        Value::String(s) => coerce_int(s),
        Value::Bool(_) => None,
        // Containers have no meaningful integer form beyond digits in their text
        other => coerce_int(&other.to_string()),
    }
}

/// Renders a scalar JSON value as display text
///
/// `null`, empty strings and containers yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Mirrors the usual "is this value set" test for loosely typed data
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Joins list values into a single display string
///
/// Each value is trimmed, blanks are dropped, and duplicates are removed while
/// keeping the first occurrence. Values are separated by `"; "`.
///
/// # Examples
///
/// ```
/// use yc_harvest::extract::join_values;
///
/// let values = vec!["a".to_string(), "".to_string(), "a".to_string(), "b".to_string()];
/// assert_eq!(join_values(&values), "a; b");
/// ```
pub fn join_values(values: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !seen.contains(&trimmed) {
            seen.push(trimmed);
        }
    }
    seen.join("; ")
}

/// Returns true if `link` points at `domain` or one of its subdomains
///
/// Links that do not parse as absolute URLs are matched by substring, which
/// keeps protocol-relative and malformed links from slipping through.
pub fn points_to_domain(link: &str, domain: &str) -> bool {
    let domain = domain.to_lowercase();
    match Url::parse(link.trim()) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                host == domain || host.ends_with(&format!(".{}", domain))
            }
            None => false,
        },
        Err(_) => link.to_lowercase().contains(&domain),
    }
}
