//! Canonicalization of free-form job and profile fields into comparable
//! tokens. This is the only place string/number ambiguity is resolved; the
//! match engine consumes normalized sets and never re-normalizes.

use std::collections::HashSet;

use serde_json::Value;

/// Trims, lowercases, and collapses internal whitespace runs to single
/// spaces. Empty or absent input normalizes to the empty string.
pub fn normalize_string(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a list of free-form strings into a deduplicated token set.
/// Each element may itself be comma-separated; empty tokens are dropped.
pub fn normalize_tokens<I, S>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = HashSet::new();
    for value in values {
        for part in value.as_ref().split(',') {
            let token = normalize_string(part);
            if !token.is_empty() {
                tokens.insert(token);
            }
        }
    }
    tokens
}

/// Coerces a loose JSON value (number or string) into a finite f64. Strips
/// every character except digits, `.`, and `-` from strings, so "55,000" and
/// "$120000" both parse. Returns None rather than ever failing.
pub fn to_numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// The onboarding form historically persisted the literal string "null" for
/// an unset sector. Treat it, and blank strings, as absent.
pub fn sector_or_none(sector: Option<&str>) -> Option<String> {
    let normalized = normalize_string(sector?);
    if normalized.is_empty() || normalized == "null" {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_string_collapses_whitespace() {
        assert_eq!(normalize_string("  Senior   Rust\tEngineer "), "senior rust engineer");
        assert_eq!(normalize_string(""), "");
        assert_eq!(normalize_string("   "), "");
    }

    #[test]
    fn test_normalize_tokens_dedupes_and_splits_commas() {
        let tokens = normalize_tokens(["Rust, Go", "rust", "  "]);
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("rust"));
        assert!(tokens.contains("go"));
    }

    #[test]
    fn test_normalize_tokens_empty_input() {
        let tokens = normalize_tokens(Vec::<String>::new());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_to_numeric_number() {
        assert_eq!(to_numeric(&json!(120000)), Some(120000.0));
        assert_eq!(to_numeric(&json!(-3.5)), Some(-3.5));
    }

    #[test]
    fn test_to_numeric_formatted_string() {
        assert_eq!(to_numeric(&json!("55,000")), Some(55000.0));
        assert_eq!(to_numeric(&json!("$120000 per year")), Some(120000.0));
    }

    #[test]
    fn test_to_numeric_garbage_is_none() {
        assert_eq!(to_numeric(&json!("competitive")), None);
        assert_eq!(to_numeric(&json!(null)), None);
        assert_eq!(to_numeric(&json!([1, 2])), None);
    }

    #[test]
    fn test_sector_sentinel_treated_as_absent() {
        assert_eq!(sector_or_none(Some("null")), None);
        assert_eq!(sector_or_none(Some(" NULL ")), None);
        assert_eq!(sector_or_none(Some("")), None);
        assert_eq!(sector_or_none(None), None);
        assert_eq!(sector_or_none(Some("Technology")), Some("technology".to_string()));
    }
}
