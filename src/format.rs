//! Cell formatting for comparison tables

use crate::value::{ConfigValue, Scalar};

/// Rendered in place of null, empty, or missing values
pub const MISSING: &str = "—";

/// String form of a value for one table cell
///
/// `None`, null and the empty string render as [`MISSING`]; containers render
/// as their canonical serialization.
pub fn cell_str(value: Option<&ConfigValue>) -> String {
    match value {
        None | Some(ConfigValue::Scalar(Scalar::Null)) => MISSING.to_string(),
        Some(ConfigValue::Scalar(Scalar::String(s))) if s.is_empty() => MISSING.to_string(),
        Some(ConfigValue::Scalar(Scalar::String(s))) => s.clone(),
        Some(ConfigValue::Scalar(Scalar::Bool(b))) => b.to_string(),
        Some(ConfigValue::Scalar(Scalar::Number(n))) => n.to_string(),
        Some(container) => container.canonical_string(),
    }
}

/// Turn a raw config key into a display label
///
/// `_secure_policy_rule` becomes `Secure Policy Rule`.
pub fn humanize(key: &str) -> String {
    let stripped = key.strip_prefix('_').unwrap_or(key);
    let spaced: String = stripped
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        if word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = !c.is_alphanumeric();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_str_missing_values() {
        assert_eq!(cell_str(None), MISSING);
        assert_eq!(cell_str(Some(&ConfigValue::null())), MISSING);
        assert_eq!(cell_str(Some(&ConfigValue::from(json!("")))), MISSING);
    }

    #[test]
    fn test_cell_str_scalars() {
        assert_eq!(cell_str(Some(&ConfigValue::from(json!("wan1")))), "wan1");
        assert_eq!(cell_str(Some(&ConfigValue::from(json!(443)))), "443");
        assert_eq!(cell_str(Some(&ConfigValue::from(json!(false)))), "false");
    }

    #[test]
    fn test_cell_str_containers() {
        let servers = ConfigValue::from(json!(["8.8.8.8", "8.8.4.4"]));
        assert_eq!(cell_str(Some(&servers)), r#"["8.8.8.8","8.8.4.4"]"#);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("_secure_policy_rule"), "Secure Policy Rule");
        assert_eq!(humanize("src_zone"), "Src Zone");
        assert_eq!(humanize("log-level"), "Log Level");
        assert_eq!(humanize("_Name"), "Name");
        // only one marker is stripped
        assert_eq!(humanize("__x"), " X");
    }
}
