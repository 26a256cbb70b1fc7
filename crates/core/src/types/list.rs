//! Helpers for list-valued product fields (tags, materials, colors, details).
//!
//! Older records and admin form posts carry these either as a JSON array
//! string or as a comma/newline separated string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Split a list field into trimmed, non-empty entries.
///
/// ```
/// use liahna_core::split_list;
///
/// assert_eq!(split_list(r#"["Novo", "Brilho"]"#), vec!["Novo", "Brilho"]);
/// assert_eq!(split_list("Novo, Brilho\nMinimal"), vec!["Novo", "Brilho", "Minimal"]);
/// assert!(split_list("  ").is_empty());
/// ```
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(trimmed) {
        return entries.into_iter().filter_map(json_entry).collect();
    }

    trimmed
        .split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

fn json_entry(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Null | Value::Bool(false) => return None,
        other => other.to_string(),
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
    List(Vec<String>),
    Text(String),
}

/// Serde helper accepting either a JSON array or a delimited string.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither form.
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<ListInput>::deserialize(deserializer)?;
    Ok(match input {
        None => Vec::new(),
        Some(ListInput::List(items)) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Some(ListInput::Text(text)) => split_list(&text),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_list")]
        tags: Vec<String>,
    }

    #[test]
    fn test_split_list_json_drops_empty_entries() {
        assert_eq!(split_list(r#"["Novo", "", null, " Pérola "]"#), vec!["Novo", "Pérola"]);
    }

    #[test]
    fn test_split_list_invalid_json_falls_back_to_delimiters() {
        assert_eq!(split_list("[Novo, Brilho"), vec!["[Novo", "Brilho"]);
    }

    #[test]
    fn test_deserialize_list_accepts_array_and_text() {
        let form: Form = serde_json::from_str(r#"{"tags": ["Novo", " "]}"#).unwrap();
        assert_eq!(form.tags, vec!["Novo"]);

        let form: Form = serde_json::from_str(r#"{"tags": "Novo, Brilho"}"#).unwrap();
        assert_eq!(form.tags, vec!["Novo", "Brilho"]);

        let form: Form = serde_json::from_str(r#"{"tags": null}"#).unwrap();
        assert!(form.tags.is_empty());

        let form: Form = serde_json::from_str("{}").unwrap();
        assert!(form.tags.is_empty());
    }
}
