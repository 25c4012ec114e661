//! Placeholder extraction and template filling

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::scanner::{scan, Segment};

/// Classification tag carried by a placeholder
///
/// The tag is informational only: values are never parsed or validated
/// against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderType {
    #[default]
    Text,
    Number,
    Date,
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderType::Text => write!(f, "text"),
            PlaceholderType::Number => write!(f, "number"),
            PlaceholderType::Date => write!(f, "date"),
        }
    }
}

/// A placeholder found in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PlaceholderType,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, default_value: Option<String>) -> Self {
        Self {
            name: name.into(),
            default_value,
            kind: PlaceholderType::Text,
        }
    }
}

/// Extract placeholders from a template, one per occurrence, in source order
///
/// # Example
///
/// ```rust
/// use ask_e9y::extract_placeholders;
///
/// let found = extract_placeholders("Find {count:10} items in {org:Acme}");
/// assert_eq!(found[0].name, "count");
/// assert_eq!(found[0].default_value.as_deref(), Some("10"));
/// assert_eq!(found[1].name, "org");
/// ```
pub fn extract_placeholders(template: &str) -> Vec<Placeholder> {
    scan(template)
        .filter_map(|segment| match segment {
            Segment::Placeholder { name, default, .. } => {
                Some(Placeholder::new(name, default.map(str::to_string)))
            }
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Fill a template with the provided values
///
/// Tokens whose name has a value are replaced by it verbatim, whatever
/// default they declare. The result is then scanned once more and every
/// remaining token resolves to its own default, or to the empty string.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use ask_e9y::fill_template;
///
/// let values = HashMap::from([("count".to_string(), "25".to_string())]);
/// assert_eq!(fill_template("Find {count:10} items", &values), "Find 25 items");
/// assert_eq!(fill_template("Find {count:10} items", &HashMap::new()), "Find 10 items");
/// ```
pub fn fill_template(template: &str, values: &HashMap<String, String>) -> String {
    let supplied = substitute(template, |name, _| values.get(name).map(String::as_str));
    substitute(&supplied, |_, default| Some(default.unwrap_or("")))
}

/// Rewrite every placeholder for which `resolve` returns a replacement
fn substitute<'t, 'r, F>(template: &'t str, mut resolve: F) -> String
where
    F: FnMut(&'t str, Option<&'t str>) -> Option<&'r str>,
{
    let mut out = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder {
                name,
                default,
                span,
            } => match resolve(name, default) {
                Some(value) => out.push_str(value),
                None => out.push_str(&template[span]),
            },
        }
    }
    out
}

/// Starting values for executing a template: each placeholder's default or `""`
///
/// When a name occurs more than once the last occurrence wins.
pub fn initial_values(placeholders: &[Placeholder]) -> HashMap<String, String> {
    placeholders
        .iter()
        .map(|p| {
            (
                p.name.clone(),
                p.default_value.clone().unwrap_or_default(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_placeholders("").is_empty());
    }

    #[test]
    fn test_extract_single() {
        assert_eq!(
            extract_placeholders("Show members from {org}"),
            vec![Placeholder {
                name: "org".to_string(),
                default_value: None,
                kind: PlaceholderType::Text,
            }]
        );
    }

    #[test]
    fn test_extract_defaults_in_order() {
        assert_eq!(
            extract_placeholders("Find {count:10} items in {org:Acme}"),
            vec![
                Placeholder::new("count", Some("10".to_string())),
                Placeholder::new("org", Some("Acme".to_string())),
            ]
        );
    }

    #[test]
    fn test_extract_no_placeholders() {
        assert!(extract_placeholders("No placeholders here").is_empty());
        assert!(extract_placeholders("Unmatched { brace").is_empty());
    }

    #[test]
    fn test_extract_keeps_duplicates() {
        let found = extract_placeholders("{org} vs {org:Acme}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].default_value, None);
        assert_eq!(found[1].default_value.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_fill_supplied_value() {
        assert_eq!(
            fill_template("Show members from {org}", &values(&[("org", "Acme")])),
            "Show members from Acme"
        );
    }

    #[test]
    fn test_fill_falls_back_to_default() {
        assert_eq!(
            fill_template("Find {count:10} items", &HashMap::new()),
            "Find 10 items"
        );
    }

    #[test]
    fn test_fill_value_overrides_default() {
        assert_eq!(
            fill_template("Find {count:10} items", &values(&[("count", "25")])),
            "Find 25 items"
        );
    }

    #[test]
    fn test_fill_missing_without_default_is_empty() {
        assert_eq!(fill_template("{missing} value", &HashMap::new()), " value");
    }

    #[test]
    fn test_fill_ignores_unknown_names() {
        assert_eq!(
            fill_template("Find {count:10} items", &values(&[("other", "x")])),
            "Find 10 items"
        );
    }

    #[test]
    fn test_fill_same_name_supplied_replaces_all() {
        assert_eq!(
            fill_template("{org:A} and {org:B}", &values(&[("org", "Acme")])),
            "Acme and Acme"
        );
    }

    #[test]
    fn test_fill_same_name_defaults_resolve_per_token() {
        assert_eq!(
            fill_template("{org:A} and {org:B}", &HashMap::new()),
            "A and B"
        );
    }

    #[test]
    fn test_fill_empty_value_is_kept_empty() {
        assert_eq!(
            fill_template("Find {count:10} items", &values(&[("count", "")])),
            "Find  items"
        );
    }

    #[test]
    fn test_fill_inserted_value_not_matched_by_other_key() {
        let vals = values(&[("a", "{b}"), ("b", "B")]);
        // The inserted "{b}" is only seen by the default pass, which has no default for it
        assert_eq!(fill_template("{a}-{b}", &vals), "-B");
    }

    #[test]
    fn test_fill_inserted_token_resolves_to_its_default() {
        assert_eq!(
            fill_template("{a}", &values(&[("a", "{x:dflt}")])),
            "dflt"
        );
    }

    #[test]
    fn test_fill_malformed_tokens_pass_through() {
        assert_eq!(
            fill_template("Unmatched { brace and {} and {a{b}", &values(&[("b", "B")])),
            "Unmatched { brace and {} and {aB"
        );
    }

    #[test]
    fn test_fill_without_placeholders_is_identity() {
        let text = "SELECT * FROM members WHERE {} = 1";
        assert_eq!(fill_template(text, &values(&[("x", "1")])), text);
    }

    #[test]
    fn test_fill_leaves_no_extracted_tokens() {
        let template = "Find {count:10} items in {org:Acme} since {date}";
        let vals: HashMap<_, _> = extract_placeholders(template)
            .into_iter()
            .map(|p| (p.name, "v".to_string()))
            .collect();
        let filled = fill_template(template, &vals);
        assert_eq!(filled, "Find v items in v since v");
        assert!(extract_placeholders(&filled).is_empty());
    }

    #[test]
    fn test_initial_values_use_defaults() {
        let found = extract_placeholders("{count:10} {org} {count:20}");
        let init = initial_values(&found);
        assert_eq!(init.get("count").map(String::as_str), Some("20"));
        assert_eq!(init.get("org").map(String::as_str), Some(""));
    }

    #[test]
    fn test_placeholder_serializes_like_ui_record() {
        let json = serde_json::to_string(&Placeholder::new("count", Some("10".into()))).unwrap();
        assert_eq!(json, r#"{"name":"count","defaultValue":"10","type":"text"}"#);
    }
}
