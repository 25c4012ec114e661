//! Value editing and preview for running a template

use std::collections::HashMap;

use super::placeholder::{extract_placeholders, fill_template, initial_values, Placeholder};

/// A template being prepared for execution
///
/// Placeholders are extracted once on creation and every value starts at its
/// declared default. `preview` is recomputed from the current values on each
/// call, so it always reflects the latest edits.
#[derive(Debug, Clone)]
pub struct TemplateExecution {
    template: String,
    placeholders: Vec<Placeholder>,
    values: HashMap<String, String>,
}

impl TemplateExecution {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let placeholders = extract_placeholders(&template);
        let values = initial_values(&placeholders);
        Self {
            template,
            placeholders,
            values,
        }
    }

    /// Apply several values at once
    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in values {
            self.set(name, value);
        }
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Current value for a placeholder name
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set the value for a placeholder name
    ///
    /// Names that do not occur in the template are accepted and have no
    /// effect on the output.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// The query text produced by the current values
    pub fn preview(&self) -> String {
        fill_template(&self.template, &self.values)
    }
}
