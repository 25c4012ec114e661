//! Ask E9Y - query templates, local records and prompt analysis
//!
//! This library holds the non-visual core of the Ask E9Y chat client: the
//! placeholder engine used to author and run query templates, a small JSON
//! store for saved queries, history and templates, and the helpers behind
//! the prompt analysis dashboard.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use ask_e9y::{extract_placeholders, fill_template};
//!
//! let template = "Find {count:10} items in {org:Acme}";
//! assert_eq!(extract_placeholders(template).len(), 2);
//!
//! let values = HashMap::from([("org".to_string(), "Globex".to_string())]);
//! assert_eq!(fill_template(template, &values), "Find 10 items in Globex");
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod store;
pub mod template;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{QueryHistoryItem, QueryTemplate, SavedQuery, Store, DEFAULT_CATEGORY};
pub use template::{extract_placeholders, fill_template, Placeholder, TemplateExecution};

use std::collections::HashMap;

/// Parse `name=value` assignments into a value map
///
/// The value may itself contain `=`; later assignments to the same name win.
///
/// ```rust
/// let values = ask_e9y::parse_assignments(["org=Acme", "filter=a=b"]).unwrap();
/// assert_eq!(values["org"], "Acme");
/// assert_eq!(values["filter"], "a=b");
/// ```
pub fn parse_assignments<I, S>(assignments: I) -> Result<HashMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assignments
        .into_iter()
        .map(|a| {
            let a = a.as_ref();
            match a.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    Ok((name.to_string(), value.to_string()))
                }
                _ => Err(Error::InvalidAssignment(a.to_string())),
            }
        })
        .collect()
}

/// Open the store described by a configuration
pub fn open_store(config: &Config) -> Result<Store> {
    Ok(Store::open(&config.data_dir)?.with_max_history(config.max_history))
}

/// Changes to a stored template; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateEdit {
    pub name: Option<String>,
    pub category: Option<String>,
    pub template: Option<String>,
}

/// Reject templates without a name or text; fill in the default category
fn checked_template(mut template: QueryTemplate) -> Result<QueryTemplate> {
    if template.name.is_empty() {
        return Err(Error::EmptyTemplateField("name"));
    }
    if template.template.is_empty() {
        return Err(Error::EmptyTemplateField("text"));
    }
    if template.category.as_deref().map_or(true, str::is_empty) {
        template.category = Some(DEFAULT_CATEGORY.to_string());
    }
    Ok(template)
}

/// Validate and store a new template
pub fn add_template(store: &Store, template: QueryTemplate) -> Result<QueryTemplate> {
    let template = checked_template(template)?;
    store.save_template(template.clone())?;
    log::info!("added template '{}'", template.name);
    Ok(template)
}

/// Apply `edit` to the template with id or name `key`
///
/// The template keeps its id, creation time and last-used time.
pub fn edit_template(store: &Store, key: &str, edit: TemplateEdit) -> Result<QueryTemplate> {
    let mut template = store
        .find_template(key)?
        .ok_or_else(|| Error::TemplateNotFound(key.to_string()))?;

    if let Some(name) = edit.name {
        template.name = name;
    }
    if let Some(category) = edit.category {
        template.category = Some(category);
    }
    if let Some(text) = edit.template {
        template.template = text;
    }

    let template = checked_template(template)?;
    store.save_template(template.clone())?;
    log::info!("updated template '{}'", template.name);
    Ok(template)
}

/// Fill a stored template and record the run
///
/// Values start from the template's defaults and are overridden by
/// `values`. The template's last-used time is updated and a successful
/// history entry is added for the resulting query, which is returned.
pub fn run_template(store: &Store, key: &str, values: &HashMap<String, String>) -> Result<String> {
    let template = store
        .find_template(key)?
        .ok_or_else(|| Error::TemplateNotFound(key.to_string()))?;

    let query = template
        .execution()
        .with_values(values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .preview();

    store.touch_template(&template.id)?;
    store.add_to_history(QueryHistoryItem::new(query.as_str(), true))?;
    log::info!("ran template '{}'", template.name);
    Ok(query)
}

/// Run a saved query: update its last-run time and record it in history
pub fn run_saved_query(store: &Store, id: &str) -> Result<String> {
    let saved = store
        .touch_saved_query(id)?
        .ok_or_else(|| Error::QueryNotFound(id.to_string()))?;
    store.add_to_history(QueryHistoryItem::new(saved.query.as_str(), true))?;
    log::info!("ran saved query '{}'", saved.name);
    Ok(saved.query)
}

/// Delete one history item, failing when no item has that id
pub fn remove_history_item(store: &Store, id: &str) -> Result<()> {
    if store.remove_from_history(id)? {
        Ok(())
    } else {
        Err(Error::HistoryItemNotFound(id.to_string()))
    }
}
