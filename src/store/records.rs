//! Records kept by the local store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template::{extract_placeholders, Placeholder, TemplateExecution};

/// Category given to templates saved without one
pub const DEFAULT_CATEGORY: &str = "general";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A named question kept for re-use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub id: String,
    pub name: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl SavedQuery {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            query: query.into(),
            created_at: Utc::now(),
            last_run: None,
        }
    }
}

/// One executed question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryItem {
    pub id: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// Id the query API assigned to the execution, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

impl QueryHistoryItem {
    pub fn new(query: impl Into<String>, success: bool) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            timestamp: Utc::now(),
            success,
            query_id: None,
        }
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }
}

/// A query with placeholders, filled in before it is run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTemplate {
    pub id: String,
    pub name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl QueryTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            template: template.into(),
            category: Some(DEFAULT_CATEGORY.to_string()),
            created_at: Utc::now(),
            last_used: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn placeholders(&self) -> Vec<Placeholder> {
        extract_placeholders(&self.template)
    }

    /// Start filling in this template's placeholders
    pub fn execution(&self) -> TemplateExecution {
        TemplateExecution::new(self.template.as_str())
    }
}
