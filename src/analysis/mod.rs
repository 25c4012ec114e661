//! Prompt analysis: metrics over recorded prompts and comparison of two prompts
//!
//! Prompt records are the system/user prompt pairs the query backend built
//! for each question, as exported by its recent-prompts endpoint.

mod diff;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use diff::{diff_lines, render_diff, Change, ChangeKind, DiffSummary};

/// Marker preceding each table description in a schema prompt
pub const TABLE_MARKER: &str = "Table: eligibility.";

/// Errors that can occur while loading or comparing prompt records
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read prompt records from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid prompt records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no prompt with query id '{0}'")]
    UnknownQuery(String),
}

/// A prompt the backend generated for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Missing for prompts the backend recorded before assigning an id
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub original_query: String,
    #[serde(default)]
    pub prompt_system: String,
    #[serde(default)]
    pub prompt_user: String,
    #[serde(default)]
    pub execution_time_ms: Option<f64>,
    #[serde(default)]
    pub schema_size: Option<u64>,
    #[serde(default)]
    pub token_usage: Option<HashMap<String, u64>>,
}

/// Derived metrics for a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptAnalysis {
    pub estimated_tokens: usize,
    pub schema_table_count: usize,
}

impl PromptRecord {
    pub fn analyze(&self) -> PromptAnalysis {
        PromptAnalysis {
            estimated_tokens: estimate_tokens(&self.prompt_system)
                + estimate_tokens(&self.prompt_user),
            schema_table_count: count_tables(&self.prompt_system),
        }
    }
}

/// Rough token estimate: one token per four characters, rounded up
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Number of tables described in a schema prompt
pub fn count_tables(schema: &str) -> usize {
    schema.matches(TABLE_MARKER).count()
}

/// Load prompt records from a JSON array file
pub fn load_records(path: &Path) -> Result<Vec<PromptRecord>, AnalysisError> {
    let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<PromptRecord> = serde_json::from_str(&content)?;
    log::debug!("loaded {} prompt records from {}", records.len(), path.display());
    Ok(records)
}

pub fn find_record<'a>(
    records: &'a [PromptRecord],
    query_id: &str,
) -> Result<&'a PromptRecord, AnalysisError> {
    records
        .iter()
        .find(|r| r.query_id.as_deref() == Some(query_id))
        .ok_or_else(|| AnalysisError::UnknownQuery(query_id.to_string()))
}

/// One point of the metrics-over-time charts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Shortened query id used as the axis label
    pub query_id: String,
    pub schema_size: u64,
    pub token_count: usize,
    pub response_time: f64,
    pub table_count: usize,
}

/// Chart points in chronological order
///
/// Records are expected newest first, as the backend returns them.
pub fn chart_series(records: &[PromptRecord]) -> Vec<ChartPoint> {
    records
        .iter()
        .rev()
        .map(|record| {
            let analysis = record.analyze();
            let label = record
                .query_id
                .as_deref()
                .map(|id| id.chars().take(8).collect::<String>())
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            ChartPoint {
                query_id: label,
                schema_size: record.schema_size.unwrap_or(0),
                token_count: analysis.estimated_tokens,
                response_time: record.execution_time_ms.unwrap_or(0.0),
                table_count: analysis.schema_table_count,
            }
        })
        .collect()
}

/// Difference of a metric between two prompts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    /// `second - first`
    pub value: f64,
    /// `value` relative to the first prompt, in percent; 0 when the first is 0
    pub percent: f64,
}

impl MetricDelta {
    pub fn between(first: f64, second: f64) -> Self {
        let value = second - first;
        let percent = if first == 0.0 {
            0.0
        } else {
            value / first * 100.0
        };
        Self { value, percent }
    }

    pub fn percent_display(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Side-by-side comparison of two prompts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub first: Option<String>,
    pub second: Option<String>,
    pub tokens: MetricDelta,
    pub tables: MetricDelta,
    pub time_ms: MetricDelta,
    /// Line diff of the system prompts
    pub changes: Vec<Change>,
    pub summary: DiffSummary,
}

/// Compare two prompts: metric deltas and a line diff of their system prompts
///
/// No diff is computed when either system prompt is empty.
pub fn compare(first: &PromptRecord, second: &PromptRecord) -> Comparison {
    let a = first.analyze();
    let b = second.analyze();

    let changes = if first.prompt_system.is_empty() || second.prompt_system.is_empty() {
        Vec::new()
    } else {
        diff_lines(&first.prompt_system, &second.prompt_system)
    };
    let summary = DiffSummary::from_changes(&changes);

    Comparison {
        first: first.query_id.clone(),
        second: second.query_id.clone(),
        tokens: MetricDelta::between(a.estimated_tokens as f64, b.estimated_tokens as f64),
        tables: MetricDelta::between(a.schema_table_count as f64, b.schema_table_count as f64),
        time_ms: MetricDelta::between(
            first.execution_time_ms.unwrap_or(0.0),
            second.execution_time_ms.unwrap_or(0.0),
        ),
        changes,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, system: &str, user: &str, time: Option<f64>) -> PromptRecord {
        PromptRecord {
            query_id: Some(id.to_string()),
            original_query: String::new(),
            prompt_system: system.to_string(),
            prompt_user: user.to_string(),
            execution_time_ms: time,
            schema_size: None,
            token_usage: None,
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn test_count_tables() {
        let schema = "Table: eligibility.members\ncols\nTable: eligibility.orgs\nTable: other.x\n";
        assert_eq!(count_tables(schema), 2);
        assert_eq!(count_tables(""), 0);
    }

    #[test]
    fn test_analyze_sums_both_prompts() {
        let r = record("q1", "Table: eligibility.a", "abcd", None);
        assert_eq!(
            r.analyze(),
            PromptAnalysis {
                estimated_tokens: 5 + 1,
                schema_table_count: 1,
            }
        );
    }

    #[test]
    fn test_chart_series_is_chronological() {
        let records = vec![
            record("newest-query-id", "", "", Some(12.5)),
            record("", "", "", None),
        ];
        let series = chart_series(&records);
        assert_eq!(series[0].query_id, "unknown");
        assert_eq!(series[0].response_time, 0.0);
        assert_eq!(series[1].query_id, "newest-q");
        assert_eq!(series[1].response_time, 12.5);
    }

    #[test]
    fn test_metric_delta() {
        let d = MetricDelta::between(200.0, 250.0);
        assert_eq!(d.value, 50.0);
        assert_eq!(d.percent, 25.0);
        assert_eq!(d.percent_display(), "25.0%");
        assert_eq!(MetricDelta::between(0.0, 7.0).percent, 0.0);
    }

    #[test]
    fn test_compare() {
        let first = record(
            "q1",
            "Table: eligibility.a\nTable: eligibility.b\n",
            "",
            Some(100.0),
        );
        let second = record("q2", "Table: eligibility.a\n", "", Some(80.0));
        let cmp = compare(&first, &second);

        assert_eq!(cmp.tables.value, -1.0);
        assert_eq!(cmp.tables.percent, -50.0);
        assert_eq!(cmp.time_ms.value, -20.0);
        assert_eq!(
            cmp.summary,
            DiffSummary {
                removed: 1,
                added: 0,
                unchanged: 1,
            }
        );
    }

    #[test]
    fn test_compare_skips_diff_for_empty_prompt() {
        let cmp = compare(&record("a", "", "", None), &record("b", "x\n", "", None));
        assert!(cmp.changes.is_empty());
        assert_eq!(cmp.summary, DiffSummary::default());
    }

    #[test]
    fn test_find_record() {
        let records = vec![record("a", "", "", None)];
        assert!(find_record(&records, "a").is_ok());
        assert!(matches!(
            find_record(&records, "b"),
            Err(AnalysisError::UnknownQuery(id)) if id == "b"
        ));
    }

    #[test]
    fn test_records_without_query_id() {
        let json = r#"[
            {"query_id": null, "prompt_system": "Table: eligibility.a"},
            {"prompt_user": "how many?"},
            {"query_id": "abcdefghij"}
        ]"#;
        let records: Vec<PromptRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].query_id, None);
        assert_eq!(records[1].query_id, None);

        let labels: Vec<_> = chart_series(&records)
            .into_iter()
            .map(|p| p.query_id)
            .collect();
        assert_eq!(labels, vec!["abcdefgh", "unknown", "unknown"]);
        assert!(find_record(&records, "abcdefghij").is_ok());
    }

    #[test]
    fn test_records_parse_backend_json() {
        let json = r#"[{
            "query_id": "abc",
            "original_query": "how many members?",
            "prompt_system": "Table: eligibility.members",
            "prompt_user": "how many members?",
            "execution_time_ms": 41.5,
            "schema_size": 1200,
            "token_usage": {"prompt": 300}
        }]"#;
        let records: Vec<PromptRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].schema_size, Some(1200));
        assert_eq!(records[0].analyze().schema_table_count, 1);
    }
}
