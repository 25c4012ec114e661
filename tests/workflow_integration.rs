//! Integration tests for the store-backed workflows and prompt analysis

use std::path::Path;

use ask_e9y::analysis::{self, ChangeKind, DiffSummary};
use ask_e9y::{
    add_template, edit_template, open_store, parse_assignments, run_saved_query, run_template,
    Config, Error, QueryTemplate, SavedQuery, Store, TemplateEdit, DEFAULT_CATEGORY,
};
use tempfile::TempDir;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_template_lifecycle() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config::new().with_data_dir(dir.path()).with_max_history(2);
    let store = open_store(&config).expect("Should open store");

    let tpl = QueryTemplate::new("members by org", "Show {count:10} members from {org:Acme}")
        .with_category("members");
    store.save_template(tpl.clone()).expect("Should save");

    let names: Vec<_> = store.templates().unwrap()[0]
        .placeholders()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["count", "org"]);

    let q1 = run_template(&store, &tpl.id, &parse_assignments(["count=5"]).unwrap()).unwrap();
    let q2 = run_template(&store, "members by org", &Default::default()).unwrap();
    let q3 = run_template(&store, &tpl.id, &parse_assignments(["org=Globex"]).unwrap()).unwrap();
    assert_eq!(q1, "Show 5 members from Acme");
    assert_eq!(q2, "Show 10 members from Acme");
    assert_eq!(q3, "Show 10 members from Globex");

    // History holds only the two most recent runs, newest first
    let history: Vec<_> = store.history().unwrap().into_iter().map(|h| h.query).collect();
    assert_eq!(history, vec![q3, q2]);
}

#[test]
fn test_edited_template_runs_with_new_text() {
    let dir = TempDir::new().expect("tempdir");
    let store = Store::open(dir.path()).unwrap();
    let tpl = add_template(&store, QueryTemplate::new("orgs", "List {count:5} orgs"))
        .expect("Should add");
    assert_eq!(tpl.category.as_deref(), Some(DEFAULT_CATEGORY));

    let edit = TemplateEdit {
        name: Some("top orgs".to_string()),
        template: Some("Top {count:3} orgs by {metric:members}".to_string()),
        ..Default::default()
    };
    edit_template(&store, "orgs", edit).expect("Should edit");

    assert!(matches!(
        run_template(&store, "orgs", &Default::default()),
        Err(Error::TemplateNotFound(_))
    ));
    assert_eq!(
        run_template(&store, &tpl.id, &Default::default()).unwrap(),
        "Top 3 orgs by members"
    );
    let stored = Store::open(dir.path()).unwrap().templates().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "top orgs");
    assert_eq!(stored[0].created_at, tpl.created_at);
}

#[test]
fn test_store_files_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let saved = SavedQuery::new("active", "how many active members?");
    {
        let store = Store::open(dir.path()).unwrap();
        store.save_query(saved.clone()).unwrap();
    }

    let store = Store::open(dir.path()).unwrap();
    assert_eq!(store.saved_queries().unwrap(), vec![saved.clone()]);
    assert_eq!(run_saved_query(&store, &saved.id).unwrap(), saved.query);
    assert!(store.saved_queries().unwrap()[0].last_run.is_some());
}

#[test]
fn test_analyze_fixture() {
    let records = analysis::load_records(&fixture("prompts.json")).expect("Should load");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].analyze().schema_table_count, 3);

    let series = analysis::chart_series(&records);
    assert_eq!(series[0].query_id, "4b7a8c9d");
    assert_eq!(series[1].query_id, "9f1c2d3e");
    assert_eq!(series[1].schema_size, 2048);
}

#[test]
fn test_compare_fixture() {
    let records = analysis::load_records(&fixture("prompts.json")).unwrap();
    let older = analysis::find_record(&records, "4b7a8c9d-0000-4000-8000-000000000001").unwrap();
    let newer = analysis::find_record(&records, "9f1c2d3e-0000-4000-8000-000000000002").unwrap();
    let cmp = analysis::compare(older, newer);

    assert_eq!(cmp.tables.value, 1.0);
    assert_eq!(cmp.tables.percent_display(), "50.0%");
    assert_eq!(cmp.time_ms.value, 60.25);
    assert!(cmp.tokens.value > 0.0);

    let kinds: Vec<_> = cmp.changes.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChangeKind::Unchanged,
            ChangeKind::Removed,
            ChangeKind::Added,
            ChangeKind::Unchanged,
            ChangeKind::Added,
        ]
    );
    assert_eq!(
        cmp.summary,
        DiffSummary {
            removed: 1,
            added: 2,
            unchanged: 2,
        }
    );
}

#[test]
fn test_missing_prompt_file() {
    let result = analysis::load_records(Path::new("/nonexistent/prompts.json"));
    assert!(matches!(result, Err(analysis::AnalysisError::Io { .. })));
}
