//! Ask E9Y CLI
//!
//! Usage:
//!   ask-e9y [OPTIONS] <COMMAND>
//!
//! Commands:
//!   extract   List the placeholders of a template
//!   fill      Fill a template with values
//!   template  Manage and run stored templates
//!   saved     Manage and run saved queries
//!   history   Show or edit the query history
//!   analyze   Show metrics for recorded prompts
//!   compare   Compare two recorded prompts

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ask_e9y::analysis::{self, render_diff};
use ask_e9y::template::placeholder_report;
use ask_e9y::{
    add_template, edit_template, extract_placeholders, fill_template, open_store,
    parse_assignments, remove_history_item, run_saved_query, run_template, Config, Error,
    QueryTemplate, Result, SavedQuery, TemplateEdit,
};

#[derive(Parser)]
#[command(name = "ask-e9y")]
#[command(about = "Query templates, saved queries and prompt analysis for Ask E9Y")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved queries, history and templates
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the placeholders of a template
    Extract {
        template: String,
        /// Show the template with each placeholder annotated
        #[arg(short, long)]
        report: bool,
    },

    /// Fill a template with values
    Fill {
        template: String,
        /// Placeholder value as name=value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Manage and run stored templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Manage and run saved queries
    #[command(subcommand)]
    Saved(SavedCommand),

    /// Show or edit the query history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Show metrics for recorded prompts (JSON array file)
    Analyze { prompts: PathBuf },

    /// Compare two recorded prompts by query id
    Compare {
        prompts: PathBuf,
        first: String,
        second: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Store a new template
    Add {
        #[arg(short, long)]
        name: String,
        /// Defaults to "general"
        #[arg(long)]
        category: Option<String>,
        template: String,
    },
    /// Change a stored template (by id or name), keeping its id
    Edit {
        template: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// New template text
        #[arg(long)]
        text: Option<String>,
    },
    /// List stored templates
    List,
    /// Delete a template by id
    Remove { id: String },
    /// Fill a template (by id or name) and print the resulting query
    Run {
        template: String,
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SavedCommand {
    /// Save a query
    Add {
        #[arg(short, long)]
        name: String,
        query: String,
    },
    /// List saved queries
    List,
    /// Delete a saved query by id
    Remove { id: String },
    /// Print a saved query and record the run
    Run { id: String },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List history, most recent first
    List,
    /// Delete all history
    Clear,
    /// Delete one history item by id
    Remove { id: String },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    log::debug!("using data dir {}", config.data_dir.display());

    match cli.command {
        Command::Extract { template, report } => {
            if report {
                let report =
                    placeholder_report(&template, "template", true).map_err(Error::Report)?;
                print!("{}", report);
            } else {
                for p in extract_placeholders(&template) {
                    match p.default_value {
                        Some(default) => println!("{}\t{}\tdefault: {}", p.name, p.kind, default),
                        None => println!("{}\t{}", p.name, p.kind),
                    }
                }
            }
        }
        Command::Fill { template, set } => {
            let values = parse_assignments(&set)?;
            println!("{}", fill_template(&template, &values));
        }
        Command::Template(cmd) => run_template_command(&config, cmd)?,
        Command::Saved(cmd) => run_saved_command(&config, cmd)?,
        Command::History(cmd) => run_history_command(&config, cmd)?,
        Command::Analyze { prompts } => {
            let records = analysis::load_records(&prompts)?;
            println!("query     tokens  tables  schema  time_ms");
            for point in analysis::chart_series(&records) {
                println!(
                    "{:<8}  {:>6}  {:>6}  {:>6}  {:>7.2}",
                    point.query_id,
                    point.token_count,
                    point.table_count,
                    point.schema_size,
                    point.response_time
                );
            }
        }
        Command::Compare {
            prompts,
            first,
            second,
        } => {
            let records = analysis::load_records(&prompts)?;
            let a = analysis::find_record(&records, &first)?;
            let b = analysis::find_record(&records, &second)?;
            let cmp = analysis::compare(a, b);
            println!(
                "tokens: {:+} ({})",
                cmp.tokens.value,
                cmp.tokens.percent_display()
            );
            println!(
                "tables: {:+} ({})",
                cmp.tables.value,
                cmp.tables.percent_display()
            );
            println!(
                "time:   {:+.2} ms ({})",
                cmp.time_ms.value,
                cmp.time_ms.percent_display()
            );
            println!(
                "{} sections removed, {} sections added, {} sections unchanged",
                cmp.summary.removed, cmp.summary.added, cmp.summary.unchanged
            );
            print!("{}", render_diff(&cmp.changes));
        }
    }
    Ok(())
}

fn run_template_command(config: &Config, cmd: TemplateCommand) -> Result<()> {
    let store = open_store(config)?;
    match cmd {
        TemplateCommand::Add {
            name,
            category,
            template,
        } => {
            let mut tpl = QueryTemplate::new(name, template);
            if let Some(category) = category {
                tpl = tpl.with_category(category);
            }
            print_template_summary(&add_template(&store, tpl)?);
        }
        TemplateCommand::Edit {
            template,
            name,
            category,
            text,
        } => {
            let edit = TemplateEdit {
                name,
                category,
                template: text,
            };
            print_template_summary(&edit_template(&store, &template, edit)?);
        }
        TemplateCommand::List => {
            for tpl in store.templates()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    tpl.id,
                    tpl.name,
                    tpl.category.as_deref().unwrap_or("-"),
                    tpl.template
                );
            }
        }
        TemplateCommand::Remove { id } => {
            if !store.delete_template(&id)? {
                return Err(Error::TemplateNotFound(id));
            }
        }
        TemplateCommand::Run { template, set } => {
            let values = parse_assignments(&set)?;
            println!("{}", run_template(&store, &template, &values)?);
        }
    }
    Ok(())
}

fn print_template_summary(tpl: &QueryTemplate) {
    println!("{}", tpl.id);
    let names: Vec<_> = tpl.placeholders().into_iter().map(|p| p.name).collect();
    if !names.is_empty() {
        println!("placeholders: {}", names.join(", "));
    }
}

fn run_saved_command(config: &Config, cmd: SavedCommand) -> Result<()> {
    let store = open_store(config)?;
    match cmd {
        SavedCommand::Add { name, query } => {
            let saved = SavedQuery::new(name, query);
            println!("{}", saved.id);
            store.save_query(saved)?;
        }
        SavedCommand::List => {
            for q in store.saved_queries()? {
                let last_run = q
                    .last_run
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!("{}\t{}\t{}\t{}", q.id, q.name, last_run, q.query);
            }
        }
        SavedCommand::Remove { id } => {
            if !store.delete_saved_query(&id)? {
                return Err(Error::QueryNotFound(id));
            }
        }
        SavedCommand::Run { id } => println!("{}", run_saved_query(&store, &id)?),
    }
    Ok(())
}

fn run_history_command(config: &Config, cmd: HistoryCommand) -> Result<()> {
    let store = open_store(config)?;
    match cmd {
        HistoryCommand::List => {
            for h in store.history()? {
                let status = if h.success { "ok" } else { "failed" };
                println!("{}\t{}\t{}\t{}", h.id, h.timestamp.to_rfc3339(), status, h.query);
            }
        }
        HistoryCommand::Clear => store.clear_history()?,
        HistoryCommand::Remove { id } => remove_history_item(&store, &id)?,
    }
    Ok(())
}
