//! evalstore - inspect and maintain recorded evaluation runs
//!
//! ## Commands
//!
//! - `list`: Show every recorded run
//! - `show`: Print one run as JSON
//! - `label` / `delete`: Relabel or remove a run
//! - `diff`: Compare the agent configs captured by two runs
//! - `migrate` / `migration-info`: Legacy baseline migration
//! - `capture`: Print the ambient agent config for this project

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evalstore_core::obs::{emit_run_added, emit_run_deleted};
use evalstore_core::{
    capture_agent_config, diff_runs, render_config_diff, FsAmbientSource, FsRunStore, Migrator,
    Run, RunStore, StoreLayout,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "evalstore")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recorded agent evaluation runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Project root the store belongs to
    #[arg(long, global = true, env = "EVALSTORE_PROJECT", default_value = ".")]
    project: PathBuf,

    /// Data directory, relative to the project root
    #[arg(long, global = true, env = "EVALSTORE_DATA_DIR", default_value = ".evalstore")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recorded runs, oldest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a run (id, label or unique id prefix)
    Show { reference: String },

    /// Delete a run
    Delete { reference: String },

    /// Set a run's label
    Label { reference: String, label: String },

    /// Diff the agent configs of two runs
    Diff {
        run_a: String,
        run_b: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Migrate legacy baselines.json into the run store
    Migrate,

    /// Report whether a legacy migration is pending
    MigrationInfo,

    /// Print the ambient agent config captured for this project
    Capture {
        /// Agent name to record
        #[arg(long, default_value = "claude-code")]
        name: String,

        /// Agent build version, if known
        #[arg(long)]
        agent_version: Option<String>,
    },
}

/// Resolved project root plus the store that backs it.
struct Workspace {
    root: PathBuf,
    store: FsRunStore,
}

impl Workspace {
    /// The root is made absolute so it identifies the project in `repoPath`
    /// and matches the absolute keys of per-project agent config.
    fn new(root: PathBuf, data_dir: PathBuf) -> Result<Self> {
        let root = std::path::absolute(&root)
            .with_context(|| format!("Failed to resolve project root {:?}", root))?;
        Ok(Self {
            root,
            store: FsRunStore::new(StoreLayout::new(data_dir)),
        })
    }

    fn migrator(&self) -> Migrator {
        Migrator::new(self.store.clone())
    }

    fn load(&self) -> Result<RunStore> {
        Ok(self.store.load(&self.root)?)
    }

    fn save(&self, store: &RunStore) -> Result<()> {
        self.store
            .save(&self.root, store)
            .with_context(|| format!("Failed to write {:?}", self.store.store_path(&self.root)))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    evalstore_core::init_tracing(cli.log_json, level);

    let ws = Workspace::new(cli.project, cli.data_dir)?;

    if !matches!(cli.command, Commands::Migrate | Commands::MigrationInfo) {
        ws.migrator()
            .perform_migration(&ws.root)
            .context("Legacy baseline migration failed")?;
    }

    match cli.command {
        Commands::List { json } => cmd_list(&ws, json),
        Commands::Show { reference } => cmd_show(&ws, &reference),
        Commands::Delete { reference } => cmd_delete(&ws, &reference),
        Commands::Label { reference, label } => cmd_label(&ws, &reference, &label),
        Commands::Diff { run_a, run_b, json } => cmd_diff(&ws, &run_a, &run_b, json),
        Commands::Migrate => cmd_migrate(&ws),
        Commands::MigrationInfo => cmd_migration_info(&ws),
        Commands::Capture {
            name,
            agent_version,
        } => cmd_capture(&ws.root, &name, agent_version),
    }
}

fn cmd_list(ws: &Workspace, json: bool) -> Result<()> {
    let store = ws.load()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&store.list())?);
        return Ok(());
    }
    if store.count() == 0 {
        println!("No runs recorded yet.");
        return Ok(());
    }
    println!("{}", render_run_table(&store.list()));
    Ok(())
}

fn cmd_show(ws: &Workspace, reference: &str) -> Result<()> {
    let store = ws.load()?;
    let run = store.resolve(reference)?;
    println!("{}", serde_json::to_string_pretty(run)?);
    Ok(())
}

fn cmd_delete(ws: &Workspace, reference: &str) -> Result<()> {
    let mut store = ws.load()?;
    let id = store.resolve_id(reference)?;
    store.delete_run(&id);
    ws.save(&store)?;
    emit_run_deleted(&id);
    println!("Deleted run {}", id);
    Ok(())
}

fn cmd_label(ws: &Workspace, reference: &str, label: &str) -> Result<()> {
    let mut store = ws.load()?;
    let mut run: Run = store.resolve(reference)?.clone();
    run.label = Some(label.to_string());
    let (id, cases) = (run.id.clone(), run.case_count());
    store.add_run(run);
    ws.save(&store)?;
    emit_run_added(&id, cases);
    println!("Labelled {} as '{}'", id, label);
    Ok(())
}

fn cmd_diff(ws: &Workspace, run_a: &str, run_b: &str, json: bool) -> Result<()> {
    let store = ws.load()?;
    let a = store.resolve(run_a)?;
    let b = store.resolve(run_b)?;
    let summary = diff_runs(a, b);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} -> {}", summary.run_a, summary.run_b);
        println!("{}", render_config_diff(&summary.changes));
    }
    Ok(())
}

fn cmd_migrate(ws: &Workspace) -> Result<()> {
    let migrator = ws.migrator();
    let info = migrator.migration_info(&ws.root);
    if migrator.perform_migration(&ws.root)? {
        info!(baselines = info.baseline_count, "legacy baselines migrated");
        println!(
            "Migrated {} baselines into {:?}",
            info.baseline_count,
            ws.store.store_path(&ws.root)
        );
    } else {
        println!("Nothing to migrate");
    }
    Ok(())
}

fn cmd_migration_info(ws: &Workspace) -> Result<()> {
    let info = ws.migrator().migration_info(&ws.root);
    println!("Needed:          {}", if info.needed { "yes" } else { "no" });
    println!("Baselines:       {}", info.baseline_count);
    println!(
        "Oldest baseline: {}",
        info.oldest_baseline.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn cmd_capture(root: &Path, name: &str, agent_version: Option<String>) -> Result<()> {
    let config = capture_agent_config(&FsAmbientSource::new(), root, name, agent_version);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn render_run_table(runs: &[&Run]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:<20} {:<14} {:<24} {:>5}  {}\n",
        "ID", "LABEL", "TYPE", "CREATED", "CASES", "MODEL"
    ));
    for run in runs {
        let run_type = run
            .run_type
            .and_then(|t| serde_json::to_value(t).ok())
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<28} {:<20} {:<14} {:<24} {:>5}  {}\n",
            run.id,
            truncate(run.label.as_deref().unwrap_or("-"), 20),
            run_type,
            run.created_at,
            run.case_count(),
            run.agent.model
        ));
    }
    out.trim_end().to_string()
}

/// Truncate a string for display
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
