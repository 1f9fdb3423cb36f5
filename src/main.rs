mod acts;
mod cleanup;
mod config;
mod document;
mod error;
mod fields;
mod lexer;
mod matcher;
mod merge;
mod parser;
mod pipeline;
mod splitter;
mod stats;
mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use violation_types::ViolationDatabase;

use config::ImportConfig;
use parser::{OffenceParser, ParseReport};

#[derive(Parser)]
#[command(
    name = "cvor_import",
    about = "Import the CVOR offence table into the violation knowledge base"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the offence table → parsed-cvor.json
    Parse {
        /// Raw offence table, one offence per line
        input: PathBuf,
        /// Where to write the parsed records
        #[arg(long, default_value = config::DEFAULT_PARSED_OUTPUT)]
        out: PathBuf,
        /// Highest single letter read as part of an offence code (default J)
        #[arg(long)]
        last_clause_letter: Option<char>,
    },
    /// Parse the offence table and merge it into the knowledge base
    Merge {
        input: PathBuf,
        /// Host document holding the knowledge base [env: CVOR_DB_PATH]
        #[arg(long)]
        db: Option<PathBuf>,
        /// Text preceding the database literal [env: CVOR_MARKER]
        #[arg(long)]
        marker: Option<String>,
        /// Catch-all category for offences with no existing item
        #[arg(long)]
        category: Option<String>,
        /// Run everything and print the summary, but write nothing
        #[arg(long)]
        dry_run: bool,
        /// Also write the parsed records here
        #[arg(long)]
        parsed_out: Option<PathBuf>,
        #[arg(long)]
        last_clause_letter: Option<char>,
    },
    /// Remove items added by earlier bulk imports
    Cleanup {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        marker: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Parse {
            input,
            out,
            last_clause_letter,
        }) => {
            let config = ImportConfig::from_env().with_last_clause_letter(last_clause_letter);
            run_parse(&input, &out, &config)
        }
        Some(Command::Merge {
            input,
            db,
            marker,
            category,
            dry_run,
            parsed_out,
            last_clause_letter,
        }) => {
            let db = require_db_path(db)?;
            let config = ImportConfig::from_env()
                .with_overrides(marker, category)
                .with_last_clause_letter(last_clause_letter);
            run_merge(&input, &db, &config, dry_run, parsed_out.as_deref())
        }
        Some(Command::Cleanup { db, marker }) => {
            let db = require_db_path(db)?;
            let config = ImportConfig::from_env().with_overrides(marker, None);
            run_cleanup(&db, &config.marker)
        }
        // Default: parse the table in the current directory
        None => run_parse(
            Path::new(config::DEFAULT_INPUT),
            Path::new(config::DEFAULT_PARSED_OUTPUT),
            &ImportConfig::from_env(),
        ),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();
}

fn require_db_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match config::db_path(flag) {
        Some(path) => Ok(path),
        None => bail!("no database given: pass --db or set {}", config::DB_PATH_ENV),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data).context("JSON serialization failed")?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

fn read_table(path: &Path) -> anyhow::Result<String> {
    document::read_text(path).context("cannot read the offence table")
}

// ═══════════════════════════════════════════════════════════════════════
//  PARSE MODE: offence table → parsed-cvor.json
// ═══════════════════════════════════════════════════════════════════════

fn run_parse(input: &Path, out: &Path, config: &ImportConfig) -> anyhow::Result<()> {
    eprintln!("Parsing offence table: {}", input.display());
    let table = read_table(input)?;
    let report = OffenceParser::with_rule(config.code_rule()).parse_text(&table);

    print_parse_report(&report);

    eprintln!("\nWriting output:");
    write_json(out, &report.records)
}

fn print_parse_report(report: &ParseReport) {
    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  PARSE SUMMARY");
    eprintln!("══════════════════════════════════════════");
    eprintln!("  Parsed:             {}", report.records.len());
    eprintln!("  Skipped:            {}", report.skipped.len());
    eprintln!("  Header/blank:       {}", report.ignored);
    eprintln!("  Missing ALT fixed:  {}", report.shifted);
    eprintln!("  Empty description:  {}", report.empty_descriptions);

    if !report.skipped.is_empty() {
        eprintln!("\nSkipped lines:");
        for s in &report.skipped {
            eprintln!("  {:>5}: {} ({})", s.line_number, s.text, s.reason);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  MERGE MODE: offence table → knowledge base
// ═══════════════════════════════════════════════════════════════════════

fn run_merge(
    input: &Path,
    db_path: &Path,
    config: &ImportConfig,
    dry_run: bool,
    parsed_out: Option<&Path>,
) -> anyhow::Result<()> {
    eprintln!("Parsing offence table: {}", input.display());
    let table = read_table(input)?;
    let document = document::read_text(db_path).context("cannot read the knowledge base")?;

    let outcome = pipeline::import_into(document, &table, config)
        .with_context(|| format!("import into {} failed", db_path.display()))?;

    print_parse_report(&outcome.report);

    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  MERGE SUMMARY");
    eprintln!("══════════════════════════════════════════");
    eprintln!("  Matched existing:   {}", outcome.summary.matched);
    eprintln!("  Added new:          {}", outcome.summary.added);
    print_category_table(&outcome.database);

    if let Some(path) = parsed_out {
        eprintln!("\nWriting parsed records:");
        write_json(path, &outcome.report.records)?;
    }

    if dry_run {
        info!("dry run: {} left unchanged", db_path.display());
        return Ok(());
    }

    document::write_atomic(db_path, &outcome.rendered)?;
    info!(
        path = %db_path.display(),
        total = outcome.overall.total_violations,
        "knowledge base updated"
    );
    Ok(())
}

fn print_category_table(db: &ViolationDatabase) {
    eprintln!(
        "\n  {:<28} {:>6} {:>6} {:>6} {:>6}",
        "Category", "Total", "High", "Mod", "Low"
    );
    for c in &db.categories {
        let s = c.stats;
        eprintln!(
            "  {:<28} {:>6} {:>6} {:>6} {:>6}",
            c.key, s.total, s.high_risk, s.moderate_risk, s.lower_risk
        );
    }
    if let Some(o) = db.overall_stats {
        eprintln!(
            "  {:<28} {:>6} {:>6} {:>6} {:>6}",
            "(all)", o.total_violations, o.high_risk, o.moderate_risk, o.lower_risk
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  CLEANUP MODE: strip earlier bulk imports
// ═══════════════════════════════════════════════════════════════════════

fn run_cleanup(db_path: &Path, marker: &str) -> anyhow::Result<()> {
    let document = document::read_text(db_path).context("cannot read the knowledge base")?;
    let outcome = pipeline::cleanup(document, marker)
        .with_context(|| format!("cleanup of {} failed", db_path.display()))?;

    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  CLEANUP SUMMARY");
    eprintln!("══════════════════════════════════════════");
    for (key, removed) in &outcome.summary.removed {
        eprintln!("  {key}: removed {removed} entries");
    }
    eprintln!("  Total removed:      {}", outcome.summary.total_removed());
    eprintln!("  Enforcement reset:  {}", outcome.summary.repaired);
    print_category_table(&outcome.database);

    document::write_atomic(db_path, &outcome.rendered)?;
    info!(
        path = %db_path.display(),
        total = outcome.overall.total_violations,
        "knowledge base cleaned"
    );
    Ok(())
}
