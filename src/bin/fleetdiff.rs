//! fleetdiff CLI
//!
//! Compares device configuration documents and validates drafts before they
//! are written.
//!
//! Usage:
//!   fleetdiff compare --section firewall_rules fw-1.json fw-2.json fw-3.json
//!   fleetdiff check --section dns --draft draft.json --original current.json
//!   fleetdiff drift --section full baseline.json latest.json
//!   fleetdiff --help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use fleetdiff::loader::{extract_section, load_columns, load_document, load_snapshot_dir};
use fleetdiff::{
    apply_patch, detect_drift, diff, render_text_diff, ComparisonTable, ConfigValue, EngineConfig,
    OutputFormat, MISSING,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleetdiff")]
#[command(about = "Compare and validate network device configurations")]
struct Cli {
    /// Path to a config file (fleetdiff.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare one section across several documents side by side
    Compare {
        /// Section name
        #[arg(short, long)]
        section: String,
        /// Documents to compare, one column each
        paths: Vec<PathBuf>,
        /// Load every .json file in this directory instead
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Documents are full snapshots; pick the section out of each
        #[arg(long)]
        full: bool,
        /// Only print rows that differ
        #[arg(long)]
        only_diff: bool,
    },

    /// Validate a draft before writing it
    Check {
        /// Section name
        #[arg(short, long)]
        section: String,
        /// Draft document
        #[arg(short, long)]
        draft: PathBuf,
        /// Current document to diff against
        #[arg(short, long)]
        original: Option<PathBuf>,
    },

    /// Structural diff between two documents
    Diff {
        original: PathBuf,
        draft: PathBuf,
        /// Show a line diff instead of change entries
        #[arg(long)]
        lines: bool,
    },

    /// Compare a snapshot against its baseline
    Drift {
        /// Section name ("full" compares whole snapshots)
        #[arg(short, long, default_value = "full")]
        section: String,
        baseline: PathBuf,
        latest: PathBuf,
    },

    /// Preview the result of applying a patch
    Merge { base: PathBuf, patch: PathBuf },

    /// Show or write the effective configuration
    Config {
        /// Write the configuration to this path instead of printing it
        #[arg(long)]
        init: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = EngineConfig::load_from(cli.config.as_deref())?;
    let json = cli.format == Format::Json;

    match cli.command {
        Commands::Compare {
            section,
            paths,
            dir,
            full,
            only_diff,
        } => {
            let picked = full.then_some(section.as_str());
            let columns = match dir {
                Some(dir) => load_snapshot_dir(&dir, picked)?,
                None => load_columns(&paths, picked),
            };
            if columns.is_empty() {
                return Err("No documents to compare".into());
            }

            let table = config.alignment_builder().compare_section(&section, &columns);
            if json {
                print_json(&table, config.output.format)?;
            } else {
                print_table(&table, only_diff);
            }
            Ok(0)
        }

        Commands::Check {
            section,
            draft,
            original,
        } => {
            let draft_text = std::fs::read_to_string(&draft)?;
            let original = original.map(|p| load_document(&p)).transpose()?;
            let result = config.validator().check(&section, &draft_text, original.as_ref());

            if json {
                print_json(&result, config.output.format)?;
            } else {
                println!("🔍 Checking draft for '{}'\n", section);
                for error in &result.errors {
                    println!("   ❌ {}", error);
                }
                for warning in &result.warnings {
                    println!("   ⚠️  {}", warning);
                }
                for change in &result.changes {
                    println!("   {}", change.describe());
                }
                println!("\n{}", result.summary());
            }
            Ok(if result.ok { 0 } else { 1 })
        }

        Commands::Diff {
            original,
            draft,
            lines,
        } => {
            let before = load_document(&original)?;
            let after = load_document(&draft)?;
            if lines {
                print!("{}", render_text_diff(&before, &after));
            } else {
                let changes = diff(&before, &after);
                if json {
                    print_json(&changes, config.output.format)?;
                } else if changes.is_empty() {
                    println!("✅ No differences");
                } else {
                    for change in &changes {
                        println!("{}", change.describe());
                    }
                }
            }
            Ok(0)
        }

        Commands::Drift {
            section,
            baseline,
            latest,
        } => {
            let baseline = load_section(&baseline, &section)?;
            let latest = load_section(&latest, &section)?;
            let report = detect_drift(&section, &baseline, &latest);

            if json {
                print_json(&report, config.output.format)?;
            } else if report.drifted {
                println!(
                    "⚠️  Drift detected in '{}' ({} → {})",
                    section,
                    report.baseline_checksum.short(),
                    report.latest_checksum.short()
                );
                for change in &report.changes {
                    println!("   {}", change.describe());
                }
            } else {
                println!("✅ No drift detected in '{}'", section);
            }
            Ok(if report.drifted { 2 } else { 0 })
        }

        Commands::Merge { base, patch } => {
            let base = load_document(&base)?;
            let patch = load_document(&patch)?;
            print_json(&apply_patch(&base, &patch), config.output.format)?;
            Ok(0)
        }

        Commands::Config { init } => {
            match init {
                Some(path) => {
                    config.save(&path)?;
                    println!("✅ Wrote configuration to {}", path);
                }
                None => println!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(0)
        }
    }
}

/// Load a document and narrow it to one section, unless the section is "full"
fn load_section(path: &Path, section: &str) -> Result<ConfigValue, Box<dyn std::error::Error>> {
    let doc = load_document(path)?;
    if section == "full" {
        return Ok(doc);
    }
    extract_section(&doc, section)
        .ok_or_else(|| format!("Section '{}' not found in {}", section, path.display()).into())
}

fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), serde_json::Error> {
    let out = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    println!("{}", out);
    Ok(())
}

fn print_table(table: &ComparisonTable, only_diff: bool) {
    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|r| !only_diff || r.differs)
        .collect();

    let label_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once("Field".len()))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, id)| {
            rows.iter()
                .map(|r| r.values[i].as_deref().unwrap_or(MISSING).chars().count())
                .chain(std::iter::once(id.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    print!("  {:<width$}", "Field", width = label_width);
    for (id, width) in table.columns.iter().zip(&widths) {
        print!(" │ {:<width$}", id, width = *width);
    }
    println!();

    for row in &rows {
        let marker = if row.differs { "≠" } else { " " };
        print!("{} {:<width$}", marker, row.label, width = label_width);
        for (value, width) in row.values.iter().zip(&widths) {
            print!(" │ {:<width$}", value.as_deref().unwrap_or(MISSING), width = *width);
        }
        println!();
    }

    let differing = table.differing_rows().count();
    println!("\n{} rows, {} differ", rows.len(), differing);
}
