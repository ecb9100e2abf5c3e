use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use lonn_data::{EntryFormat, parse_amount};
use rust_decimal::Decimal;

/// Salary tracker for recorded payslips ("lønnsslipper").
///
/// Keeps payslips in a local database, imports and exports them, and
/// estimates the year's income tax from an approximate bracket table.
/// Estimates are informational only.
#[derive(Debug, Parser)]
#[command(name = "lonn", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. They override `lonn.toml`.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to `lonn.toml` when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `lonn.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Database backend to use.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Log level or filter directive, e.g. `debug` or `lonn_data=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new payslip.
    Add(AddArgs),

    /// Show recorded payslips, newest first, with yearly totals.
    List {
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show a single payslip.
    Show { id: i64 },

    /// Change fields of a recorded payslip.
    Edit(EditArgs),

    /// Delete a payslip.
    Delete { id: i64 },

    /// Import payslips from a CSV or XML file.
    Import {
        file: PathBuf,

        /// File format; inferred from the extension when omitted.
        #[arg(short, long)]
        format: Option<EntryFormat>,
    },

    /// Export payslips to an XML file.
    Export {
        file: PathBuf,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Compare withheld tax against the estimate for one year.
    Report {
        /// Defaults to the most recent year with entries.
        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        schedule: Option<String>,
    },

    /// Estimate tax for a yearly gross income.
    Estimate {
        #[arg(value_parser = amount)]
        gross: Decimal,

        #[arg(short, long)]
        schedule: Option<String>,
    },

    /// List available tax schedules.
    Schedules,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Payment date (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,

    #[arg(long, value_parser = amount)]
    pub gross: Decimal,

    #[arg(long, value_parser = amount)]
    pub net: Decimal,

    #[arg(long, value_parser = amount)]
    pub withheld: Decimal,

    #[arg(short, long)]
    pub company: Option<String>,

    /// Payslip document the entry was read from.
    #[arg(long)]
    pub source_file: Option<String>,
}

/// Unset options leave the field unchanged; an empty string clears
/// company or source file.
#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,

    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    #[arg(long, value_parser = amount)]
    pub gross: Option<Decimal>,

    #[arg(long, value_parser = amount)]
    pub net: Option<Decimal>,

    #[arg(long, value_parser = amount)]
    pub withheld: Option<Decimal>,

    #[arg(short, long)]
    pub company: Option<String>,

    #[arg(long)]
    pub source_file: Option<String>,
}

fn amount(s: &str) -> Result<Decimal, String> {
    parse_amount(s).map_err(|e| format!("invalid amount '{s}': {e}"))
}
