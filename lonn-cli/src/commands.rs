//! Subcommand handlers.
//!
//! Handlers talk to storage only through [`SalaryRepository`] and write
//! their output to the given writer, so they run the same against any
//! backend and under test.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use lonn_core::calculations::common::{format_amount, format_money, format_rate};
use lonn_core::calculations::{TaxEstimator, YearSummary, available_years};
use lonn_core::{
    NewSalaryEntry, RepositoryError, SalaryEntry, SalaryRepository, TaxCalculationResult,
};
use lonn_data::{CsvEntryReader, EntryFormat, EntryLoader, XmlEntryReader, XmlEntryWriter};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::cli::{AddArgs, Command, EditArgs};
use crate::config::AppConfig;

/// Runs one subcommand against `repo`.
pub async fn run(
    command: Command,
    repo: &dyn SalaryRepository,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Add(args) => add(repo, args, out).await,
        Command::List { year } => list(repo, year, out).await,
        Command::Show { id } => show(repo, id, out).await,
        Command::Edit(args) => edit(repo, args, out).await,
        Command::Delete { id } => delete(repo, id, out).await,
        Command::Import { file, format } => import(repo, &file, format, out).await,
        Command::Export { file, year } => export(repo, &file, year, out).await,
        Command::Report { year, schedule } => {
            report(repo, config, year, schedule.as_deref(), out).await
        }
        Command::Estimate { gross, schedule } => {
            let schedule = config.schedule(schedule.as_deref())?;
            let result = TaxEstimator::new(&schedule).estimate(gross);
            writeln!(out, "Schedule: {}", schedule.name())?;
            write_estimate(out, &result)
        }
        Command::Schedules => schedules(config, out),
    }
}

async fn add(
    repo: &dyn SalaryRepository,
    args: AddArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut entry = NewSalaryEntry::new(args.date, args.gross, args.net, args.withheld);
    if let Some(company) = args.company {
        entry = entry.with_company(company);
    }
    if let Some(source_file) = args.source_file {
        entry = entry.with_source_file(source_file);
    }
    entry.validate()?;

    let created = repo.create_entry(entry).await?;
    info!(id = created.id, "added salary entry");
    writeln!(out, "Added entry {} ({})", created.id, created.date)?;
    Ok(())
}

async fn list(
    repo: &dyn SalaryRepository,
    year: Option<i32>,
    out: &mut impl Write,
) -> Result<()> {
    let entries = repo.list_entries(year).await?;
    if entries.is_empty() {
        match year {
            Some(year) => writeln!(out, "No entries for {year}.")?,
            None => writeln!(out, "No entries recorded.")?,
        }
        return Ok(());
    }
    write_history(out, &entries)
}

async fn show(
    repo: &dyn SalaryRepository,
    id: i64,
    out: &mut impl Write,
) -> Result<()> {
    let entry = fetch(repo, id).await?;

    writeln!(out, "Entry {}", entry.id)?;
    writeln!(out, "  Date:          {}", entry.date)?;
    writeln!(out, "  Company:       {}", entry.company_name.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Gross salary:  {}", format_money(entry.gross_salary))?;
    writeln!(out, "  Net salary:    {}", format_money(entry.net_salary))?;
    writeln!(out, "  Tax withheld:  {}", format_money(entry.tax_withheld))?;
    writeln!(out, "  Source file:   {}", entry.source_file.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Created:       {}", entry.created_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "  Updated:       {}", entry.updated_at.format("%Y-%m-%d %H:%M:%S"))?;
    Ok(())
}

async fn edit(
    repo: &dyn SalaryRepository,
    args: EditArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut entry = fetch(repo, args.id).await?;

    if let Some(date) = args.date {
        entry.date = date;
    }
    if let Some(gross) = args.gross {
        entry.gross_salary = gross;
    }
    if let Some(net) = args.net {
        entry.net_salary = net;
    }
    if let Some(withheld) = args.withheld {
        entry.tax_withheld = withheld;
    }
    if let Some(company) = args.company {
        entry.company_name = Some(company);
    }
    if let Some(source_file) = args.source_file {
        entry.source_file = Some(source_file);
    }

    let checked = NewSalaryEntry::from(&entry).normalized();
    checked.validate()?;
    entry.company_name = checked.company_name;
    entry.source_file = checked.source_file;
    entry.updated_at = Utc::now();

    repo.update_entry(&entry).await?;
    info!(id = entry.id, "updated salary entry");
    writeln!(out, "Updated entry {}", entry.id)?;
    Ok(())
}

async fn delete(
    repo: &dyn SalaryRepository,
    id: i64,
    out: &mut impl Write,
) -> Result<()> {
    match repo.delete_entry(id).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => bail!("no entry with id {id}"),
        Err(e) => return Err(e.into()),
    }
    info!(id, "deleted salary entry");
    writeln!(out, "Deleted entry {id}")?;
    Ok(())
}

async fn import(
    repo: &dyn SalaryRepository,
    path: &Path,
    format: Option<EntryFormat>,
    out: &mut impl Write,
) -> Result<()> {
    let format = match format.or_else(|| EntryFormat::from_path(path)) {
        Some(format) => format,
        None => bail!(
            "cannot tell the format of '{}'; pass --format csv or --format xml",
            path.display()
        ),
    };

    let file = File::open(path).with_context(|| format!("cannot open '{}'", path.display()))?;
    let reader = BufReader::new(file);
    let entries = match format {
        EntryFormat::Csv => CsvEntryReader::read(reader),
        EntryFormat::Xml => XmlEntryReader::read(reader),
    }
    .with_context(|| format!("cannot import '{}'", path.display()))?;

    let report = EntryLoader::load(repo, &entries).await?;
    writeln!(
        out,
        "Imported {} entries from {} ({} already present)",
        report.inserted,
        path.display(),
        report.skipped
    )?;
    Ok(())
}

async fn export(
    repo: &dyn SalaryRepository,
    path: &Path,
    year: Option<i32>,
    out: &mut impl Write,
) -> Result<()> {
    let entries = repo.list_entries(year).await?;

    let file =
        File::create(path).with_context(|| format!("cannot create '{}'", path.display()))?;
    XmlEntryWriter::write(BufWriter::new(file), &entries)
        .with_context(|| format!("cannot write '{}'", path.display()))?;

    info!(count = entries.len(), path = %path.display(), "exported salary entries");
    writeln!(out, "Exported {} entries to {}", entries.len(), path.display())?;
    Ok(())
}

async fn report(
    repo: &dyn SalaryRepository,
    config: &AppConfig,
    year: Option<i32>,
    schedule: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let schedule = config.schedule(schedule)?;

    let year = match year {
        Some(year) => year,
        None => match repo.list_years().await?.first() {
            Some(year) => *year,
            None => {
                writeln!(out, "No entries recorded.")?;
                return Ok(());
            }
        },
    };

    let entries = repo.list_entries(Some(year)).await?;
    let summary = YearSummary::from_entries(year, &entries, &schedule);

    writeln!(out, "Tax report {year} (schedule {})", summary.schedule_name)?;
    if summary.schedule_year_mismatch(&schedule) {
        warn!(year, schedule_year = schedule.tax_year(), "schedule is for a different year");
        writeln!(
            out,
            "Note: schedule '{}' describes {}, not {year}.",
            schedule.name(),
            schedule.tax_year()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  Entries:        {}", summary.entry_count)?;
    writeln!(out, "  Total gross:    {:>15}", format_money(summary.total_gross))?;
    writeln!(out, "  Total net:      {:>15}", format_money(summary.total_net))?;
    writeln!(out, "  Tax withheld:   {:>15}", format_money(summary.total_withheld))?;
    writeln!(out, "  Estimated tax:  {:>15}", format_money(summary.estimate.total_tax))?;
    writeln!(out, "  Difference:     {:>15}", format_money(summary.difference))?;
    writeln!(out, "  Outcome:        {}", summary.settlement().label())?;
    writeln!(out)?;
    write_breakdown(out, &summary.estimate)?;
    writeln!(out)?;
    writeln!(out, "Estimates are approximate and not an official assessment.")?;
    Ok(())
}

fn schedules(
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<()> {
    for schedule in config.schedules() {
        let marker = if schedule.name() == config.tax.schedule { " (default)" } else { "" };
        writeln!(out, "{} [{}]{marker}", schedule.name(), schedule.tax_year())?;
        for (lower, bracket) in schedule.ranges() {
            let range = match bracket.upper_bound {
                Some(upper) => format!("{} - {}", format_amount(lower), format_amount(upper)),
                None => format!("> {}", format_amount(lower)),
            };
            writeln!(out, "  {range:<24} {:>7}", format_rate(bracket.rate))?;
        }
    }
    Ok(())
}

async fn fetch(
    repo: &dyn SalaryRepository,
    id: i64,
) -> Result<SalaryEntry> {
    match repo.get_entry(id).await {
        Ok(entry) => Ok(entry),
        Err(RepositoryError::NotFound) => bail!("no entry with id {id}"),
        Err(e) => Err(e.into()),
    }
}

fn write_estimate(
    out: &mut impl Write,
    result: &TaxCalculationResult,
) -> Result<()> {
    writeln!(out, "Gross income:   {:>15}", format_money(result.gross_income))?;
    writeln!(out, "Estimated tax:  {:>15}", format_money(result.total_tax))?;
    if let Some(rate) = result.effective_rate() {
        writeln!(out, "Effective rate: {:>15}", format_rate(rate.round_dp(4)))?;
    }
    writeln!(out)?;
    write_breakdown(out, result)
}

fn write_breakdown(
    out: &mut impl Write,
    result: &TaxCalculationResult,
) -> Result<()> {
    if result.details.is_empty() {
        writeln!(out, "No tax in any bracket.")?;
        return Ok(());
    }
    for detail in &result.details {
        writeln!(out, "  {:<32} {:>12}", detail.label, format_amount(detail.amount))?;
    }
    Ok(())
}

/// Entries table followed by one totals line per year, newest year first.
fn write_history(
    out: &mut impl Write,
    entries: &[SalaryEntry],
) -> Result<()> {
    writeln!(
        out,
        "{:>5}  {:<10}  {:<20}  {:>14}  {:>14}  {:>14}",
        "ID", "Date", "Company", "Gross", "Net", "Withheld"
    )?;
    for entry in entries {
        writeln!(
            out,
            "{:>5}  {:<10}  {:<20}  {:>14}  {:>14}  {:>14}",
            entry.id,
            entry.date,
            truncate(entry.company_name.as_deref().unwrap_or("-"), 20),
            format_money(entry.gross_salary),
            format_money(entry.net_salary),
            format_money(entry.tax_withheld)
        )?;
    }

    writeln!(out)?;
    for year in available_years(entries) {
        let in_year = entries.iter().filter(|e| e.year() == year);
        let (count, gross, net, withheld) = in_year.fold(
            (0usize, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(n, g, ne, w), e| (n + 1, g + e.gross_salary, ne + e.net_salary, w + e.tax_withheld),
        );
        writeln!(
            out,
            "{:>5}  {:<10}  {:<20}  {:>14}  {:>14}  {:>14}",
            "",
            year,
            format!("{count} entries"),
            format_money(gross),
            format_money(net),
            format_money(withheld)
        )?;
    }
    Ok(())
}

fn truncate(
    text: &str,
    width: usize,
) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width - 1).collect();
    short.push('…');
    short
}
