//! End-to-end runs of the subcommands against an in-memory SQLite database.

use std::path::PathBuf;

use chrono::NaiveDate;
use lonn_cli::cli::{AddArgs, Command, EditArgs};
use lonn_cli::commands;
use lonn_cli::config::AppConfig;
use lonn_cli::build_registry;
use lonn_core::SalaryRepository;
use lonn_core::db::DbConfig;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

async fn setup_repo() -> Box<dyn SalaryRepository> {
    let config = DbConfig {
        backend: "sqlite".to_string(),
        connection_string: ":memory:".to_string(),
    };
    match build_registry().create(&config).await {
        Ok(repo) => repo,
        Err(e) => panic!("Failed to create in-memory repository: {e}"),
    }
}

async fn run(
    repo: &dyn SalaryRepository,
    command: Command,
) -> anyhow::Result<String> {
    run_with(repo, &AppConfig::default(), command).await
}

async fn run_with(
    repo: &dyn SalaryRepository,
    config: &AppConfig,
    command: Command,
) -> anyhow::Result<String> {
    let mut out = Vec::new();
    commands::run(command, repo, config, &mut out).await?;
    Ok(String::from_utf8(out).expect("output is UTF-8"))
}

fn add_args(
    date: &str,
    gross: rust_decimal::Decimal,
) -> Command {
    Command::Add(AddArgs {
        date: date.parse().unwrap(),
        gross,
        net: gross * dec!(0.7),
        withheld: gross * dec!(0.3),
        company: Some("Acme AS".to_string()),
        source_file: None,
    })
}

fn test_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../lonn-data/test-data")
        .join(name)
}

#[tokio::test]
async fn add_then_list_shows_entry_and_year_totals() {
    let repo = setup_repo().await;

    let added = run(repo.as_ref(), add_args("2024-01-25", dec!(50000))).await.unwrap();
    run(repo.as_ref(), add_args("2024-02-26", dec!(50000))).await.unwrap();
    let listing = run(repo.as_ref(), Command::List { year: None }).await.unwrap();

    assert_eq!(added, "Added entry 1 (2024-01-25)\n");
    assert!(listing.contains("2024-02-26"));
    assert!(listing.contains("Acme AS"));
    assert!(listing.contains("50 000.00"));
    assert!(listing.contains("2 entries"));
    assert!(listing.contains("100 000.00"));
}

#[tokio::test]
async fn add_rejects_withheld_above_gross() {
    let repo = setup_repo().await;
    let command = Command::Add(AddArgs {
        date: NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
        gross: dec!(1000),
        net: dec!(0),
        withheld: dec!(2000),
        company: None,
        source_file: None,
    });

    let err = run(repo.as_ref(), command).await.unwrap_err();

    assert!(err.to_string().contains("exceeds gross"), "got: {err}");
    assert!(repo.list_entries(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_without_entries_says_so() {
    let repo = setup_repo().await;

    let listing = run(repo.as_ref(), Command::List { year: Some(2023) }).await.unwrap();

    assert_eq!(listing, "No entries for 2023.\n");
}

#[tokio::test]
async fn edit_changes_only_given_fields() {
    let repo = setup_repo().await;
    run(repo.as_ref(), add_args("2024-01-25", dec!(50000))).await.unwrap();

    run(
        repo.as_ref(),
        Command::Edit(EditArgs {
            id: 1,
            date: None,
            gross: Some(dec!(51000)),
            net: None,
            withheld: None,
            company: Some("  ".to_string()),
            source_file: Some("januar.pdf".to_string()),
        }),
    )
    .await
    .unwrap();

    let entry = repo.get_entry(1).await.unwrap();
    assert_eq!(entry.gross_salary, dec!(51000));
    assert_eq!(entry.net_salary, dec!(35000));
    assert_eq!(entry.company_name, None);
    assert_eq!(entry.source_file.as_deref(), Some("januar.pdf"));
}

#[tokio::test]
async fn show_prints_every_field() {
    let repo = setup_repo().await;
    run(
        repo.as_ref(),
        Command::Add(AddArgs {
            date: NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
            gross: dec!(52345.67),
            net: dec!(38000.17),
            withheld: dec!(14345.5),
            company: Some("Fjord & Co".to_string()),
            source_file: Some("mars.pdf".to_string()),
        }),
    )
    .await
    .unwrap();

    let shown = run(repo.as_ref(), Command::Show { id: 1 }).await.unwrap();

    assert!(shown.starts_with("Entry 1\n"), "got:\n{shown}");
    assert!(shown.contains("  Date:          2024-03-25\n"));
    assert!(shown.contains("  Company:       Fjord & Co\n"));
    assert!(shown.contains("  Gross salary:  52 345.67\n"));
    assert!(shown.contains("  Net salary:    38 000.17\n"));
    assert!(shown.contains("  Tax withheld:  14 345.50\n"));
    assert!(shown.contains("  Source file:   mars.pdf\n"));
    assert!(shown.contains("  Created:       "));
    assert!(shown.contains("  Updated:       "));
}

#[tokio::test]
async fn show_marks_unset_company_and_source_file() {
    let repo = setup_repo().await;
    run(
        repo.as_ref(),
        Command::Add(AddArgs {
            date: NaiveDate::from_ymd_opt(2024, 4, 25).unwrap(),
            gross: dec!(50000),
            net: dec!(36500),
            withheld: dec!(13500),
            company: None,
            source_file: None,
        }),
    )
    .await
    .unwrap();

    let shown = run(repo.as_ref(), Command::Show { id: 1 }).await.unwrap();

    assert!(shown.contains("  Company:       -\n"), "got:\n{shown}");
    assert!(shown.contains("  Source file:   -\n"));
}

#[tokio::test]
async fn show_and_delete_report_missing_ids() {
    let repo = setup_repo().await;

    let show = run(repo.as_ref(), Command::Show { id: 42 }).await.unwrap_err();
    let delete = run(repo.as_ref(), Command::Delete { id: 42 }).await.unwrap_err();

    assert_eq!(show.to_string(), "no entry with id 42");
    assert_eq!(delete.to_string(), "no entry with id 42");
}

#[tokio::test]
async fn delete_removes_entry() {
    let repo = setup_repo().await;
    run(repo.as_ref(), add_args("2024-01-25", dec!(50000))).await.unwrap();

    let output = run(repo.as_ref(), Command::Delete { id: 1 }).await.unwrap();

    assert_eq!(output, "Deleted entry 1\n");
    assert!(repo.list_entries(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn import_infers_format_from_extension() {
    let repo = setup_repo().await;

    let csv = run(
        repo.as_ref(),
        Command::Import { file: test_data("salary_entries.csv"), format: None },
    )
    .await
    .unwrap();
    let xml = run(
        repo.as_ref(),
        Command::Import { file: test_data("salary_entries.xml"), format: None },
    )
    .await
    .unwrap();

    assert!(csv.starts_with("Imported 4 entries"), "got: {csv}");
    assert!(xml.starts_with("Imported 2 entries"), "got: {xml}");
    assert_eq!(repo.list_years().await.unwrap(), vec![2024, 2023]);
}

#[tokio::test]
async fn import_without_known_extension_needs_format() {
    let repo = setup_repo().await;

    let err = run(
        repo.as_ref(),
        Command::Import { file: PathBuf::from("payslips.dat"), format: None },
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("--format"), "got: {err}");
}

#[tokio::test]
async fn export_writes_xml_for_one_year() {
    let repo = setup_repo().await;
    run(repo.as_ref(), add_args("2023-12-20", dec!(48000))).await.unwrap();
    run(repo.as_ref(), add_args("2024-01-25", dec!(50000))).await.unwrap();
    let path = std::env::temp_dir().join(format!("lonn-export-{}.xml", std::process::id()));

    let output = run(
        repo.as_ref(),
        Command::Export { file: path.clone(), year: Some(2024) },
    )
    .await
    .unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(output.starts_with("Exported 1 entries"));
    assert!(written.contains("<date>2024-01-25</date>"));
    assert!(!written.contains("2023-12-20"));
}

#[tokio::test]
async fn report_compares_withheld_tax_with_estimate() {
    let repo = setup_repo().await;
    // 12 x 41 666.67 = 500 000.04 gross, 30 % withheld
    for month in 1..=12 {
        run(repo.as_ref(), add_args(&format!("2024-{month:02}-25"), dec!(41666.67)))
            .await
            .unwrap();
    }

    let report = run(
        repo.as_ref(),
        Command::Report { year: None, schedule: None },
    )
    .await
    .unwrap();

    assert!(report.starts_with("Tax report 2024 (schedule trinnskatt-2024)"));
    assert!(report.contains("Entries:        12"));
    assert!(report.contains("500 000.04"));
    assert!(report.contains("9 728.00"));
    assert!(report.contains("expected refund"));
    assert!(!report.contains("Note:"));
}

#[tokio::test]
async fn report_warns_about_schedule_year() {
    let repo = setup_repo().await;
    run(repo.as_ref(), add_args("2025-01-25", dec!(50000))).await.unwrap();

    let report = run(
        repo.as_ref(),
        Command::Report { year: Some(2025), schedule: Some("combined-2024".to_string()) },
    )
    .await
    .unwrap();

    assert!(report.contains("Note: schedule 'combined-2024' describes 2024, not 2025."));
}

#[tokio::test]
async fn report_on_empty_database() {
    let repo = setup_repo().await;

    let report = run(repo.as_ref(), Command::Report { year: None, schedule: None })
        .await
        .unwrap();

    assert_eq!(report, "No entries recorded.\n");
}

#[tokio::test]
async fn estimate_prints_total_and_breakdown() {
    let repo = setup_repo().await;

    let output = run(
        repo.as_ref(),
        Command::Estimate { gross: dec!(500000), schedule: None },
    )
    .await
    .unwrap();

    assert!(output.contains("9 728.00"), "got:\n{output}");
    assert!(output.contains("208 050 - 292 850 @ 1.7 %"));
    assert!(output.contains("1 442"));
    assert!(output.contains("8 286"));
}

#[tokio::test]
async fn estimate_with_unknown_schedule_lists_choices() {
    let repo = setup_repo().await;

    let err = run(
        repo.as_ref(),
        Command::Estimate { gross: dec!(500000), schedule: Some("flat".to_string()) },
    )
    .await
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("flat"));
    assert!(message.contains("trinnskatt-2024"));
    assert!(message.contains("combined-2024"));
}

#[tokio::test]
async fn schedules_marks_configured_default() {
    let repo = setup_repo().await;
    let config = AppConfig::from_toml("[tax]\nschedule = \"combined-2024\"\n").unwrap();

    let output = run_with(repo.as_ref(), &config, Command::Schedules).await.unwrap();

    assert!(output.contains("trinnskatt-2024 [2024]\n"));
    assert!(output.contains("combined-2024 [2024] (default)\n"));
    assert!(output.contains("> 1 350 000"));
    assert!(output.contains("47.4 %"));
}
