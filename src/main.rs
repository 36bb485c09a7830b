mod aggregator;
mod classifier;
mod config;
mod html_renderer;
mod loader;
mod query;
mod samples;
mod stats;
mod types;

use aggregator::Session;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use config::{ConfigError, FileConfig, Overrides, Settings};
use loader::{BatchOutcome, FileFailure, ProcessedFile};
use query::{SortDirection, SortField, TableQuery};
use serde::Serialize;
use stats::{DayCounts, Stats};
use std::fs;
use std::path::PathBuf;
use types::LogEntry;

#[derive(Parser, Debug)]
#[command(version, about = "Classify backup job logs and summarize their outcomes", long_about = None)]
struct Args {
    /// Log files, or directories searched recursively for .txt logs
    paths: Vec<PathBuf>,

    /// Merge the built-in sample entries as existing data
    #[arg(long)]
    samples: bool,

    /// Job naming scheme (synthetic or from-filename)
    #[arg(long)]
    scheme: Option<String>,

    /// Outcome for logs without known markers (random, success, warning or failed)
    #[arg(long)]
    fallback: Option<String>,

    /// Seed for reproducible classification
    #[arg(long)]
    seed: Option<u64>,

    /// Only show table rows whose job name or status contains this text
    #[arg(long, short = 's')]
    search: Option<String>,

    /// Results table sort column
    #[arg(long, value_enum, default_value = "date")]
    sort: SortField,

    /// Sort the results table ascending
    #[arg(long)]
    asc: bool,

    /// Output HTML instead of terminal colors
    #[arg(long, short = 'H')]
    html: bool,

    /// Write the HTML dashboard to FILE
    #[arg(long, short = 'd', value_name = "FILE")]
    dashboard: Option<PathBuf>,

    /// Output entries, statistics and failures as JSON
    #[arg(long, conflicts_with = "html")]
    json: bool,

    /// Config file (defaults to .audit_config in the working directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of most recent days shown in the timeline
    #[arg(long)]
    timeline_days: Option<usize>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    entries: &'a [LogEntry],
    stats: Stats,
    timeline: &'a [DayCounts],
    files: &'a [ProcessedFile],
    failures: &'a [FileFailure],
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let classifier = match settings.classifier() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let (paths, mut failures) = loader::collect_log_files(&args.paths);

    let existing = if args.samples {
        samples::sample_entries()
    } else {
        Vec::new()
    };
    let mut session = Session::new(existing);

    let batch = if paths.is_empty() {
        log::info!("no log files to process");
        BatchOutcome::default()
    } else {
        loader::process_batch(&paths, &classifier, Local::now().naive_local(), settings.seed)
    };
    failures.extend(batch.failures);
    session.ingest(batch.entries);

    let query = TableQuery {
        search: args.search.clone(),
        sort_field: args.sort,
        direction: if args.asc {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        },
    };
    let entries = session.entries();
    let stats = session.stats();
    let timeline = stats::timeline(entries, settings.timeline_days);

    if let Some(output_file) = &args.dashboard {
        let report = dashboard_report(entries, stats, timeline, &query, &batch.files, &failures);
        let html = html_renderer::render_dashboard(&report);
        if let Err(e) = fs::write(output_file, html) {
            eprintln!("Error writing dashboard to {}: {e}", output_file.display());
            std::process::exit(1);
        }
        println!("Dashboard written to: {}", output_file.display());
    } else if args.html {
        let report = dashboard_report(entries, stats, timeline, &query, &batch.files, &failures);
        println!("{}", html_renderer::render_dashboard(&report));
    } else if args.json {
        let report = JsonReport {
            entries,
            stats,
            timeline: &timeline,
            files: &batch.files,
            failures: &failures,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_report(entries, stats, &timeline, &query, &batch.files, &failures);
    }
}

fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
    let file = FileConfig::load(args.config.as_deref())?;
    Settings::resolve(
        file,
        Overrides {
            scheme: args.scheme.clone(),
            fallback: args.fallback.clone(),
            seed: args.seed,
            timeline_days: args.timeline_days,
        },
    )
}

fn dashboard_report<'a>(
    entries: &'a [LogEntry],
    stats: Stats,
    timeline: Vec<DayCounts>,
    query: &TableQuery,
    files: &'a [ProcessedFile],
    failures: &'a [FileFailure],
) -> html_renderer::DashboardReport<'a> {
    html_renderer::DashboardReport {
        generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        entries,
        stats,
        timeline,
        table_rows: query::filter_and_sort(entries, query),
        files,
        failures,
    }
}

fn print_report(
    entries: &[LogEntry],
    stats: Stats,
    timeline: &[DayCounts],
    query: &TableQuery,
    files: &[ProcessedFile],
    failures: &[FileFailure],
) {
    println!(
        "{}",
        format!(
            "=== Backup Log Audit: {} ===",
            Local::now().format("%Y-%m-%d %H:%M")
        )
        .cyan()
    );

    if files.is_empty() && failures.is_empty() {
        println!("No log files to process.");
    }
    for file in files {
        println!(
            "  - {} ({})",
            file.name,
            human_bytes::human_bytes(file.size as f64)
        );
    }
    if !failures.is_empty() {
        println!(
            "{}",
            format!("{} file(s) could not be processed:", failures.len()).red()
        );
        for failure in failures {
            println!("  {} {}: {}", "⚠️".yellow(), failure.file, failure.message.red());
        }
    }

    if entries.is_empty() {
        println!("\nNo entries to summarize. Load backup log files to start the analysis.");
        return;
    }

    println!("\n{}", "=== Summary ===".cyan());
    stats::print_stats_cards(&stats);

    println!("\n{}", "=== Jobs by Status ===".cyan());
    stats::print_status_lists(entries);

    println!("\n{}", "=== Status Distribution ===".cyan());
    stats::print_distribution(entries);

    println!("\n{}", "=== Daily Timeline ===".cyan());
    stats::print_timeline(timeline);

    println!("\n{}", "=== Detailed Results ===".cyan());
    query::print_results_table(&query::filter_and_sort(entries, query));

    println!("\n{}", "=== Audit Complete ===".cyan());
}
