// Entry point and interactive terminal dashboard.
//
// - Option [1] loads and cleans the configured sales export.
// - Option [2] edits the filter selection (month, dept, channel, store,
//   region, category).
// - Option [3] recomputes every table for the current selection, prints the
//   dashboard and exports the tables.
mod aggregate;
mod columns;
mod config;
mod error;
mod filter;
mod loader;
mod logging;
mod metrics;
mod output;
mod period;
mod pipeline;
mod reports;
mod types;
mod util;

use config::AppConfig;
use error::AppError;
use filter::{observed_values, Dimension, FilterSelection};
use loader::LoadReport;
use once_cell::sync::Lazy;
use pipeline::DashboardOutcome;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, warn};
use types::{Dashboard, SalesRecord};

// Loaded records and the current selection. The pipeline never sees this
// state; it gets the records and an immutable selection on every run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        selection: FilterSelection::unconstrained(),
    })
});

struct AppState {
    data: Option<LoadedData>,
    selection: FilterSelection,
}

struct LoadedData {
    records: Vec<SalesRecord>,
    report: LoadReport,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Handle option [1]: load and clean the input file.
///
/// A new load replaces the previous records and resets the filters to every
/// observed value.
fn handle_load(config: &AppConfig) {
    let path = Path::new(&config.input_path);
    match loader::load_and_clean(path, &config.cleaning) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                util::format_int(report.total_rows),
                util::format_int(report.kept_rows)
            );
            if report.date_errors > 0 {
                println!(
                    "Note: {} rows skipped due to unparseable dates.",
                    util::format_int(report.date_errors)
                );
            }
            if report.quality_drops > 0 {
                println!(
                    "Note: {} rows skipped due to non-positive sales or quantity.",
                    util::format_int(report.quality_drops)
                );
            }
            println!();
            let mut state = app_state();
            state.selection = FilterSelection::all_observed(&records);
            state.data = Some(LoadedData { records, report });
        }
        Err(e) => {
            error!(path = %path.display(), "load failed: {e}");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn describe_constraint(allowed: Option<&BTreeSet<String>>, observed: &BTreeSet<String>) -> String {
    match allowed {
        None => "(any)".to_string(),
        Some(set) if set.is_empty() => "(none)".to_string(),
        Some(set) if observed.is_subset(set) => format!("all {}", observed.len()),
        Some(set) => {
            let values: Vec<&str> = set.iter().map(String::as_str).collect();
            values.join(", ")
        }
    }
}

/// Turn user input into the new constraint for `dim`. `None` removes it.
fn parse_filter_input(input: &str, observed: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    match input.to_ascii_lowercase().as_str() {
        "all" => Some(observed.clone()),
        "none" => Some(BTreeSet::new()),
        "clear" => None,
        _ => Some(
            input
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

/// Handle option [2]: edit the filter selection one dimension at a time.
fn handle_filters() {
    let mut state = app_state();
    let Some(data) = state.data.as_ref() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let observed: Vec<BTreeSet<String>> = Dimension::ALL
        .iter()
        .map(|&dim| observed_values(&data.records, dim))
        .collect();

    loop {
        println!("Current filters:");
        for (idx, dim) in Dimension::ALL.iter().enumerate() {
            println!(
                "[{}] {}: {}",
                idx + 1,
                dim,
                describe_constraint(state.selection.allowed(*dim), &observed[idx])
            );
        }
        println!("[0] Done\n");
        let Some(choice) = read_line("Enter choice: ") else {
            return;
        };
        if choice == "0" {
            println!();
            return;
        }
        let idx = match choice.parse::<usize>() {
            Ok(n) if (1..=Dimension::ALL.len()).contains(&n) => n - 1,
            _ => {
                println!("Invalid choice.\n");
                continue;
            }
        };
        let dim = Dimension::ALL[idx];
        let values: Vec<&str> = observed[idx].iter().map(String::as_str).collect();
        println!("Available {}: {}", dim, values.join(", "));
        let Some(input) = read_line("Values (comma-separated, all, none, clear): ") else {
            return;
        };

        let selection = state.selection.clone();
        state.selection = match parse_filter_input(&input, &observed[idx]) {
            Some(set) => {
                let unknown: Vec<&String> = set.difference(&observed[idx]).collect();
                if !unknown.is_empty() {
                    warn!(dimension = %dim, ?unknown, "selected values not present in data");
                    println!("Note: no rows have {} = {:?}", dim, unknown);
                }
                selection.with(dim, set)
            }
            None => selection.without(dim),
        };
        println!();
    }
}

fn export_dashboard(dir: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    output::write_csv(
        &dir.join("kpi_by_month.csv"),
        &reports::generate_kpi_report(&dashboard.kpi_by_period),
    )?;
    output::write_csv(
        &dir.join("segment_breakdown.csv"),
        &reports::generate_segment_report(&dashboard.segments_by_period),
    )?;
    output::write_csv(
        &dir.join("channel_share.csv"),
        &reports::generate_channel_report(&dashboard.channel_share),
    )?;
    output::write_csv(
        &dir.join("top_stores.csv"),
        &reports::generate_store_report(&dashboard.top_stores),
    )?;
    output::write_json(&dir.join("dashboard.json"), dashboard)
}

fn print_dashboard(config: &AppConfig, d: &Dashboard) {
    let rows = config.preview_rows;
    println!(
        "Latest period: {} ({} filtered rows)\n",
        d.headline.kpi.period,
        util::format_int(d.filtered_rows)
    );
    for card in reports::headline_cards(&d.headline) {
        println!("  {:<20} {}", card.label, card.value);
    }
    println!();

    println!("Dept + Channel KPIs ({})\n", d.headline.kpi.period);
    output::preview_table_rows(&reports::generate_segment_report(&d.segments_latest), rows);

    println!("Monthly KPIs\n");
    output::preview_latest_rows(&reports::generate_kpi_report(&d.kpi_by_period), rows);

    println!("GMV and ATV Trend\n");
    output::preview_latest_rows(&reports::generate_trend_report(&d.trend), rows);

    println!("Sales Share by Channel\n");
    output::preview_table_rows(&reports::generate_channel_report(&d.channel_share), rows);

    println!("Top {} Stores by Sales\n", config.top_stores);
    output::preview_table_rows(&reports::generate_store_report(&d.top_stores), rows);
}

/// Handle option [3]: recompute the dashboard for the current selection.
fn handle_generate(config: &AppConfig) {
    let outcome = {
        let state = app_state();
        let Some(data) = state.data.as_ref() else {
            println!("Error: No data loaded. Please load the file first (option 1).\n");
            return;
        };
        if data.report.kept_rows == 0 {
            warn!("no rows survived cleaning");
        }
        pipeline::build_dashboard(&data.records, &state.selection, config.top_stores)
    };

    let dashboard = match outcome {
        DashboardOutcome::Ready(d) => d,
        DashboardOutcome::NoData => {
            println!("Warning: no data under the current filters.\n");
            return;
        }
    };

    println!("Generating dashboard...\n");
    print_dashboard(config, &dashboard);

    let dir = PathBuf::from(&config.output_dir);
    match export_dashboard(&dir, &dashboard) {
        Ok(()) => println!("(Tables exported to {})\n", dir.display()),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = match AppConfig::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", config_path, e);
            std::process::exit(2);
        }
    };
    logging::init_logging(&config.log_level);

    loop {
        println!("Retail Sales Dashboard ({})", config.input_path);
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Generate dashboard");
        println!("[4] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_filters();
            }
            "3" => {
                println!();
                handle_generate(&config);
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 4.\n"),
        }
    }
}
