//! CLI entry point for the vehicle-registration trends tool.
//!
//! Provides subcommands for generating the full report with CSV exports,
//! the YoY pivot with headline insights, and the QoQ series on its own.

use anyhow::Result;
use clap::{Parser, Subcommand};
use regtrends::export::{print_insights_json, summary_rows, write_qoq_series, write_summary};
use regtrends::records::Category;
use regtrends::report::{
    Report, ReportFilters, SourceManifest, TOP_N_DEFAULT, assemble, load_sources,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "regtrends")]
#[command(about = "A tool to analyze vehicle-registration trends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the full report and write the CSV exports
    Report {
        /// Directory containing the source xlsx files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Top-N-by-volume count (clamped to 5..=20)
        #[arg(short = 'n', long, default_value_t = TOP_N_DEFAULT)]
        top_n: usize,

        /// Comma-separated maker selection for the QoQ series
        #[arg(long, value_delimiter = ',')]
        makers: Option<Vec<String>>,

        /// Restrict the class breakdown to one category (2W, 3W, 4W)
        #[arg(long)]
        category: Option<Category>,

        /// First year of the YoY comparison window
        #[arg(long)]
        from_year: Option<i32>,

        /// Last year of the YoY comparison window
        #[arg(long)]
        to_year: Option<i32>,

        /// Path for the summary CSV export
        #[arg(long, default_value = "summary.csv")]
        summary_out: PathBuf,

        /// Path for the QoQ series CSV export
        #[arg(long, default_value = "qoq_growth.csv")]
        qoq_out: PathBuf,
    },
    /// YoY pivot and headline insights only
    Yoy {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// QoQ series for selected makers, optionally exported as CSV
    Qoq {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Comma-separated maker selection
        #[arg(long, value_delimiter = ',')]
        makers: Option<Vec<String>>,

        /// Optional CSV export path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/regtrends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("regtrends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            data_dir,
            top_n,
            makers,
            category,
            from_year,
            to_year,
            summary_out,
            qoq_out,
        } => {
            let filters = ReportFilters {
                year_range: (
                    from_year.unwrap_or(i32::MIN),
                    to_year.unwrap_or(i32::MAX),
                ),
                category,
                makers,
                top_n,
            };

            let report = run_pipeline(&data_dir, &filters)?;
            log_report(&report);

            write_summary(&summary_out, &report)?;
            write_qoq_series(&qoq_out, &report.qoq)?;
            info!(
                summary = %summary_out.display(),
                qoq = %qoq_out.display(),
                "Exports written"
            );
        }
        Commands::Yoy { data_dir } => {
            let report = run_pipeline(&data_dir, &ReportFilters::default())?;
            log_yoy(&report);
            print_insights_json(&report)?;
        }
        Commands::Qoq {
            data_dir,
            makers,
            output,
        } => {
            let filters = ReportFilters {
                makers,
                ..ReportFilters::default()
            };
            let report = run_pipeline(&data_dir, &filters)?;
            log_qoq(&report);

            if let Some(path) = output {
                write_qoq_series(&path, &report.qoq)?;
                info!(path = %path.display(), "QoQ export written");
            }
        }
    }

    Ok(())
}

fn run_pipeline(data_dir: &Path, filters: &ReportFilters) -> Result<Report> {
    let manifest = SourceManifest::from_data_dir(data_dir);
    let data = load_sources(&manifest)?;
    assemble(&data, filters)
}

fn log_report(report: &Report) {
    info!(generated_at = %report.generated_at, "Report assembled");
    log_yoy(report);

    info!(count = report.yoy_top_magnitude.len(), "Top growth by magnitude");
    for row in &report.yoy_top_magnitude {
        info!(
            maker = %row.maker,
            growth_pct = format!("{:.2}", row.growth_pct),
            "Growth magnitude"
        );
    }

    info!(count = report.top_volume.len(), "Top makers by volume");
    for row in &report.top_volume {
        info!(
            maker = %row.maker,
            total = format!("{:.0}", row.current_total),
            "Volume"
        );
    }

    log_qoq(report);

    for (category, total) in &report.category_totals {
        info!(category = %category, total = format!("{total:.0}"), "Category total");
    }
    for row in &report.category_trend {
        info!(
            year = row.year,
            category = %row.category,
            total = format!("{:.0}", row.total),
            "Category trend"
        );
    }

    log_insights(report);
}

fn log_yoy(report: &Report) {
    let (prior, current) = report.period;
    info!(prior, current, makers = report.yoy.len(), "YoY pivot");
    for row in &report.yoy {
        info!(
            maker = %row.maker,
            prior_total = format!("{:.0}", row.prior_total),
            current_total = format!("{:.0}", row.current_total),
            growth_pct = format!("{:.2}", row.growth_pct),
            "YoY"
        );
    }
}

fn log_qoq(report: &Report) {
    info!(points = report.qoq.len(), "QoQ series");
    for row in &report.qoq {
        info!(
            maker = %row.maker,
            period = %row.label,
            value = format!("{:.0}", row.value),
            growth_pct = row
                .growth_pct
                .map(|g| format!("{g:.2}"))
                .unwrap_or_default(),
            "QoQ"
        );
    }
}

fn log_insights(report: &Report) {
    for row in summary_rows(report) {
        info!(metric = %row.metric, value = %row.value, "Insight");
    }
}
