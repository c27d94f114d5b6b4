use crate::ui;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use slo_config::parse_config_from_file;
use slo_core::BucketCounts;
use slo_graphite::GraphiteBackend;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ThresholdReport<'a> {
    slo: &'a str,
    metric: &'a str,
    timestamp: i64,
    window: i64,
    threshold: f64,
    good_below_threshold: bool,
    good: i64,
    bad: i64,
    sli: Option<f64>,
}

pub async fn execute(
    config_file: PathBuf,
    timestamp: Option<i64>,
    window: Duration,
    format: String,
) -> Result<()> {
    if !matches!(format.as_str(), "cli" | "json") {
        anyhow::bail!("Unknown format: {}", format);
    }

    let config = parse_config_from_file(&config_file).await?;
    let (timestamp, window) = super::resolve_window(timestamp, window)?;

    let backend = GraphiteBackend::from_config(&config)?;
    let counts = backend.threshold(timestamp, window, &config).await?;

    let measurement = &config.backend.measurement;
    let (good, bad) = counts.contract_pair();
    let report = ThresholdReport {
        slo: config.display_name(),
        metric: &measurement.metric,
        timestamp,
        window,
        threshold: measurement.threshold,
        good_below_threshold: measurement.good_below_threshold,
        good,
        bad,
        sli: counts.sli(),
    };

    match format.as_str() {
        "cli" => print_cli_report(&report, &counts),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => unreachable!("format checked above"),
    }

    Ok(())
}

fn print_cli_report(report: &ThresholdReport<'_>, counts: &BucketCounts) {
    ui::print_header(&format!("SLO: {}", report.slo));
    println!("Metric: {}", report.metric.cyan());
    println!(
        "Window: {}s ending at {}",
        report.window, report.timestamp
    );
    println!(
        "Threshold: {} (good {} threshold)",
        report.threshold,
        if report.good_below_threshold { "below" } else { "above" }
    );

    let (Some(good), Some(bad)) = (counts.good(), counts.bad()) else {
        ui::print_warning("No data in window");
        return;
    };

    println!("Good events: {}", good.to_string().green());
    println!("Bad events: {}", bad.to_string().red());

    match report.sli {
        Some(sli) => ui::print_success(&format!("SLI: {:.4}%", sli * 100.0)),
        None => ui::print_warning("SLI undefined: window contains only null samples"),
    }
}
