use crate::ui;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use slo_config::parse_config_from_file;
use slo_graphite::GraphiteBackend;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CountReport<'a> {
    slo: &'a str,
    metric: &'a str,
    timestamp: i64,
    window: i64,
    events: f64,
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
    let sum = backend.count_events(timestamp, window, &config).await?;

    let report = CountReport {
        slo: config.display_name(),
        metric: &config.backend.measurement.metric,
        timestamp,
        window,
        events: sum.contract_value(),
    };

    match format.as_str() {
        "cli" => {
            ui::print_header(&format!("SLO: {}", report.slo));
            println!("Metric: {}", report.metric.cyan());
            println!("Window: {}s ending at {}", report.window, report.timestamp);
            if sum.is_no_data() {
                ui::print_warning("No data in window");
            } else {
                println!("Events: {}", report.events.to_string().green());
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => unreachable!("format checked above"),
    }

    Ok(())
}
