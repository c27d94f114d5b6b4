use crate::ui;
use anyhow::Result;
use slo_config::{parse_config_from_file, Timezone};
use std::path::PathBuf;

pub async fn execute(config_file: PathBuf) -> Result<()> {
    ui::print_header("Validating SLO Config");
    println!("File: {}", config_file.display());

    match parse_config_from_file(&config_file).await {
        Ok(config) => {
            ui::print_success("Config is valid!");

            let backend = &config.backend;
            println!("\nSLO Details:");
            println!("  Name: {}", config.display_name());
            if let Some(desc) = &config.description {
                println!("  Description: {}", desc);
            }
            println!("  API URL: {}", backend.api_url);
            println!("  Metric: {}", backend.measurement.metric);
            println!("  Threshold: {}", backend.measurement.threshold);
            println!(
                "  Good below threshold: {}",
                backend.measurement.good_below_threshold
            );
            println!("  Timeout: {:?}", backend.timeout);
            println!(
                "  Timezone: {}",
                match backend.timezone {
                    Timezone::Utc => "utc",
                    Timezone::Local => "local",
                }
            );

            if !backend.verify_tls {
                ui::print_warning("TLS certificate verification is disabled");
            }

            Ok(())
        }
        Err(e) => {
            ui::print_error("Config is invalid!");
            println!("\nError: {}", e);
            Err(e)
        }
    }
}
