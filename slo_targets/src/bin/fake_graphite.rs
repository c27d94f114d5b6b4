use slo_targets::{sample_series, FakeGraphite};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nagios.host.ram_used".to_string());
    let now = chrono::Utc::now().timestamp();
    let fake = FakeGraphite::new(sample_series(&target, now));

    let addr = "0.0.0.0:8082";
    info!("Starting fake Graphite render API on {}", addr);
    info!("Endpoints:");
    info!("  GET  /health  - Health check");
    info!("  GET  /render  - Canned series for '{}'", target);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, fake.router()).await?;

    Ok(())
}
