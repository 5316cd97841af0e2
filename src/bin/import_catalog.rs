//! One-off bulk importer.
//!
//! Seeds the course index from a third-party catalog API by replaying each
//! course through the running service's `/course/add` endpoint. Already
//! ingested courses are reported as skipped (the service rejects duplicate
//! ids), so the importer can be re-run safely.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "import-catalog", about = "Seed the course index from a catalog API")]
struct Args {
    /// Base URL of the source catalog API
    #[arg(long, env = "CATALOG_SOURCE_URL")]
    source: String,

    /// Base URL of the running catalog search service
    #[arg(long, env = "CATALOG_TARGET_URL", default_value = "http://localhost:8080")]
    target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let client = reqwest::Client::new();

    let courses: Vec<Value> = client
        .get(format!("{}/course", args.source))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("failed to list courses from the source catalog")?;
    tracing::info!(count = courses.len(), "Fetched course list");

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for course in &courses {
        let Some(id) = course.get("id").and_then(Value::as_str) else {
            skipped += 1;
            continue;
        };

        let detail: Value = client
            .get(format!("{}/course/{id}", args.source))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to fetch course {id}"))?;

        let response = client
            .post(format!("{}/course/add", args.target))
            .json(&detail)
            .send()
            .await?;

        if response.status().is_success() {
            imported += 1;
            tracing::info!(%id, "Imported");
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%id, %status, body = %body, "Import rejected");
            skipped += 1;
        }
    }

    tracing::info!(imported, skipped, "Import finished");
    Ok(())
}
