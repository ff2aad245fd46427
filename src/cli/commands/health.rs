use std::time::Duration;

use serde_json::json;

use crate::cli::utils::{report, Outcome};
use crate::cli::OutputFormat;

pub async fn check(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", url.trim_end_matches('/'));

    match client.get(&health_url).timeout(Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            report(&output_format, Outcome::Done, &format!("{} is up", url), json!({ "health": body }))
        }
        Ok(response) => {
            let status = response.status().as_u16();
            report(
                &output_format,
                Outcome::Failed("UNHEALTHY"),
                &format!("{} answered {}", health_url, status),
                json!({ "status": status }),
            )?;
            anyhow::bail!("portal at {} is unhealthy", url)
        }
        Err(e) => {
            report(
                &output_format,
                Outcome::Failed("UNREACHABLE"),
                &format!("{} unreachable: {}", health_url, e),
                json!({}),
            )?;
            anyhow::bail!("portal at {} is unreachable", url)
        }
    }
}
