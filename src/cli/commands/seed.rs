use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};

use crate::cli::config::{load_seed_file, save_seed_file, SeedFile};
use crate::cli::utils::{report, Outcome};
use crate::cli::OutputFormat;
use crate::config;

/// Register each seed user through the crew service's public registration endpoint
pub async fn seed(file: &Path, api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let seed = load_seed_file(file)?;
    if seed.users.is_empty() {
        return report(
            &output_format,
            Outcome::Done,
            &format!("{} has no users to seed", file.display()),
            json!({ "registered": 0, "failed": 0 }),
        );
    }

    let upstream = &config::config().upstream;
    let base_url = api_url.unwrap_or_else(|| upstream.base_url.clone());
    let url = format!("{}/auth/register", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder().timeout(Duration::from_secs(15)).build()?;

    let mut registered = 0;
    let mut failed = Vec::new();

    for user in &seed.users {
        let mut request = client.post(&url).json(user);
        if let Some(token) = &upstream.service_token {
            request = request.bearer_auth(token);
        }

        let (outcome, message, status) = match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                registered += 1;
                (Outcome::Done, format!("Registered {} ({})", user.email, user.role), Some(resp.status().as_u16()))
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let detail = resp
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_default();
                (Outcome::Failed("REGISTER_FAILED"), format!("{}: {} {}", user.email, status, detail), Some(status))
            }
            Err(e) => (Outcome::Failed("UNREACHABLE"), format!("{}: {}", user.email, e), None),
        };

        if outcome != Outcome::Done {
            failed.push(user.email.clone());
        }
        report(
            &output_format,
            outcome,
            message.trim_end(),
            json!({ "email": user.email, "role": user.role, "status": status }),
        )?;
    }

    tracing::info!("Seeded {} of {} users against {}", registered, seed.users.len(), url);

    let summary = format!("Seeded {} of {} users from {}", registered, seed.users.len(), file.display());
    let fields = json!({ "registered": registered, "failed": failed });
    if failed.is_empty() {
        report(&output_format, Outcome::Done, &summary, fields)
    } else {
        report(&output_format, Outcome::Failed("PARTIAL_SEED"), &summary, fields)?;
        anyhow::bail!("{} of {} users could not be registered", failed.len(), seed.users.len())
    }
}

/// Rewrite a seed file with no users
pub fn reset(file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    save_seed_file(file, &SeedFile::default())?;
    report(
        &output_format,
        Outcome::Done,
        &format!("Reset {}", file.display()),
        json!({ "file": file.display().to_string() }),
    )
}
