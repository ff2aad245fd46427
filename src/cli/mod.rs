pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "crewctl")]
#[command(about = "Crew portal utilities - local seed data and health checks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Register every user in a seed file with the crew service")]
    Seed {
        #[arg(help = "Seed file path")]
        file: std::path::PathBuf,
        #[arg(long, help = "Crew service base URL (defaults to CREW_API_BASE_URL)")]
        api_url: Option<String>,
    },

    #[command(about = "Reset a seed file to an empty user list")]
    Reset {
        #[arg(help = "Seed file path")]
        file: std::path::PathBuf,
    },

    #[command(about = "Check a running portal's /health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000", help = "Portal base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Seed { file, api_url } => commands::seed::seed(&file, api_url, output_format).await,
        Commands::Reset { file } => commands::seed::reset(&file, output_format),
        Commands::Health { url } => commands::health::check(&url, output_format).await,
    }
}
