use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

mod error;
mod ingest;
mod models;
mod pipeline;
mod report;
mod scoring;
mod store;
mod summary;

use crate::models::FailurePayload;

#[derive(Parser)]
#[command(name = "chi-dashboard")]
#[command(about = "Community health index scoring for member activity exports", long_about = None)]
struct Cli {
    /// Most recently uploaded member export
    #[arg(long, global = true, env = "CHI_CSV_PATH", default_value = store::DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Processing instant (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long, global = true, env = "CHI_AS_OF", value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard payload as JSON
    Dashboard {
        #[arg(long)]
        pretty: bool,
    },
    /// List members by CHI score
    Score {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn parse_as_of(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    ingest::parse_date(value).ok_or_else(|| format!("invalid date `{value}`"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = cli.as_of.unwrap_or_else(Utc::now);

    match cli.command {
        Commands::Dashboard { pretty } => {
            let result = store::dashboard_from_path(&cli.csv, now).await;
            let (json, failed) = match &result {
                Ok(dashboard) => (to_json(dashboard, pretty)?, false),
                Err(err) => {
                    if err.is_no_data() {
                        tracing::warn!(path = %cli.csv.display(), "CSV file not found");
                    } else {
                        tracing::error!(error = %err, "error processing data");
                    }
                    (to_json(&FailurePayload::from(err), pretty)?, true)
                }
            };
            println!("{json}");
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Score { limit } => {
            let dashboard = store::dashboard_from_path(&cli.csv, now)
                .await
                .with_context(|| format!("failed to score {}", cli.csv.display()))?;

            if dashboard.members.is_empty() {
                println!("No members found in this upload.");
                return Ok(());
            }

            println!("Top members by CHI score:");
            for member in pipeline::top_members(&dashboard.members, limit) {
                let s = &member.scores;
                println!(
                    "- {} ({}) CHI {} [{}] recency {:.0}, engagement {:.0}, consumption {:.0}, participation {:.0}, streak {:.0}",
                    member.name,
                    member.role,
                    member.chi_score,
                    member.category,
                    s.recency,
                    s.engagement,
                    s.consumption,
                    s.participation,
                    s.streak
                );
            }
        }
        Commands::Report { out, limit } => {
            let dashboard = store::dashboard_from_path(&cli.csv, now)
                .await
                .with_context(|| format!("failed to build report from {}", cli.csv.display()))?;
            let report = report::build_report(&dashboard, now, limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
