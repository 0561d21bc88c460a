use std::path::PathBuf;

use agent_ranker::{db, pipeline, report, Inquiry, ScoringWeights};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agent-ranker")]
#[command(about = "Recommend the best agent for a new customer inquiry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Rank agents for an inquiry
    Rank {
        #[command(flatten)]
        inquiry: InquiryArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report for an inquiry
    Report {
        #[command(flatten)]
        inquiry: InquiryArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct InquiryArgs {
    #[arg(long)]
    customer: String,
    #[arg(long)]
    communication_method: String,
    #[arg(long)]
    lead_source: String,
    #[arg(long)]
    destination: String,
    #[arg(long)]
    launch_location: String,
    /// TOML file overriding the scoring weights
    #[arg(long)]
    config: Option<PathBuf>,
}

impl InquiryArgs {
    fn inquiry(&self) -> Inquiry {
        Inquiry {
            customer_name: self.customer.clone(),
            communication_method: self.communication_method.clone(),
            lead_source: self.lead_source.clone(),
            destination: self.destination.clone(),
            launch_location: self.launch_location.clone(),
        }
    }

    fn weights(&self) -> anyhow::Result<ScoringWeights> {
        match &self.config {
            Some(path) => Ok(ScoringWeights::load_from_path(path)?),
            None => Ok(ScoringWeights::default()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Rank {
            inquiry,
            limit,
            format,
        } => {
            let weights = inquiry.weights()?;
            let inquiry = inquiry.inquiry();
            inquiry.validate()?;
            let snapshot = db::load_snapshot(&pool).await?;
            let recommendation = pipeline::rank(&snapshot, &inquiry, &weights)?;
            let rows = report::ranking_rows(&recommendation, limit);

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                OutputFormat::Csv => {
                    report::write_csv(std::io::stdout().lock(), &rows)?;
                }
                OutputFormat::Text => {
                    print!("{}", report::build_text(&recommendation, limit));
                }
            }
        }
        Commands::Report {
            inquiry,
            limit,
            out,
        } => {
            let weights = inquiry.weights()?;
            let inquiry = inquiry.inquiry();
            inquiry.validate()?;
            let snapshot = db::load_snapshot(&pool).await?;
            let recommendation = pipeline::rank(&snapshot, &inquiry, &weights)?;
            let report = report::build_report(&recommendation, limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
