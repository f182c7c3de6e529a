use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mirage_client::{AnyProvider, ProviderConfig, ReqwestFetcher, ScraperDistiller};
use mirage_core::CloneService;
use mirage_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "mirage", version, about = "LLM-backed website cloner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a website into a single self-contained HTML document
    Clone {
        /// Target URL to clone
        #[arg(short, long)]
        url: String,

        /// Write the document to this path instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Allow URLs that resolve to private or loopback addresses
        #[arg(long, default_value_t = false)]
        allow_private: bool,
    },

    /// List previously stored clones, newest first
    History {
        /// Number of results to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print a stored clone document by filename
    Show {
        /// Filename of the stored clone (as shown by history)
        #[arg(short, long)]
        filename: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays clean for the document
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mirage=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clone {
            url,
            out,
            allow_private,
        } => cmd_clone(&url, out.as_deref(), allow_private).await?,
        Commands::History { limit } => cmd_history(limit).await?,
        Commands::Show { filename } => cmd_show(&filename).await?,
    }

    Ok(())
}

/// Open the SQLite store configured by the environment.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to open database")?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_clone(url: &str, out: Option<&std::path::Path>, allow_private: bool) -> Result<()> {
    let provider_config = ProviderConfig::from_env()?;
    let provider = AnyProvider::from_config(&provider_config)?;

    let db = connect_db().await?;

    let mut fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
    if allow_private {
        fetcher = fetcher.allow_private_urls();
    }

    let service = CloneService::new(fetcher, ScraperDistiller::new(), provider, db.clone_repo());

    tracing::info!("Cloning {url} with {}", provider_config.kind);

    let outcome = service.clone_site(url).await?;

    if let Some(warning) = &outcome.store_warning {
        tracing::warn!("Clone succeeded but was not saved to history: {warning}");
    } else {
        tracing::info!(
            filename = %outcome.record.filename,
            "Saved to history"
        );
    }

    match out {
        Some(path) => {
            std::fs::write(path, &outcome.result.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", outcome.result.html),
    }

    Ok(())
}

async fn cmd_history(limit: usize) -> Result<()> {
    let db = connect_db().await?;
    let clones = db.clone_repo().list().await?;

    if clones.is_empty() {
        println!("No clones stored yet");
        return Ok(());
    }

    let total = clones.len();

    println!("Clone history (newest first):\n");
    for summary in clones.into_iter().take(limit) {
        println!(
            "  {} — {} ({})",
            summary.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            summary.filename,
            summary.url,
        );
    }

    println!("\nTotal: {total} clones");

    Ok(())
}

async fn cmd_show(filename: &str) -> Result<()> {
    let db = connect_db().await?;
    let record = db.clone_repo().get_by_filename(filename).await?;

    match record {
        Some(record) => {
            println!("{}", record.html);
            Ok(())
        }
        None => anyhow::bail!("No clone found for filename: {filename}"),
    }
}
