mod commands;

use catsync_core::Source;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catsync")]
#[command(about = "Dealer and retail catalog synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download a catalog chunk by chunk, then finalize it
    Download {
        /// Catalog to download (dealer or retail)
        source: Source,
        /// Page to start from; resume an interrupted run with the page it reported
        #[arg(long, default_value = "1")]
        start_page: u32,
        /// Stop after this many chunks
        #[arg(long)]
        max_chunks: Option<u32>,
        /// Leave the staging file in place instead of finalizing
        #[arg(long)]
        no_finalize: bool,
    },
    /// Promote the staged download of a catalog to its snapshot
    Finalize {
        source: Source,
    },
    /// Discard download progress and staging for one catalog, or both
    Clear {
        source: Option<Source>,
    },
    /// Show the in-flight download progress of a catalog
    Status {
        source: Source,
    },
    /// Fetch the first page of a catalog to verify the request descriptor
    Check {
        source: Source,
    },
    /// Count local products matched in the dealer and retail snapshots
    Analyze,
    /// List dealer products missing from the local catalog
    Missing,
    /// Reprice dealer-linked local products
    UpdatePrices,
    /// Show the simple/variable decision for every dealer product
    Classify,
    /// Create or update local products from the dealer snapshot
    Import,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = catsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, data_dir = %config.data_dir.display(), "configuration loaded");
    let sync = catsync_engine::CatalogSync::open(config)?;

    match cli.command {
        Commands::Download {
            source,
            start_page,
            max_chunks,
            no_finalize,
        } => commands::run_download(&sync, source, start_page, max_chunks, no_finalize).await,
        Commands::Finalize { source } => commands::emit("finalize", sync.finalize(source)),
        Commands::Clear { source } => commands::emit("clear", sync.clear_progress(source)),
        Commands::Status { source } => commands::emit("status", sync.progress(source)),
        Commands::Check { source } => {
            commands::emit("check", sync.check_access(source).await)
        }
        Commands::Analyze => commands::emit("analyze", sync.analyze()),
        Commands::Missing => commands::emit("missing", sync.find_missing()),
        Commands::UpdatePrices => commands::emit("update-prices", sync.update_all_prices()),
        Commands::Classify => commands::emit("classify", sync.classify_all()),
        Commands::Import => commands::emit("import", sync.import_products()),
    }
}
