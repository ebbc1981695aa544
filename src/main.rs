use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use shoprec::catalog::ProductCatalog;
use shoprec::catalog::simulator::CatalogSimulator;
use shoprec::config::Config;
use shoprec::logging;
use shoprec::recommend::{Algorithm, RecommendationEngine};
use shoprec::server::{RecommendationService, MAX_LIMIT};
use shoprec::store::InteractionStore;
use shoprec::store::memory::InMemoryInteractionStore;
use rmcp::ServiceExt;

#[derive(Parser)]
#[command(name = "shoprec", version, about = "Multi-marketplace product recommendation MCP server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON product catalog to load instead of the built-in dataset
    #[arg(long, env = "SHOPREC_CATALOG_PATH")]
    catalog: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the catalog's categories and exit
    Categories,
    /// Run one recommendation request for a fresh user and print it as JSON
    Recommend {
        /// User id to recommend for
        #[arg(long, default_value = "cli")]
        user: String,
        /// hybrid, collaborative, content, popular or trending
        #[arg(long, default_value = "hybrid")]
        algorithm: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Load the configured catalog, or the built-in one.
fn load_catalog(path: Option<&str>) -> Result<ProductCatalog> {
    match path {
        Some(path) => {
            let catalog = ProductCatalog::from_path(path)?;
            tracing::info!(path = %path, "Catalog loaded from file");
            Ok(catalog)
        }
        None => Ok(ProductCatalog::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog.clone();
    }

    // 3. Initialize logging before anything else can emit output.
    // Logging goes to stderr only; stdout is reserved for JSON-RPC.
    logging::init_logging(&config);

    // 4. Build the shared catalog, store and engine
    let catalog = Arc::new(load_catalog(config.catalog_path.as_deref())?);
    let store: Arc<dyn InteractionStore + Send + Sync> = Arc::new(InMemoryInteractionStore::new());
    let engine = Arc::new(RecommendationEngine::new(catalog.clone(), store));

    match cli.command {
        Some(Commands::Categories) => {
            for category in engine.categories().await {
                println!("{}", category);
            }
            return Ok(());
        }

        Some(Commands::Recommend { user, algorithm, limit }) => {
            let resolved = Algorithm::resolve(Some(&algorithm));
            if let Some(ref requested) = resolved.unrecognized {
                tracing::warn!(requested = %requested, "Unknown algorithm, using hybrid");
            }
            let limit = limit.unwrap_or(config.default_limit);
            if limit == 0 {
                anyhow::bail!("--limit must be a positive integer");
            }
            let limit = limit.min(MAX_LIMIT) as usize;
            let results = engine.recommend(&user, resolved.algorithm, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        None => {
            // Default: start the MCP server
            let product_count = catalog.len().await;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                products = product_count,
                "shoprec server starting"
            );

            // 5. Start catalog drift if enabled
            if config.simulator.enabled {
                tracing::info!(
                    interval_secs = config.simulator.interval_secs,
                    "Catalog simulator started"
                );
                CatalogSimulator::new(catalog.clone(), config.simulator.clone()).spawn();
            } else {
                tracing::info!("Catalog simulator disabled via config (simulator.enabled=false)");
            }

            // 6. Serve via stdio transport
            let service = RecommendationService::new(engine, config.default_limit);
            let (stdin, stdout) = rmcp::transport::io::stdio();
            let server = service.serve((stdin, stdout)).await?;

            tracing::info!("shoprec server running, awaiting tool calls via stdio");

            // 7. Wait for shutdown (client disconnects or signal)
            server.waiting().await?;

            tracing::info!("shoprec server stopped");
        }
    }

    Ok(())
}
