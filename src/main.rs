//! TCGDESK — Pokémon trading-card inventory and pricing desk
//!
//! Entry point. Loads configuration, initialises structured logging,
//! validates the release catalog and seed inventory (fail fast), and
//! serves the dashboard until shutdown.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use tcgdesk::catalog::ReleaseCatalog;
use tcgdesk::config::AppConfig;
use tcgdesk::dashboard::{self, DeskState};
use tcgdesk::inventory::Inventory;
use tcgdesk::lookup::pokemontcg::PokemonTcgClient;
use tcgdesk::lookup::CardLookup;
use tcgdesk::pricing::PricingEngine;

const BANNER: &str = r#"
 _____ ____ ____ ____  _____ ____  _  __
|_   _/ ___/ ___|  _ \| ____/ ___|| |/ /
  | || |  | |  _| | | |  _| \___ \| ' /
  | || |__| |_| | |_| | |___ ___) | . \
  |_| \____\____|____/|_____|____/|_|\_\

  Trading Card Inventory & Pricing Desk
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        shop = %cfg.shop.name,
        dashboard_port = cfg.dashboard.port,
        "TCGDESK starting up"
    );

    // -- Load static data (fail fast on a bad catalog) ---------------------

    let catalog = ReleaseCatalog::load(&cfg.catalog.path)
        .context("Release catalog failed validation")?;
    let inventory = Inventory::load(&cfg.inventory.path)
        .context("Seed inventory failed to load")?;

    // -- Initialise components ---------------------------------------------

    let api_key = match cfg.lookup.api_key_env.as_deref() {
        Some(env_name) => match AppConfig::resolve_env(env_name) {
            Ok(key) => Some(key),
            Err(_) => {
                warn!(env = env_name, "Lookup API key env var not set, using anonymous rate limit");
                None
            }
        },
        None => None,
    };

    let lookup: Arc<dyn CardLookup> = Arc::new(PokemonTcgClient::new(
        api_key,
        cfg.lookup.base_url.clone(),
        cfg.lookup.page_size,
    )?);
    info!(service = lookup.name(), "Card lookup client ready");

    let engine = PricingEngine::new(catalog);
    let state = Arc::new(DeskState::new(
        cfg.shop.name.clone(),
        lookup,
        engine,
        inventory,
    ));

    // -- Serve the dashboard -------------------------------------------------

    if !cfg.dashboard.enabled {
        warn!("Dashboard disabled in config — nothing to serve, exiting");
        return Ok(());
    }

    let app = dashboard::build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.dashboard.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {}", cfg.dashboard.port))?;

    info!(port = cfg.dashboard.port, "Dashboard serving on http://localhost:{}", cfg.dashboard.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server error")?;

    info!("TCGDESK shut down cleanly.");
    Ok(())
}

/// Resolve when a shutdown signal arrives.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tcgdesk=info"));

    let json_logging = std::env::var("TCGDESK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
