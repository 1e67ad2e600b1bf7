use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod models;
mod services;
mod store;

use auth::rate_limit::{RateLimitState, WindowPolicy};
use config::{Config, StoreBackend};
use store::{AccountStore, MemoryStore, PgStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        accounts: Arc<dyn AccountStore>,
        config: Config,
    ) -> Self {
        let rate_limiter = RateLimitState::new(WindowPolicy::from_config(&config));
        Self {
            records,
            accounts,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easemind_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let (records, accounts): (Arc<dyn RecordStore>, Arc<dyn AccountStore>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;
                let pool = db::create_pool(url)
                    .await
                    .context("Failed to connect to the database")?;
                let store = PgStore::new(pool);
                store
                    .migrate()
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
                let store = Arc::new(store);
                (store.clone() as Arc<dyn RecordStore>, store as Arc<dyn AccountStore>)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn RecordStore>, store as Arc<dyn AccountStore>)
            }
        };

    let auto_grow = config.garden_auto_grow_secs.map(Duration::from_secs);
    let addr = config.listen_addr();
    let state = AppState::new(records, accounts, config);

    let policy = state.rate_limiter.policy();
    tracing::info!(
        max_requests = policy.max_requests,
        window_secs = policy.window.as_secs(),
        "Auth rate limit configured"
    );
    state.rate_limiter.spawn_cleanup_worker();
    if let Some(every) = auto_grow {
        tracing::info!(interval_secs = every.as_secs(), "Garden auto-grow enabled");
        services::garden::spawn_auto_grow_worker(state.records.clone(), every);
    }

    let app = app::build_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    // connect info feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
