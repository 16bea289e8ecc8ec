//! # Contacts API Server
//!
//! Authenticated contact management over HTTP.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` supported)
//! 2. Connect to PostgreSQL and apply embedded migrations
//! 3. Connect the Redis identity cache
//! 4. Choose mail and media backends (disabled when unconfigured)
//! 5. Serve until Ctrl+C, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p contacts-api
//! ```

use anyhow::Context;
use contacts_api::{
    app::{build_router, AppState},
    config::Config,
};
use contacts_shared::{
    auth::jwt::TokenIssuer,
    cache::RedisIdentityCache,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    services::{
        AuthGateway, CloudinaryMedia, ContactsGateway, DisabledMailer, DisabledMedia, Mailer,
        MediaStore, SmtpMailer,
    },
    store::{PgContactStore, PgUserStore},
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "contacts_api=debug,contacts_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.mail {
        Some(smtp) => {
            tracing::info!(server = %smtp.server, port = smtp.port, "SMTP mailer enabled");
            Ok(Arc::new(SmtpMailer::new(smtp).context("Invalid SMTP configuration")?))
        }
        None => {
            tracing::warn!("MAIL_USERNAME not set, verification emails are disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

fn build_media(config: &Config) -> anyhow::Result<Arc<dyn MediaStore>> {
    match &config.media {
        Some(cloudinary) => {
            tracing::info!(cloud = %cloudinary.cloud_name, "Cloudinary avatar uploads enabled");
            Ok(Arc::new(CloudinaryMedia::new(cloudinary.clone())?))
        }
        None => {
            tracing::warn!("Cloudinary not configured, avatar uploads are disabled");
            Ok(Arc::new(DisabledMedia))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read .env before the log filter is built
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Contacts API v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let cache = RedisIdentityCache::connect(config.redis.clone())
        .await
        .context("Failed to connect to Redis")?;
    if !matches!(cache.ping().await, Ok(true)) {
        tracing::warn!("Redis did not answer PING, identity lookups will fall back to the database");
    }

    let tokens = TokenIssuer::new(
        config.jwt.secret.clone(),
        chrono::Duration::minutes(config.jwt.access_token_expire_minutes),
    );

    let auth = AuthGateway::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(cache),
        build_mailer(&config)?,
        build_media(&config)?,
        tokens,
    )
    .with_cache_ttl(Duration::from_secs(config.cache.user_ttl_secs))
    .with_base_url(config.api.base_url.clone());

    let contacts = ContactsGateway::new(Arc::new(PgContactStore::new(pool.clone())));

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(auth, contacts, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
