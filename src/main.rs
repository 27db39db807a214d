//! Subscription sync server
//!
//! Receives Razorpay subscription webhooks and keeps local subscription
//! records in step with the processor.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscription_sync::adapters::cache::{NoopUserCache, RedisUserCache};
use subscription_sync::adapters::http::{app_router, BillingAppState};
use subscription_sync::adapters::postgres::PostgresSubscriptionRepository;
use subscription_sync::adapters::rate_limiter::{
    InMemoryRateLimiter, RateLimitConfig, RedisRateLimiter,
};
use subscription_sync::adapters::razorpay::{RazorpayClient, RazorpayConfig};
use subscription_sync::adapters::replay::{InMemoryReplayStore, RedisReplayStore};
use subscription_sync::adapters::storage::InMemorySubscriptionRepository;
use subscription_sync::application::handlers::customer::CustomerIdentityResolver;
use subscription_sync::application::handlers::webhook::{IngressGuard, WebhookEventRouter};
use subscription_sync::config::{AppConfig, DatabaseConfig, LogFormat, RedisConfig};
use subscription_sync::domain::webhook::WebhookSignatureVerifier;
use subscription_sync::ports::{
    RateLimiter, ReplayStore, SubscriptionRepository, UserCacheInvalidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting subscription sync server"
    );

    let repository: Arc<dyn SubscriptionRepository> = match &config.database {
        Some(database) => Arc::new(PostgresSubscriptionRepository::new(connect_postgres(database).await?)),
        None => {
            tracing::warn!("No database configured, subscriptions are kept in memory");
            Arc::new(InMemorySubscriptionRepository::new())
        }
    };

    let rate_limit = RateLimitConfig::new(
        config.webhook.rate_limit_max_requests,
        config.webhook.rate_limit_window_secs,
    );

    let (rate_limiter, replay_store, user_cache): (
        Arc<dyn RateLimiter>,
        Arc<dyn ReplayStore>,
        Arc<dyn UserCacheInvalidator>,
    ) = match &config.redis {
        Some(redis) => {
            let conn = connect_redis(redis).await?;
            (
                Arc::new(RedisRateLimiter::new(conn.clone(), rate_limit)),
                Arc::new(RedisReplayStore::new(conn.clone(), config.webhook.replay_window_secs)),
                Arc::new(RedisUserCache::new(conn, config.cache.user_key_prefix.clone())),
            )
        }
        None => {
            tracing::warn!("No Redis configured, rate limits and replay keys are process-local");
            (
                Arc::new(InMemoryRateLimiter::new(rate_limit)),
                Arc::new(InMemoryReplayStore::new()),
                Arc::new(NoopUserCache),
            )
        }
    };

    let verifier = if config.payment.is_configured() {
        config.payment.webhook_secret().map(WebhookSignatureVerifier::new)
    } else {
        tracing::warn!("Razorpay credentials missing, webhooks will be refused with 503");
        None
    };

    let razorpay = Arc::new(RazorpayClient::new(
        RazorpayConfig::new(config.payment.key_id(), config.payment.key_secret())
            .with_base_url(config.payment.api_base_url()),
    ));

    let state = BillingAppState {
        ingress_guard: Arc::new(
            IngressGuard::new(verifier, rate_limiter, replay_store)
                .with_replay_window_secs(config.webhook.replay_window_secs),
        ),
        event_router: Arc::new(WebhookEventRouter::new(repository, user_cache)),
        customer_resolver: Arc::new(
            CustomerIdentityResolver::new(razorpay)
                .with_search_limit(config.webhook.customer_search_limit),
        ),
    };

    let app = app_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let registry = tracing_subscriber::registry().with(config.server.log_filter());

    match config.server.log_format() {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_postgres(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = config.pool_options().connect(&config.url).await?;
    tracing::info!("Database connection established");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

async fn connect_redis(config: &RedisConfig) -> anyhow::Result<redis::aio::MultiplexedConnection> {
    let client = config.open_client()?;
    let conn = tokio::time::timeout(config.connect_timeout(), client.get_multiplexed_async_connection())
        .await
        .map_err(|_| anyhow::anyhow!("timed out connecting to Redis at {}", config.redacted_url()))??;
    tracing::info!(url = %config.redacted_url(), "Redis connection established");
    Ok(conn)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
