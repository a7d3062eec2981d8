//! Creator Commerce server binary.
//!
//! Wires configuration, Postgres adapters and the Stripe gateway into the
//! purchase router and serves it until Ctrl+C / SIGTERM.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use creator_commerce::adapters::fees::ConfiguredFeeSchedule;
use creator_commerce::adapters::http::{app_router, PurchaseAppState};
use creator_commerce::adapters::postgres::{
    PostgresContentReader, PostgresPurchaseReader, PostgresPurchaseRepository,
};
use creator_commerce::adapters::stripe::{StripeCheckoutGateway, StripeConfig};
use creator_commerce::config::AppConfig;
use creator_commerce::domain::payment::WebhookVerifier;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "Configuration loaded"
    );

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let mut stripe = StripeConfig::new(config.payment.stripe_api_key.clone())
        .with_timeout(config.server.request_timeout());
    if let Some(base_url) = &config.payment.stripe_api_base_url {
        stripe = stripe.with_base_url(base_url.clone());
    }

    let webhook_verifier = WebhookVerifier::new(config.payment.stripe_webhook_secret.clone())
        .with_require_livemode(config.payment.require_livemode);

    let state = PurchaseAppState {
        content_reader: Arc::new(PostgresContentReader::new(pool.clone())),
        purchase_repository: Arc::new(PostgresPurchaseRepository::new(pool.clone())),
        purchase_reader: Arc::new(PostgresPurchaseReader::new(pool.clone())),
        payment_gateway: Arc::new(StripeCheckoutGateway::new(stripe)?),
        fee_source: Arc::new(ConfiguredFeeSchedule::new(config.fees.schedule()?)),
        webhook_verifier: Arc::new(webhook_verifier),
        checkout_policy: config.checkout_policy()?,
    };

    let app = app_router(
        state,
        config.server.request_timeout(),
        &config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Creator Commerce listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
