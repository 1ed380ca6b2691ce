use std::net::SocketAddr;
use std::sync::Arc;

use a4l_core::accounts::AccountService;
use a4l_core::notify::Notifier;
use a4l_core::registry::RoleRegistry;
use a4l_db::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use a4l_api::config::{ServerConfig, SuperadminSeed};
use a4l_api::notifications::email::{EmailConfig, SmtpNotifier};
use a4l_api::notifications::LogNotifier;
use a4l_api::router::build_app_router;
use a4l_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "a4l_api=debug,a4l_core=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let store = Arc::new(connect_store().await);
    let notifier = build_notifier(config.email.as_ref());
    bootstrap(&store, notifier.as_ref(), config.bootstrap_superadmin.as_ref()).await;

    let app = build_app_router(AppState::new(store, notifier, config.clone()), &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Serving");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect to `DATABASE_URL`, check it answers and apply migrations.
async fn connect_store() -> PgStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = a4l_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    a4l_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    a4l_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    PgStore::new(pool)
}

/// SMTP when configured, otherwise notifications only reach the log.
fn build_notifier(email: Option<&EmailConfig>) -> Arc<dyn Notifier> {
    match email {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpNotifier::new(email).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    }
}

/// Seed the system roles and, when configured, the first superadmin.
async fn bootstrap(store: &PgStore, notifier: &dyn Notifier, seed: Option<&SuperadminSeed>) {
    let roles = RoleRegistry::new(store)
        .bootstrap()
        .await
        .expect("Failed to seed system roles");
    tracing::info!(count = roles.len(), "System roles ready");

    let Some(seed) = seed else {
        return;
    };
    let created = AccountService::new(store, notifier)
        .ensure_superadmin(&seed.username, &seed.email, &seed.password)
        .await
        .expect("Failed to create bootstrap superadmin");
    match created {
        Some(account) => tracing::info!(account_id = account.id, "Superadmin account created"),
        None => tracing::debug!(username = %seed.username, "Superadmin account already present"),
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
