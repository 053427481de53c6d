mod api;
mod middleware;
mod scheduler;
mod sweep;
#[cfg(test)]
mod test_support;
mod uvp;

use std::sync::Arc;

use rivalscope_core::TtlPolicy;
use rivalscope_providers::{HttpScanProvider, ScanProvider};
use rivalscope_store::IntelStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    uvp::UvpRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(rivalscope_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(IntelStore::new(TtlPolicy::from_app_config(&config)));
    let provider: Arc<dyn ScanProvider> = Arc::new(HttpScanProvider::from_app_config(&config)?);
    let state = AppState {
        store,
        provider,
        uvp: Arc::new(UvpRegistry::new()),
        config: Arc::clone(&config),
    };

    let _scheduler = scheduler::build_scheduler(state.clone()).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        rivalscope_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "rivalscope-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
