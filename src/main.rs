mod config;
mod errors;
mod mmm;
mod server;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("meridian_mmm starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&cfg.upload_dir) {
        tracing::error!(dir = %cfg.upload_dir.display(), "upload dir error: {e}");
        std::process::exit(1);
    }

    tracing::info!(
        cut_below = cfg.thresholds.cut_below,
        increase_from = cfg.thresholds.increase_from,
        seed = cfg.series_seed,
        weeks = cfg.series_weeks,
        origins = cfg.cors_origins.len(),
        "configuration loaded"
    );

    let port = cfg.server_port;
    let app_state = AppState::new(cfg);
    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
