mod config;
mod db;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;

    let pool = db::init_pool(&config)
        .await
        .expect("database init failed");

    let state = state::AppState::new(pool, config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "clubhouse listening");
    axum::serve(listener, app).await.expect("server failed");
}
