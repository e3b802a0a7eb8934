use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use stratus::{
    config::Config, model::app::AppState, router, service::weather::WeatherLookupService, startup,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let providers = startup::build_provider_chain(&config).unwrap();
    let db = startup::connect_to_database(&config).await.unwrap();
    let cache = startup::connect_to_cache(&config).await.unwrap();

    let lookup = WeatherLookupService::new(db, Arc::new(cache), providers);
    let router = router::routes().with_state(AppState { lookup });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!("Starting server on {}", config.listen_addr);

    axum::serve(listener, router).await.expect("Server error");
}
