use clap::Parser;
use sprunje_http::routes::router;
use sprunje_http::{AppState, Config};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let default_level = if config.debug_mode { "debug" } else { "info" };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(format!("sprunje_http={default_level},sprunje_postgres={default_level}"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = AppState::connect(&config).await?;
    let bind_addr = config.bind_addr.clone();
    let app = router(state);

    tracing::info!(%bind_addr, "starting sprunje-server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
