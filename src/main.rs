use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gestao_alugueis::{auth, notify::Provider, router, seed, today, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gestao_alugueis=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;
    info!("Database ready");

    if config.seed_demo_data {
        match seed::seed_demo_data(&pool, today()).await {
            Ok(true) => info!("Demo data created (login: {})", seed::ADMIN_USERNAME),
            Ok(false) => {}
            Err(e) => warn!("Seeding failed: {}", e),
        }
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    tokio::spawn(auth::start_session_sweeper(pool.clone()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parsing HOST/PORT")?;

    let state = AppState::new(pool, config);
    if state.notifier.provider() == Provider::Simulated {
        warn!("No e-mail provider configured, reminders will be simulated");
    }

    let app = router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
