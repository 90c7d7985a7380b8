use std::sync::Arc;

use engine::Reconciler;
use migration::{Migrator, MigratorTrait};
use settings::Database;
use tokio::sync::watch;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "rentbook={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .settings(settings.engine.to_engine_settings()?)
        .build()
        .await?;
    let engine = Arc::new(engine);
    tracing::info!(
        timezone = %engine.settings().timezone,
        "engine ready"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = Reconciler::new(Arc::clone(&engine)).interval(settings.reconciler.interval());
    tasks.spawn(reconciler.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    shutdown_tx.send(true)?;

    while tasks.join_next().await.is_some() {}

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
