use dotenvy::dotenv;
use snafu::ResultExt as _;

use skillery_stats::config::{self, Config, Mode};
use skillery_stats::error::{
    ApplicationError, ConnectDatabaseSnafu, DashboardSnafu, OutputSnafu, SignalSnafu,
};
use skillery_stats::{logger, time, Dashboard, Database, Located, MemoryCache, SnapshotRecorder};

const CONNECT_ATTEMPTS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = config::load()?;

    let _guard = logger::init(&config)?;

    let database = Database::connect_with_retry(&config.database, CONNECT_ATTEMPTS)
        .await
        .context(ConnectDatabaseSnafu)?;

    let outcome = match config.dashboard.mode {
        Mode::Report => report(&config, database).await,
        Mode::Record => record(database).await,
    };

    outcome.inspect_err(|error| {
        tracing::error!(%error, location = %error.location(), "skillery-stats stopped with an error");
    })
}

/// Print the dashboard figures once.
///
/// The cache lives only as long as this process, so every report reads the store. The
/// read-through path pays off when a [Dashboard] is kept and queried repeatedly.
async fn report(config: &Config, database: Database) -> Result<(), ApplicationError> {
    let dashboard =
        Dashboard::new(database, MemoryCache::new()).with_ttl(config.dashboard.cache_ttl());

    let stats = dashboard
        .stats()
        .await
        .inspect_err(|error| {
            tracing::warn!(%error, location = %error.location(), "could not compute dashboard stats");
        })
        .context(DashboardSnafu)?;
    println!("{}", serde_json::to_string_pretty(&stats).context(OutputSnafu)?);

    if let Some(instructor) = &config.dashboard.instructor {
        let growth = dashboard
            .subscription_growth(instructor, time::now())
            .await
            .context(DashboardSnafu)?;
        println!("{}", serde_json::to_string_pretty(&growth).context(OutputSnafu)?);
    }

    Ok(())
}

async fn record(database: Database) -> Result<(), ApplicationError> {
    let recorder = SnapshotRecorder::spawn(database);
    tracing::info!("snapshot recorder started, press ctrl-c to stop");

    tokio::signal::ctrl_c().await.context(SignalSnafu)?;

    tracing::info!("shutting down");
    recorder.shutdown().await;

    Ok(())
}
