use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sendlater::api;
use sendlater::config::Config;
use sendlater::jobs::{MongoStore, Scheduler};
use sendlater::mail::SmtpMailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = Arc::new(Config::from_env().context("loading configuration from environment")?);
    let port = config.port;

    let store = MongoStore::connect(&config.database_url)
        .await
        .context("could not connect to DATABASE_URL")?;
    let mailer = SmtpMailer::from_env().context("could not configure SMTP mailer")?;

    let scheduler = Scheduler::new(Arc::new(mailer)).await?;
    let armed = scheduler.rehydrate(&store).await?;
    tracing::info!(armed, "re-armed scheduled emails from store");
    scheduler.start().await?;

    let ctx = api::Context {
        config,
        store: Arc::new(store),
        scheduler: Arc::new(scheduler),
    };

    sendlater::serve((Ipv4Addr::UNSPECIFIED, port), api::router(ctx))
        .await
        .context("error running HTTP server")?;
    Ok(())
}
