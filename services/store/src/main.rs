use anyhow::Context;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use akeshya_core::config::Config;
use akeshya_core::tracing::{init_tracing, init_tracing_with_file};
use akeshya_store::config::StoreConfig;
use akeshya_store::infra::email::{HttpEmailSender, LogEmailSender, Mailer};
use akeshya_store::infra::seed;
use akeshya_store::infra::storage::LocalFileStorage;
use akeshya_store::router::build_router;
use akeshya_store::state::AppState;
use akeshya_store_migration::Migrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StoreConfig::try_from_env().context("failed to load configuration")?;

    let _log_guard = match config.log_dir.as_deref() {
        Some(dir) => Some(init_tracing_with_file(dir, "store")),
        None => {
            init_tracing();
            None
        }
    };

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("failed to apply migrations")?;
    }
    if config.seed_admin {
        seed::run(&db).await?;
    }

    let storage = LocalFileStorage::init(&config.upload_dir).await?;

    let mailer = match config.email_api_url {
        Some(api_url) => Mailer::Http(HttpEmailSender {
            client: reqwest::Client::new(),
            api_url,
            api_key: config.email_api_key,
            from: config.email_from,
        }),
        None => {
            tracing::warn!("EMAIL_API_URL not set, OTP mails are only logged");
            Mailer::Log(LogEmailSender)
        }
    };

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        jwt_ttl_secs: config.jwt_expiration_secs,
        storage,
        mailer,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.store_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("store service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
