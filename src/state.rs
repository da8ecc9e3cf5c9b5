use std::sync::Arc;

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{catalog::CatalogClient, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: CatalogClient,
    pub config: Config,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, anyhow::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(5)
            .max_connections(30)
            .connect_lazy_with(config.database.with_db());

        if config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed running migrations")?;
        }

        let catalog =
            CatalogClient::new(&config.catalog).context("Failed building catalog client")?;

        Ok(AppState {
            pool,
            catalog,
            config,
        })
    }
}
