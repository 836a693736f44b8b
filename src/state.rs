use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    db,
    memory::{MemoryTaskRepo, MemoryUserRepo},
    tasks::repo::{PgTaskRepo, TaskRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub tasks: Arc<dyn TaskRepo>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres and applies migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        Self::from_pool(pool, config)
    }

    pub fn from_pool(pool: PgPool, config: AppConfig) -> anyhow::Result<Self> {
        Self::from_parts(
            Arc::new(PgUserRepo::new(pool.clone())),
            Arc::new(PgTaskRepo::new(pool)),
            config,
        )
    }

    /// Fails when the signing secret is unusable, so a bad deployment never
    /// starts serving requests.
    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        tasks: Arc<dyn TaskRepo>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt)?;
        Ok(Self {
            users,
            tasks,
            keys,
            config: Arc::new(config),
        })
    }

    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        Self::from_parts(
            Arc::new(MemoryUserRepo::default()),
            Arc::new(MemoryTaskRepo::default()),
            config,
        )
    }
}
