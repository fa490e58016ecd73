use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    services::region_service::RegionClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub regions: RegionClient,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> anyhow::Result<Self> {
        let regions = RegionClient::new(&config.regions)?;
        Ok(Self {
            pool,
            orm,
            config,
            regions,
        })
    }
}
