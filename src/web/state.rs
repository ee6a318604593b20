use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{Config, ConfigError, SharedZoneResolver};
use crate::predict::{PredictError, SatelliteCatalog};
use crate::web::api::error::ApiResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Mutex<SatelliteCatalog>>,
    pub zones: SharedZoneResolver,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let zones = config.zone_resolver()?;
        let catalog = config.catalog();
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(Mutex::new(catalog)),
            zones,
        })
    }

    /// Run engine work against the catalog on the blocking pool
    pub async fn with_catalog<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SatelliteCatalog) -> Result<T, PredictError> + Send + 'static,
    {
        let catalog = self.catalog.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut catalog = catalog.lock().unwrap_or_else(PoisonError::into_inner);
            work(&mut catalog)
        })
        .await?;
        Ok(result?)
    }
}
