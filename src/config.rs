use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::predict::{
    parse_zone, FixedZone, PredictError, Satellite, SatelliteCatalog, TzfResolver, ZoneResolver,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid timezone override: {0}")]
    Timezone(#[from] PredictError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub satellites: Vec<Satellite>,
    #[serde(default)]
    pub tle_folder: Option<PathBuf>,
    /// Standard magnitude for satellites read from `tle_folder`
    #[serde(default = "default_std_mag")]
    pub default_std_mag: f64,
    #[serde(default)]
    pub web: WebConfig,
    /// IANA zone used for every observer instead of the coordinate lookup
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_std_mag() -> f64 {
    4.0
}

pub type SharedZoneResolver = Arc<dyn ZoneResolver + Send + Sync>;

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Catalog of the configured satellites plus any found in `tle_folder`
    pub fn catalog(&self) -> SatelliteCatalog {
        let mut catalog = SatelliteCatalog::from_satellites(self.satellites.clone());

        if let Some(ref folder) = self.tle_folder {
            if let Err(e) = catalog.load_tle_folder(folder, self.default_std_mag) {
                log::warn!("Failed to load TLE folder {}: {}", folder.display(), e);
            }
        }

        if catalog.is_empty() {
            log::warn!("Catalog is empty, no satellites configured");
        } else {
            log::info!("Catalog holds {} satellites", catalog.len());
        }
        catalog
    }

    pub fn zone_resolver(&self) -> Result<SharedZoneResolver, ConfigError> {
        match self.timezone {
            Some(ref name) => Ok(Arc::new(FixedZone(parse_zone(name)?))),
            None => Ok(Arc::new(TzfResolver::new())),
        }
    }
}
