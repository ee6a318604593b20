mod catalog;
mod classify;
mod engine;
mod error;
mod format;
mod geometry;
mod observer;
mod propagation;
mod ranger;
mod scanner;
mod solar;
mod types;
mod zone;

pub use catalog::{Satellite, SatelliteCatalog};
pub use engine::{current_position, predict_all, satellite_path, DEFAULT_PATH_MINUTES};
pub use error::PredictError;
pub use observer::Observer;
pub use types::*;
pub use zone::{parse_zone, FixedZone, TzfResolver, ZoneResolver};
