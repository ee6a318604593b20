use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

use crate::predict::error::PredictError;

/// Maps a geographic location to its IANA timezone
pub trait ZoneResolver {
    fn resolve(&self, latitude_deg: f64, longitude_deg: f64) -> Result<Tz, PredictError>;
}

/// Offline lookup against the bundled timezone boundary polygons
pub struct TzfResolver {
    finder: DefaultFinder,
}

impl TzfResolver {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneResolver for TzfResolver {
    fn resolve(&self, latitude_deg: f64, longitude_deg: f64) -> Result<Tz, PredictError> {
        let name = self.finder.get_tz_name(longitude_deg, latitude_deg);
        if name.is_empty() {
            return Err(PredictError::TimezoneNotFound {
                latitude: latitude_deg,
                longitude: longitude_deg,
            });
        }
        parse_zone(name)
    }
}

/// Always answers with the same zone, whatever the location
#[derive(Debug, Clone, Copy)]
pub struct FixedZone(pub Tz);

impl ZoneResolver for FixedZone {
    fn resolve(&self, _latitude_deg: f64, _longitude_deg: f64) -> Result<Tz, PredictError> {
        Ok(self.0)
    }
}

pub fn parse_zone(name: &str) -> Result<Tz, PredictError> {
    name.parse::<Tz>()
        .map_err(|_| PredictError::UnknownTimezone(name.to_string()))
}
