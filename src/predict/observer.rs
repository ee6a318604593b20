use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::predict::error::PredictError;
use crate::predict::zone::ZoneResolver;

// WGS-84
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_POLAR_RADIUS_KM: f64 = 6356.7523142;

/// A ground observer fixed for the duration of one prediction call
#[derive(Debug, Clone, Copy)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub timezone: Tz,
    /// Reference instant every relative window is computed from
    pub now: DateTime<Utc>,
}

impl Observer {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Result<Self, PredictError> {
        validate_coordinates(latitude_deg, longitude_deg)?;
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m: 0.0,
            timezone,
            now,
        })
    }

    /// Build an observer, resolving its timezone from the coordinates
    pub fn locate(
        latitude_deg: f64,
        longitude_deg: f64,
        now: DateTime<Utc>,
        zones: &dyn ZoneResolver,
    ) -> Result<Self, PredictError> {
        validate_coordinates(latitude_deg, longitude_deg)?;
        let timezone = zones.resolve(latitude_deg, longitude_deg)?;
        Self::new(latitude_deg, longitude_deg, timezone, now)
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let a = EARTH_EQUATORIAL_RADIUS_KM;
        let f = (EARTH_EQUATORIAL_RADIUS_KM - EARTH_POLAR_RADIUS_KM) / EARTH_EQUATORIAL_RADIUS_KM;
        let e2 = 2.0 * f - f * f;
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        let x = (n + alt_km) * cos_lat * lon.cos();
        let y = (n + alt_km) * cos_lat * lon.sin();
        let z = (n * (1.0 - e2) + alt_km) * sin_lat;
        [x, y, z]
    }
}

fn validate_coordinates(latitude_deg: f64, longitude_deg: f64) -> Result<(), PredictError> {
    let valid = (-90.0..=90.0).contains(&latitude_deg) && (-180.0..=180.0).contains(&longitude_deg);
    if valid {
        Ok(())
    } else {
        Err(PredictError::InvalidCoordinates {
            latitude: latitude_deg,
            longitude: longitude_deg,
        })
    }
}
