use chrono::{DateTime, NaiveTime, Utc};
use sgp4::{Constants, Elements};
use std::f64::consts::PI;

use crate::predict::error::PredictError;
use crate::predict::geometry::{vec_diff, vec_mag};
use crate::predict::observer::{Observer, EARTH_EQUATORIAL_RADIUS_KM, EARTH_POLAR_RADIUS_KM};

const GEODETIC_ITERATIONS: usize = 20;

/// SGP4 propagation handle built once per element set
pub struct Propagator {
    elements: Elements,
    constants: Constants,
}

/// Satellite direction and distance as seen by a ground observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    /// Earth-centred inertial (TEME) position the angles were derived from
    pub position_eci_km: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl Propagator {
    pub fn from_tle(name: &str, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let invalid = |message: String| PredictError::InvalidTle {
            satellite: name.to_string(),
            message,
        };
        let elements = Elements::from_tle(
            Some(name.to_string()),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            elements,
            constants,
        })
    }

    /// UTC midnight of the element set's epoch day, Unix seconds
    pub fn epoch_day_start(&self) -> i64 {
        self.elements
            .datetime
            .date()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp()
    }

    pub fn position_eci_km(&self, instant: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let prediction = self.constants.propagate(minutes)?;
        Ok(prediction.position)
    }

    pub fn look_angles(
        &self,
        observer: &Observer,
        instant: DateTime<Utc>,
    ) -> Result<LookAngles, PredictError> {
        let position_eci_km = self.position_eci_km(instant)?;
        let sat_ecef = teme_to_ecef_position(position_eci_km, gmst_rad(instant));
        let dr = vec_diff(sat_ecef, observer.position_ecef_km());
        let range_km = vec_mag(dr);

        let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
        let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
        let elevation_deg = if range_km > 0.0 {
            (up / range_km).asin().to_degrees()
        } else {
            0.0
        };

        Ok(LookAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
            position_eci_km,
        })
    }

    /// Sub-satellite point and height above the WGS-84 ellipsoid
    pub fn geodetic(&self, instant: DateTime<Utc>) -> Result<Geodetic, PredictError> {
        let position = self.position_eci_km(instant)?;
        Ok(eci_to_geodetic(position, gmst_rad(instant)))
    }
}

pub fn gmst_rad(instant: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn eci_to_geodetic(pos_eci: [f64; 3], gmst: f64) -> Geodetic {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let f = (EARTH_EQUATORIAL_RADIUS_KM - EARTH_POLAR_RADIUS_KM) / EARTH_EQUATORIAL_RADIUS_KM;
    let e2 = 2.0 * f - f * f;
    let [x, y, z] = pos_eci;
    let r = (x * x + y * y).sqrt();

    let mut longitude = y.atan2(x) - gmst;
    while longitude < -PI {
        longitude += 2.0 * PI;
    }
    while longitude > PI {
        longitude -= 2.0 * PI;
    }

    let mut latitude = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (z + a * c * e2 * sin_lat).atan2(r);
    }

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: r / latitude.cos() - a * c,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    pub const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    pub const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    pub fn iss() -> Propagator {
        Propagator::from_tle("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).unwrap()
    }

    pub fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_epoch_day() {
        let propagator = iss();
        let day_start = Utc.with_ymd_and_hms(2020, 7, 12, 0, 0, 0).unwrap();
        assert_eq!(propagator.epoch_day_start(), day_start.timestamp());
        let epoch = propagator.elements.datetime.and_utc();
        assert!(epoch > day_start);
        assert!(epoch < day_start + Duration::days(1));
    }

    #[test]
    fn rejects_corrupted_element_set() {
        let broken = ISS_LINE2.replace("51.6461", "51.6X61");
        let result = Propagator::from_tle("ISS (ZARYA)", ISS_LINE1, &broken);
        assert!(matches!(result, Err(PredictError::InvalidTle { .. })));
    }

    #[test]
    fn iss_orbits_at_low_altitude() {
        let propagator = iss();
        for hours in 0..12 {
            let instant = reference_now() + Duration::hours(hours);
            let position = propagator.geodetic(instant).unwrap();
            assert!(position.altitude_km > 380.0 && position.altitude_km < 460.0);
            assert!(position.latitude_deg.abs() <= 52.0);
            assert!((-180.0..=180.0).contains(&position.longitude_deg));
        }
    }

    #[test]
    fn look_angles_stay_in_range() {
        let propagator = iss();
        let observer = Observer::new(47.4979, 19.0402, chrono_tz::UTC, reference_now()).unwrap();
        for minutes in (0..180).step_by(7) {
            let look = propagator
                .look_angles(&observer, reference_now() + Duration::minutes(minutes))
                .unwrap();
            assert!((0.0..360.0).contains(&look.azimuth_deg));
            assert!((-90.0..=90.0).contains(&look.elevation_deg));
            assert!(look.range_km > 380.0);
        }
    }

    #[test]
    fn enu_of_local_vertical_is_up() {
        let lat = 30.0_f64.to_radians();
        let lon = 45.0_f64.to_radians();
        let dr = [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()];
        let (east, north, up) = ecef_to_enu(dr, lat, lon);
        assert_abs_diff_eq!(east, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(north, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(up, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn geodetic_of_equatorial_point() {
        let geodetic = eci_to_geodetic([EARTH_EQUATORIAL_RADIUS_KM + 500.0, 0.0, 0.0], 0.0);
        assert_abs_diff_eq!(geodetic.latitude_deg, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(geodetic.longitude_deg, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(geodetic.altitude_km, 500.0, epsilon = 1e-6);
    }
}
