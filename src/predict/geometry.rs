//! Sun/Earth/satellite geometry: Earth-shadow test, apparent magnitude
//! model and a low-precision solar ephemeris.
//!
//! Angles crossing a public boundary carry their unit in the name.

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

pub const SUN_TO_EARTH_DIST_KM: f64 = 147_124_525.068;
pub const EARTH_RADIUS_KM: f64 = 6378.16;
pub const SUN_RADIUS_KM: f64 = 695_510.0;
pub const ASTRONOMICAL_UNIT_KM: f64 = 149_597_870.691;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

pub fn vec_mag(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn vec_diff(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Angles describing how Earth and Sun overlap as seen from the satellite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowGeometry {
    /// Angle at the satellite between the Earth centre and the Sun
    pub phase_angle_rad: f64,
    pub earth_angular_radius_rad: f64,
    pub sun_angular_radius_rad: f64,
}

impl ShadowGeometry {
    /// Both vectors Earth-centred inertial, in km
    pub fn new(sat_eci_km: [f64; 3], sun_eci_km: [f64; 3]) -> Self {
        let a = vec_mag(sun_eci_km);
        let b = vec_mag(sat_eci_km);
        let c = vec_mag(vec_diff(sun_eci_km, sat_eci_km));

        Self {
            phase_angle_rad: ((b * b + c * c - a * a) / (2.0 * b * c)).acos(),
            earth_angular_radius_rad: (EARTH_RADIUS_KM / b).asin(),
            sun_angular_radius_rad: (SUN_RADIUS_KM / c).asin(),
        }
    }

    pub fn is_full_eclipse(&self) -> bool {
        let theta_e = self.earth_angular_radius_rad;
        let theta_s = self.sun_angular_radius_rad;
        theta_e > theta_s && self.phase_angle_rad < theta_e - theta_s
    }

    pub fn is_partial_eclipse(&self) -> bool {
        let theta_e = self.earth_angular_radius_rad;
        let theta_s = self.sun_angular_radius_rad;
        (theta_e - theta_s).abs() < self.phase_angle_rad && self.phase_angle_rad < theta_e + theta_s
    }

    pub fn is_eclipsed(&self) -> bool {
        self.is_full_eclipse() || self.is_partial_eclipse()
    }
}

pub fn is_eclipsed(sat_eci_km: [f64; 3], sun_eci_km: [f64; 3]) -> bool {
    ShadowGeometry::new(sat_eci_km, sun_eci_km).is_eclipsed()
}

/// Topocentric direction, azimuth measured clockwise from north
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub azimuth_rad: f64,
    pub elevation_rad: f64,
}

/// Apparent magnitude of a diffusely reflecting satellite.
///
/// `std_mag` is the satellite's magnitude at 1000 km and 90° phase.
pub fn apparent_magnitude(
    std_mag: f64,
    satellite: Horizontal,
    sun: Horizontal,
    range_km: f64,
) -> f64 {
    let cos_delta = satellite.elevation_rad.sin() * sun.elevation_rad.sin()
        + satellite.elevation_rad.cos()
            * sun.elevation_rad.cos()
            * (satellite.azimuth_rad - sun.azimuth_rad).cos();
    let separation = cos_delta.clamp(-1.0, 1.0).acos();

    let a = SUN_TO_EARTH_DIST_KM - EARTH_RADIUS_KM - SUN_RADIUS_KM;
    let b = range_km;
    let c = (a * a + b * b - 2.0 * a * b * separation.cos()).sqrt();
    let phase = ((b * b + c * c - a * a) / (2.0 * b * c)).acos();

    let distance_term = 5.0 * (b / 1000.0).log10();
    let phase_term = -2.5 * (phase.sin() + (PI - phase) * phase.cos()).log10();

    std_mag + distance_term + phase_term
}

pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

fn julian_centuries(instant: DateTime<Utc>) -> f64 {
    (julian_date(instant) - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Nutation in longitude and true obliquity of the ecliptic, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutationObliquity {
    pub nutation_deg: f64,
    pub obliquity_deg: f64,
}

impl NutationObliquity {
    pub fn at(instant: DateTime<Utc>) -> Self {
        let t = julian_centuries(instant);
        let omega = (125.04452 - 1934.136261 * t + 0.0020708 * t * t + (t * t + t) / 450_000.0)
            .to_radians();
        let l_sun = (280.4665 + 36_000.7698 * t).to_radians();
        let l_moon = (218.3165 + 481_267.8813 * t).to_radians();

        let nutation_deg = (-17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin()
            - 0.23 * (2.0 * l_moon).sin()
            + 0.21 * (2.0 * omega).sin())
            / 3600.0;

        let mean_obliquity = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0 - (46.8150 / 3600.0) * t
            - (0.00059 / 3600.0) * t * t
            + (0.001813 / 3600.0) * t * t * t;
        let obliquity_delta = (9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos()
            + 0.10 * (2.0 * l_moon).cos()
            - 0.09 * (2.0 * omega).cos())
            / 3600.0;

        Self {
            nutation_deg,
            obliquity_deg: mean_obliquity + obliquity_delta,
        }
    }
}

/// Apparent geocentric Sun position in the equatorial frame, km
pub fn sun_position_eci_km(instant: DateTime<Utc>) -> [f64; 3] {
    let t = julian_centuries(instant);

    let mean_longitude = 280.46646 + 36_000.76983 * t + 0.0003032 * t * t;
    let mean_anomaly = 357.52911 + 35_999.05029 * t - 0.0001537 * t * t;
    let eccentricity = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;

    let m = mean_anomaly.to_radians();
    let equation_of_centre = (1.914602 - 0.004817 * t - 0.000014 * t * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin();
    let true_longitude = mean_longitude + equation_of_centre;
    let true_anomaly = mean_anomaly + equation_of_centre;

    let radius_au = (1.000001018 * (1.0 - eccentricity * eccentricity))
        / (1.0 + eccentricity * true_anomaly.to_radians().cos());
    let distance_km = radius_au * ASTRONOMICAL_UNIT_KM;

    let nao = NutationObliquity::at(instant);
    let longitude = (true_longitude + nao.nutation_deg).to_radians();
    let obliquity = nao.obliquity_deg.to_radians();

    [
        distance_km * longitude.cos(),
        distance_km * longitude.sin() * obliquity.cos(),
        distance_km * longitude.sin() * obliquity.sin(),
    ]
}
