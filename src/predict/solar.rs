//! Sun direction for an observer and sunrise/sunset times.
//!
//! Low-precision model (≈1 minute on sunrise/sunset) driven by the Sun's
//! mean anomaly and a fixed obliquity.

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

use crate::predict::geometry::{julian_date, Horizontal};

const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const OBLIQUITY_RAD: f64 = 23.4397 * PI / 180.0;
const PERIHELION_RAD: f64 = 102.9372 * PI / 180.0;
const TRANSIT_OFFSET_DAYS: f64 = 0.0009;
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Sunrise and sunset of the solar day nearest an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunTimes {
    Regular {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    /// The Sun stays above the horizon all day
    PolarDay,
    /// The Sun never rises
    PolarNight,
}

fn days_since_j2000(instant: DateTime<Utc>) -> f64 {
    julian_date(instant) - J2000_JD
}

fn from_julian(jd: f64) -> Option<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * 86_400_000.0).round();
    DateTime::from_timestamp_millis(millis as i64)
}

fn mean_anomaly(days: f64) -> f64 {
    (357.5291 + 0.98560028 * days).to_radians()
}

fn ecliptic_longitude(mean_anomaly: f64) -> f64 {
    let m = mean_anomaly;
    let centre =
        (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin()).to_radians();
    m + centre + PERIHELION_RAD + PI
}

fn declination(ecliptic_longitude: f64) -> f64 {
    (OBLIQUITY_RAD.sin() * ecliptic_longitude.sin()).asin()
}

fn right_ascension(ecliptic_longitude: f64) -> f64 {
    (ecliptic_longitude.sin() * OBLIQUITY_RAD.cos()).atan2(ecliptic_longitude.cos())
}

fn sidereal_time(days: f64, west_longitude_rad: f64) -> f64 {
    (280.16 + 360.9856235 * days).to_radians() - west_longitude_rad
}

/// Sun azimuth (clockwise from north) and elevation
pub fn sun_horizontal(instant: DateTime<Utc>, latitude_deg: f64, longitude_deg: f64) -> Horizontal {
    let lw = -longitude_deg.to_radians();
    let phi = latitude_deg.to_radians();
    let days = days_since_j2000(instant);

    let longitude = ecliptic_longitude(mean_anomaly(days));
    let dec = declination(longitude);
    let hour_angle = sidereal_time(days, lw) - right_ascension(longitude);

    // Measured from south, rotated to north like the look angles
    let azimuth_from_south = hour_angle
        .sin()
        .atan2(hour_angle.cos() * phi.sin() - dec.tan() * phi.cos());
    let elevation = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos()).asin();

    Horizontal {
        azimuth_rad: azimuth_from_south + PI,
        elevation_rad: elevation,
    }
}

fn solar_transit(approx_transit: f64, mean_anomaly: f64, ecliptic_longitude: f64) -> f64 {
    J2000_JD + approx_transit + 0.0053 * mean_anomaly.sin()
        - 0.0069 * (2.0 * ecliptic_longitude).sin()
}

pub fn sun_times(instant: DateTime<Utc>, latitude_deg: f64, longitude_deg: f64) -> SunTimes {
    let lw = -longitude_deg.to_radians();
    let phi = latitude_deg.to_radians();
    let days = days_since_j2000(instant);

    let cycle = (days - TRANSIT_OFFSET_DAYS - lw / (2.0 * PI)).round();
    let approx_noon = TRANSIT_OFFSET_DAYS + lw / (2.0 * PI) + cycle;
    let m = mean_anomaly(approx_noon);
    let l = ecliptic_longitude(m);
    let dec = declination(l);
    let noon = solar_transit(approx_noon, m, l);

    let h0 = SUNRISE_ALTITUDE_DEG.to_radians();
    let cos_hour_angle = (h0.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    if cos_hour_angle > 1.0 {
        return SunTimes::PolarNight;
    }
    if cos_hour_angle < -1.0 || !cos_hour_angle.is_finite() {
        return SunTimes::PolarDay;
    }

    let hour_angle = cos_hour_angle.acos();
    let approx_set = TRANSIT_OFFSET_DAYS + (hour_angle + lw) / (2.0 * PI) + cycle;
    let set = solar_transit(approx_set, m, l);
    let rise = noon - (set - noon);

    match (from_julian(rise), from_julian(set)) {
        (Some(sunrise), Some(sunset)) => SunTimes::Regular { sunrise, sunset },
        _ => SunTimes::PolarNight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    const BUDAPEST: (f64, f64) = (47.4979, 19.0402);

    fn assert_close(actual: DateTime<Utc>, expected: DateTime<Utc>) {
        let diff = (actual - expected).num_seconds().abs();
        assert!(diff <= 2, "{} vs {}", actual, expected);
    }

    #[test]
    fn budapest_midsummer() {
        let instant = Utc.with_ymd_and_hms(2020, 6, 21, 12, 0, 0).unwrap();
        match sun_times(instant, BUDAPEST.0, BUDAPEST.1) {
            SunTimes::Regular { sunrise, sunset } => {
                assert_close(
                    sunrise,
                    Utc.with_ymd_and_hms(2020, 6, 21, 2, 47, 51).unwrap(),
                );
                assert_close(
                    sunset,
                    Utc.with_ymd_and_hms(2020, 6, 21, 18, 46, 2).unwrap(),
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn sunrise_precedes_sunset() {
        let instant = Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap();
        match sun_times(instant, BUDAPEST.0, BUDAPEST.1) {
            SunTimes::Regular { sunrise, sunset } => {
                assert!(sunrise < sunset);
                assert!(sunset - sunrise > Duration::hours(15));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn arctic_extremes() {
        let june = Utc.with_ymd_and_hms(2020, 6, 21, 12, 0, 0).unwrap();
        let december = Utc.with_ymd_and_hms(2020, 12, 21, 12, 0, 0).unwrap();
        assert_eq!(sun_times(june, 78.22, 15.65), SunTimes::PolarDay);
        assert_eq!(sun_times(december, 78.22, 15.65), SunTimes::PolarNight);
    }

    #[test]
    fn sun_high_at_midsummer_noon() {
        let instant = Utc.with_ymd_and_hms(2020, 6, 21, 12, 0, 0).unwrap();
        let sun = sun_horizontal(instant, BUDAPEST.0, BUDAPEST.1);
        assert_abs_diff_eq!(sun.elevation_rad.to_degrees(), 61.79, epsilon = 0.01);
        assert_abs_diff_eq!(sun.azimuth_rad.to_degrees(), 217.92, epsilon = 0.01);
    }

    #[test]
    fn sun_below_horizon_at_midnight() {
        let instant = Utc.with_ymd_and_hms(2020, 6, 21, 23, 0, 0).unwrap();
        let sun = sun_horizontal(instant, BUDAPEST.0, BUDAPEST.1);
        assert!(sun.elevation_rad < 0.0);
    }
}
