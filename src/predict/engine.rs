use chrono::{DateTime, Duration, Utc};

use crate::predict::catalog::{Satellite, SatelliteCatalog};
use crate::predict::classify::Classifier;
use crate::predict::error::PredictError;
use crate::predict::format::{clock_text, format_event, timestamp};
use crate::predict::geometry::{apparent_magnitude, is_eclipsed, sun_position_eci_km, Horizontal};
use crate::predict::observer::Observer;
use crate::predict::propagation::{LookAngles, Propagator};
use crate::predict::ranger::range_samples;
use crate::predict::scanner::{scan_samples, Illumination, ScanWindow, SkyTrack};
use crate::predict::solar::{sun_horizontal, sun_times, SunTimes};
use crate::predict::types::{
    PredictionOptions, PredictionResult, SatellitePath, SkippedSatellite, Timestamp, Visibility,
    VisibilityReport,
};

pub const DEFAULT_PATH_MINUTES: u32 = 90;

/// SGP4-backed sky track of one satellite for one observer
pub struct SatelliteTrack<'a> {
    propagator: &'a Propagator,
    observer: &'a Observer,
    std_mag: f64,
}

impl<'a> SatelliteTrack<'a> {
    pub fn new(propagator: &'a Propagator, observer: &'a Observer, std_mag: f64) -> Self {
        Self {
            propagator,
            observer,
            std_mag,
        }
    }
}

impl SkyTrack for SatelliteTrack<'_> {
    fn look_angles(&self, instant: DateTime<Utc>) -> Result<LookAngles, PredictError> {
        self.propagator.look_angles(self.observer, instant)
    }

    fn illumination(
        &self,
        instant: DateTime<Utc>,
        look: &LookAngles,
    ) -> Result<Illumination, PredictError> {
        let eclipsed = is_eclipsed(look.position_eci_km, sun_position_eci_km(instant));
        let sun = sun_horizontal(
            instant,
            self.observer.latitude_deg,
            self.observer.longitude_deg,
        );
        let satellite = Horizontal {
            azimuth_rad: look.azimuth_deg.to_radians(),
            elevation_rad: look.elevation_deg.to_radians(),
        };

        Ok(Illumination {
            brightness_mag: apparent_magnitude(self.std_mag, satellite, sun, look.range_km),
            eclipsed,
        })
    }
}

/// Observer-side context shared by every satellite in a request
struct ObserverClock {
    current_local_time: Timestamp,
    timezone: String,
    timezone_offset: String,
    timezone_offset_text: String,
    sunrise: Option<String>,
    sunset: Option<String>,
}

impl ObserverClock {
    fn new(observer: &Observer, sun: SunTimes) -> Self {
        let now = observer.local(observer.now);
        let (sunrise, sunset) = match sun {
            SunTimes::Regular { sunrise, sunset } => (
                Some(clock_text(&observer.local(sunrise))),
                Some(clock_text(&observer.local(sunset))),
            ),
            SunTimes::PolarDay | SunTimes::PolarNight => (None, None),
        };

        Self {
            current_local_time: timestamp(&now),
            timezone: observer.timezone.name().to_string(),
            timezone_offset: now.format("%:z").to_string(),
            timezone_offset_text: now.format("%Z").to_string(),
            sunrise,
            sunset,
        }
    }
}

fn observer_sun(observer: &Observer) -> SunTimes {
    sun_times(observer.now, observer.latitude_deg, observer.longitude_deg)
}

/// Visibility events of one satellite over the scan window
pub fn predict(
    satellite: &Satellite,
    propagator: &Propagator,
    observer: &Observer,
    options: &PredictionOptions,
) -> Result<PredictionResult, PredictError> {
    let sun = observer_sun(observer);
    let track = SatelliteTrack::new(propagator, observer, satellite.std_mag);
    let window = ScanWindow::new(observer.now, options, satellite.launch_date)?;

    let samples = scan_samples(&track, &window)?;
    let events = range_samples(&samples);
    let classified =
        Classifier::new(sun, observer, satellite.launch_date, options).classify_all(events);

    let timings = classified
        .iter()
        .map(|c| format_event(&satellite.name, &satellite.title, c, observer))
        .collect();

    let clock = ObserverClock::new(observer, sun);
    Ok(PredictionResult {
        current_local_time: clock.current_local_time,
        tle_date: propagator.epoch_day_start(),
        timezone: clock.timezone,
        timezone_offset: clock.timezone_offset,
        timezone_offset_text: clock.timezone_offset_text,
        sunrise: clock.sunrise,
        sunset: clock.sunset,
        message: String::new(),
        timings,
    })
}

/// `predict` for a catalogued satellite, building its handle if needed
pub fn predict_named(
    catalog: &mut SatelliteCatalog,
    name: &str,
    observer: &Observer,
    options: &PredictionOptions,
) -> Result<PredictionResult, PredictError> {
    let propagator = catalog.propagator(name)?;
    let satellite = catalog
        .get(name)
        .ok_or_else(|| PredictError::UnknownSatellite(name.to_string()))?;
    predict(satellite, &propagator, observer, options)
}

/// Predict for several satellites and merge the events by start time.
///
/// An empty `names` means every active satellite. A satellite that fails is
/// logged and listed in `skipped`; the others still report.
pub fn predict_all(
    catalog: &mut SatelliteCatalog,
    names: &[String],
    observer: &Observer,
    options: &PredictionOptions,
) -> Result<VisibilityReport, PredictError> {
    ScanWindow::new(observer.now, options, None)?;

    let names: Vec<String> = if names.is_empty() {
        catalog.active_names()
    } else {
        names.to_vec()
    };

    let mut timings = Vec::new();
    let mut skipped = Vec::new();
    for name in names {
        match predict_named(catalog, &name, observer, options) {
            Ok(result) => timings.extend(result.timings),
            Err(e) => {
                log::warn!("Failed to predict visibility for {}: {}", name, e);
                skipped.push(SkippedSatellite {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    timings.sort_by_key(|t| t.start.epoch);
    let has_good_visibility = timings.iter().any(|t| t.visibility == Visibility::Good);

    let clock = ObserverClock::new(observer, observer_sun(observer));
    Ok(VisibilityReport {
        current_local_time: clock.current_local_time,
        timezone: clock.timezone,
        timezone_offset: clock.timezone_offset,
        timezone_offset_text: clock.timezone_offset_text,
        sunrise: clock.sunrise,
        sunset: clock.sunset,
        timings,
        skipped,
        has_good_visibility,
    })
}

/// Ground track from `mins / 2` minutes before `now` to as many after, one point per minute
pub fn satellite_path(
    propagator: &Propagator,
    now: DateTime<Utc>,
    mins: u32,
) -> Result<SatellitePath, PredictError> {
    let half = i64::from(mins / 2);
    let path = (-half..=half)
        .map(|i| {
            let point = propagator.geodetic(now + Duration::minutes(i))?;
            Ok([point.latitude_deg, point.longitude_deg])
        })
        .collect::<Result<Vec<_>, PredictError>>()?;

    Ok(SatellitePath {
        start_epoch: (now - Duration::minutes(half)).timestamp(),
        path,
    })
}

/// `[latitude_deg, longitude_deg, altitude_km]` of the sub-satellite point
pub fn current_position(
    propagator: &Propagator,
    now: DateTime<Utc>,
) -> Result<[f64; 3], PredictError> {
    let point = propagator.geodetic(now)?;
    Ok([point.latitude_deg, point.longitude_deg, point.altitude_km])
}
