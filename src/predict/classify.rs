use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use std::ops::RangeInclusive;

use crate::predict::observer::Observer;
use crate::predict::solar::SunTimes;
use crate::predict::types::{
    ApiVersion, ClassifiedEvent, PredictionOptions, RangedEvent, TimeOfDay, Visibility,
};

/// Sky glow still washes out faint satellites this close to sunrise/sunset
pub const TWILIGHT_GLOW_MINUTES: i64 = 50;
pub const TWILIGHT_POOR_MINUTES: i64 = 30;
pub const TWILIGHT_DROP_MINUTES: i64 = 20;
pub const TWILIGHT_GLOW_PENALTY_MAG: f64 = 1.2;

pub const MAX_VISIBLE_MAG: f64 = 7.0;
pub const BRIGHT_MAG: f64 = 4.0;
pub const GOOD_MIN_ELEVATION_DEG: f64 = 25.0;
pub const HAZE_MIN_ELEVATION_DEG: f64 = 30.0;

/// Brightness calibrations are trusted for this long after launch
pub const LAUNCH_CONFIDENCE: Duration = Duration::days(4);

const MORNING_HOURS: RangeInclusive<u32> = 0..=12;

/// Sunrise and sunset reduced to local clock time, so that events on any
/// day of the scan compare against the same pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SunClock {
    Regular { sunrise_s: i64, sunset_s: i64 },
    PolarDay,
    PolarNight,
}

impl SunClock {
    fn new(sun: SunTimes, timezone: Tz) -> Self {
        match sun {
            SunTimes::Regular { sunrise, sunset } => SunClock::Regular {
                sunrise_s: seconds_of_day(sunrise, timezone),
                sunset_s: seconds_of_day(sunset, timezone),
            },
            SunTimes::PolarDay => SunClock::PolarDay,
            SunTimes::PolarNight => SunClock::PolarNight,
        }
    }
}

fn seconds_of_day(instant: DateTime<Utc>, timezone: Tz) -> i64 {
    i64::from(instant.with_timezone(&timezone).num_seconds_from_midnight())
}

/// Decides which events are worth showing and how good they are
#[derive(Debug, Clone)]
pub struct Classifier {
    sun: SunClock,
    timezone: Tz,
    now: DateTime<Utc>,
    launch: Option<DateTime<Utc>>,
    api_version: ApiVersion,
    time_of_day: TimeOfDay,
}

impl Classifier {
    pub fn new(
        sun: SunTimes,
        observer: &Observer,
        launch: Option<DateTime<Utc>>,
        options: &PredictionOptions,
    ) -> Self {
        Self {
            sun: SunClock::new(sun, observer.timezone),
            timezone: observer.timezone,
            now: observer.now,
            launch,
            api_version: options.api_version.clone(),
            time_of_day: options.time_of_day,
        }
    }

    pub fn classify_all(&self, events: Vec<RangedEvent>) -> Vec<ClassifiedEvent> {
        events
            .into_iter()
            .filter_map(|event| self.classify(event))
            .collect()
    }

    /// `None` drops the event. A kept event has its brightness penalised
    /// for twilight sky glow where that applies.
    pub fn classify(&self, mut event: RangedEvent) -> Option<ClassifiedEvent> {
        let start = event.start.with_timezone(&self.timezone);
        let start_s = i64::from(start.num_seconds_from_midnight());

        let twilight = match self.sun {
            SunClock::PolarDay => return None,
            SunClock::PolarNight => None,
            SunClock::Regular {
                sunrise_s,
                sunset_s,
            } => {
                if start_s > sunrise_s && start_s < sunset_s {
                    return None;
                }
                let from_sunrise = ((start_s - sunrise_s) / 60).abs();
                let from_sunset = ((start_s - sunset_s) / 60).abs();
                Some(from_sunrise.min(from_sunset))
            }
        };
        let within = |minutes: i64| twilight.is_some_and(|t| t < minutes);

        if event.best_brightness_mag > MAX_VISIBLE_MAG {
            return None;
        }
        if within(TWILIGHT_GLOW_MINUTES) {
            event.best_brightness_mag += TWILIGHT_GLOW_PENALTY_MAG;
        }
        if within(TWILIGHT_DROP_MINUTES) {
            return None;
        }

        let brightness = event.best_brightness_mag;
        let max_elevation = event.max_elevation_deg;
        let hazy = max_elevation < HAZE_MIN_ELEVATION_DEG || brightness >= BRIGHT_MAG;

        let mut visibility = if within(TWILIGHT_POOR_MINUTES)
            || (hazy && within(TWILIGHT_GLOW_MINUTES))
            || brightness > BRIGHT_MAG
            || max_elevation < GOOD_MIN_ELEVATION_DEG
        {
            Visibility::Poor
        } else {
            Visibility::Good
        };

        if visibility == Visibility::Good && self.launch_is_stale() {
            visibility = if self.api_version.is_legacy() {
                Visibility::Poor
            } else {
                Visibility::Average
            };
        }

        if !self.matches_time_of_day(start.hour()) {
            return None;
        }

        Some(ClassifiedEvent { event, visibility })
    }

    fn launch_is_stale(&self) -> bool {
        self.launch
            .is_some_and(|launch| self.now > launch + LAUNCH_CONFIDENCE)
    }

    fn matches_time_of_day(&self, hour: u32) -> bool {
        match self.time_of_day {
            TimeOfDay::Morning => MORNING_HOURS.contains(&hour),
            TimeOfDay::Evening => !MORNING_HOURS.contains(&hour),
            TimeOfDay::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, hour, minute, 0).unwrap()
    }

    fn sun() -> SunTimes {
        SunTimes::Regular {
            sunrise: Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap(),
        }
    }

    fn event(start: DateTime<Utc>, brightness: f64, max_elevation: f64) -> RangedEvent {
        RangedEvent {
            start,
            end: start + Duration::minutes(4),
            mins: 4,
            start_azimuth_deg: 200.0,
            end_azimuth_deg: 40.0,
            start_elevation_deg: 10.0,
            end_elevation_deg: 12.0,
            min_elevation_deg: 10.0,
            max_elevation_deg: max_elevation,
            azimuth_at_max_elevation_deg: 120.0,
            best_brightness_mag: brightness,
        }
    }

    fn classifier_with(
        sun: SunTimes,
        launch: Option<DateTime<Utc>>,
        options: PredictionOptions,
    ) -> Classifier {
        let observer = Observer::new(47.5, 19.0, chrono_tz::UTC, now()).unwrap();
        Classifier::new(sun, &observer, launch, &options)
    }

    fn classifier() -> Classifier {
        classifier_with(sun(), None, PredictionOptions::default())
    }

    fn visibility(classifier: &Classifier, event: RangedEvent) -> Option<Visibility> {
        classifier.classify(event).map(|c| c.visibility)
    }

    #[test]
    fn bright_high_night_pass_is_good() {
        let result = classifier().classify(event(at(22, 0), 2.0, 60.0)).unwrap();
        assert_eq!(result.visibility, Visibility::Good);
        assert_eq!(result.event.best_brightness_mag, 2.0);
    }

    #[test]
    fn daytime_is_dropped_whatever_the_brightness() {
        let classifier = classifier();
        assert_eq!(visibility(&classifier, event(at(12, 0), -3.0, 80.0)), None);
        assert_eq!(visibility(&classifier, event(at(5, 1), -3.0, 80.0)), None);
    }

    #[test]
    fn too_dim_is_dropped() {
        let classifier = classifier();
        assert_eq!(visibility(&classifier, event(at(23, 0), 7.01, 60.0)), None);
        assert_eq!(
            visibility(&classifier, event(at(23, 0), 7.0, 60.0)),
            Some(Visibility::Poor)
        );
    }

    #[test]
    fn nineteen_minutes_from_sunrise_is_dropped() {
        assert_eq!(visibility(&classifier(), event(at(4, 41), 1.0, 70.0)), None);
    }

    #[test]
    fn twenty_five_minutes_from_sunrise_is_poor() {
        let result = classifier().classify(event(at(4, 35), 1.0, 70.0)).unwrap();
        assert_eq!(result.visibility, Visibility::Poor);
        assert_eq!(
            result.event.best_brightness_mag,
            1.0 + TWILIGHT_GLOW_PENALTY_MAG
        );
    }

    #[test]
    fn twilight_distance_uses_whole_minutes() {
        let start = at(19, 19) + Duration::seconds(59);
        assert_eq!(visibility(&classifier(), event(start, 1.0, 70.0)), None);
        assert_eq!(
            visibility(&classifier(), event(at(19, 20), 1.0, 70.0)),
            Some(Visibility::Poor)
        );
    }

    #[test]
    fn glow_penalty_applies_within_fifty_minutes() {
        let result = classifier().classify(event(at(19, 45), 2.0, 60.0)).unwrap();
        assert_eq!(result.visibility, Visibility::Good);
        assert!((result.event.best_brightness_mag - 3.2).abs() < 1e-9);

        let hazy = classifier().classify(event(at(19, 45), 2.9, 60.0)).unwrap();
        assert_eq!(hazy.visibility, Visibility::Poor);

        let low = classifier().classify(event(at(19, 45), 1.0, 29.0)).unwrap();
        assert_eq!(low.visibility, Visibility::Poor);

        let clear = classifier().classify(event(at(19, 50), 2.0, 60.0)).unwrap();
        assert_eq!(clear.event.best_brightness_mag, 2.0);
    }

    #[test]
    fn dim_or_low_is_poor_at_night() {
        assert_eq!(
            visibility(&classifier(), event(at(23, 0), 4.01, 60.0)),
            Some(Visibility::Poor)
        );
        assert_eq!(
            visibility(&classifier(), event(at(23, 0), 4.0, 60.0)),
            Some(Visibility::Good)
        );
        assert_eq!(
            visibility(&classifier(), event(at(23, 0), 2.0, 24.99)),
            Some(Visibility::Poor)
        );
        assert_eq!(
            visibility(&classifier(), event(at(23, 0), 2.0, 25.0)),
            Some(Visibility::Good)
        );
    }

    #[test]
    fn stale_launch_downgrades_good_for_legacy_clients() {
        let launch = Some(now() - Duration::days(5));
        let legacy = classifier_with(sun(), launch, PredictionOptions::default());
        assert_eq!(
            visibility(&legacy, event(at(22, 0), 2.0, 60.0)),
            Some(Visibility::Poor)
        );

        let current = classifier_with(
            sun(),
            launch,
            PredictionOptions {
                api_version: ApiVersion::new("1.1"),
                ..PredictionOptions::default()
            },
        );
        assert_eq!(
            visibility(&current, event(at(22, 0), 2.0, 60.0)),
            Some(Visibility::Average)
        );
    }

    #[test]
    fn recent_launch_keeps_good() {
        let launch = Some(now() - Duration::days(3));
        let recent = classifier_with(sun(), launch, PredictionOptions::default());
        assert_eq!(
            visibility(&recent, event(at(22, 0), 2.0, 60.0)),
            Some(Visibility::Good)
        );
    }

    #[test]
    fn stale_launch_leaves_poor_alone() {
        let launch = Some(now() - Duration::days(30));
        let classifier = classifier_with(
            sun(),
            launch,
            PredictionOptions {
                api_version: ApiVersion::new("1.1"),
                ..PredictionOptions::default()
            },
        );
        assert_eq!(
            visibility(&classifier, event(at(23, 0), 5.0, 60.0)),
            Some(Visibility::Poor)
        );
    }

    #[test]
    fn time_of_day_filter() {
        let with = |time_of_day| {
            classifier_with(
                sun(),
                None,
                PredictionOptions {
                    time_of_day,
                    ..PredictionOptions::default()
                },
            )
        };
        let early = event(at(3, 0), 2.0, 60.0);
        let late = event(at(22, 0), 2.0, 60.0);

        let morning = with(TimeOfDay::Morning);
        assert!(morning.classify(early.clone()).is_some());
        assert!(morning.classify(late.clone()).is_none());

        let evening = with(TimeOfDay::Evening);
        assert!(evening.classify(early.clone()).is_none());
        assert!(evening.classify(late.clone()).is_some());

        let all = with(TimeOfDay::All);
        assert_eq!(all.classify_all(vec![early, late]).len(), 2);
    }

    #[test]
    fn noon_hour_still_counts_as_morning() {
        // Polar night keeps midday events from being dropped as daytime
        let with = |time_of_day| {
            classifier_with(
                SunTimes::PolarNight,
                None,
                PredictionOptions {
                    time_of_day,
                    ..PredictionOptions::default()
                },
            )
        };
        let last_morning = event(at(12, 59), 2.0, 60.0);
        let first_evening = event(at(13, 0), 2.0, 60.0);

        let morning = with(TimeOfDay::Morning);
        assert!(morning.classify(last_morning.clone()).is_some());
        assert!(morning.classify(first_evening.clone()).is_none());

        let evening = with(TimeOfDay::Evening);
        assert!(evening.classify(last_morning).is_none());
        assert!(evening.classify(first_evening).is_some());
    }

    #[test]
    fn polar_day_drops_everything() {
        let classifier = classifier_with(SunTimes::PolarDay, None, PredictionOptions::default());
        assert_eq!(visibility(&classifier, event(at(0, 30), 1.0, 70.0)), None);
    }

    #[test]
    fn polar_night_has_no_twilight() {
        let classifier = classifier_with(SunTimes::PolarNight, None, PredictionOptions::default());
        let result = classifier.classify(event(at(12, 0), 2.0, 60.0)).unwrap();
        assert_eq!(result.visibility, Visibility::Good);
        assert_eq!(result.event.best_brightness_mag, 2.0);
    }

    #[test]
    fn sun_times_compare_by_clock_time() {
        // Events days away from the sun times still use the same clock times
        let far = Utc.with_ymd_and_hms(2024, 3, 5, 4, 41, 0).unwrap();
        assert_eq!(visibility(&classifier(), event(far, 1.0, 70.0)), None);
    }
}
