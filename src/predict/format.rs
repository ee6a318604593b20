use chrono::DateTime;
use chrono_tz::Tz;

use crate::predict::classify::BRIGHT_MAG;
use crate::predict::observer::Observer;
use crate::predict::ranger::round2;
use crate::predict::types::{
    BrightnessText, ClassifiedEvent, CompassDirection, Timestamp, Visibility, VisibilityEvent,
};

const PAST_PREFIX: &str = "(past) ";

pub fn compass_direction(azimuth_deg: f64) -> CompassDirection {
    let az = azimuth_deg.rem_euclid(360.0);
    match az {
        a if a >= 337.0 || a < 22.0 => CompassDirection::North,
        a if a < 67.0 => CompassDirection::Northeast,
        a if a < 112.0 => CompassDirection::East,
        a if a < 157.0 => CompassDirection::Southeast,
        a if a < 202.0 => CompassDirection::South,
        a if a < 247.0 => CompassDirection::Southwest,
        a if a < 292.0 => CompassDirection::West,
        _ => CompassDirection::Northwest,
    }
}

/// Whole degrees in [0, 360)
fn display_azimuth(azimuth_deg: f64) -> f64 {
    azimuth_deg.round().rem_euclid(360.0)
}

/// e.g. "7:43 pm"
pub fn clock_text(local: &DateTime<Tz>) -> String {
    local.format("%-I:%M %P").to_string()
}

pub fn timestamp(local: &DateTime<Tz>) -> Timestamp {
    Timestamp {
        time: clock_text(local),
        date: local.format("%-d %b %Y").to_string(),
        epoch: local.timestamp(),
    }
}

fn brightness_text(visibility: Visibility, brightness_mag: f64) -> BrightnessText {
    match visibility {
        Visibility::Good if brightness_mag < BRIGHT_MAG => BrightnessText::Bright,
        _ => BrightnessText::Dim,
    }
}

pub fn format_event(
    name: &str,
    title: &str,
    classified: &ClassifiedEvent,
    observer: &Observer,
) -> VisibilityEvent {
    let event = &classified.event;

    let mut start = timestamp(&observer.local(event.start));
    if event.start < observer.now {
        start.time.insert_str(0, PAST_PREFIX);
    }

    VisibilityEvent {
        name: name.to_string(),
        title: title.to_string(),
        visibility: classified.visibility,
        start,
        end: timestamp(&observer.local(event.end)),
        mins: event.mins,
        brightness: round2(event.best_brightness_mag),
        brightness_text: brightness_text(classified.visibility, event.best_brightness_mag),
        start_dir: display_azimuth(event.start_azimuth_deg),
        start_dir_text: compass_direction(event.start_azimuth_deg),
        end_dir: display_azimuth(event.end_azimuth_deg),
        end_dir_text: compass_direction(event.end_azimuth_deg),
        start_elev: event.start_elevation_deg,
        max_elev: event.max_elevation_deg,
        end_elev: event.end_elevation_deg,
        azimuth_at_max_elev: event.azimuth_at_max_elevation_deg,
    }
}
