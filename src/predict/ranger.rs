use chrono::Duration;

use crate::predict::types::{RangedEvent, Sample};

/// Samples further apart than this belong to different events
const SLOT_GAP: Duration = Duration::minutes(5);

/// Running aggregate over the sunlit samples of one slot
#[derive(Default)]
struct Slot {
    first: Option<Sample>,
    last: Option<Sample>,
    min_elevation_deg: f64,
    max_elevation_deg: f64,
    azimuth_at_max_elevation_deg: f64,
    best_brightness_mag: f64,
}

impl Slot {
    fn push(&mut self, sample: &Sample) {
        if sample.eclipsed {
            return;
        }

        if self.first.is_none() {
            self.first = Some(*sample);
            self.min_elevation_deg = sample.elevation_deg;
            self.max_elevation_deg = sample.elevation_deg;
            self.azimuth_at_max_elevation_deg = sample.azimuth_deg;
            self.best_brightness_mag = sample.brightness_mag;
        }
        self.last = Some(*sample);

        if sample.elevation_deg < self.min_elevation_deg {
            self.min_elevation_deg = sample.elevation_deg;
        }
        if sample.elevation_deg > self.max_elevation_deg {
            self.max_elevation_deg = sample.elevation_deg;
            self.azimuth_at_max_elevation_deg = sample.azimuth_deg;
        }
        // magnitude goes in reverse
        if sample.brightness_mag < self.best_brightness_mag {
            self.best_brightness_mag = sample.brightness_mag;
        }
    }

    fn finish(self) -> Option<RangedEvent> {
        let first = self.first?;
        let last = self.last?;
        let mins = (last.time - first.time).num_minutes();
        if mins <= 0 {
            return None;
        }

        Some(RangedEvent {
            start: first.time,
            end: last.time,
            mins,
            start_azimuth_deg: round2(first.azimuth_deg),
            end_azimuth_deg: round2(last.azimuth_deg),
            start_elevation_deg: round2(first.elevation_deg),
            end_elevation_deg: round2(last.elevation_deg),
            min_elevation_deg: round2(self.min_elevation_deg),
            max_elevation_deg: round2(self.max_elevation_deg),
            azimuth_at_max_elevation_deg: round2(self.azimuth_at_max_elevation_deg),
            best_brightness_mag: round2(self.best_brightness_mag),
        })
    }
}

/// Group time-ordered samples into events.
///
/// A gap of more than five minutes closes the current event. Eclipsed
/// samples split nothing but never contribute, and an event needs at
/// least one whole minute of sunlit samples.
pub fn range_samples(samples: &[Sample]) -> Vec<RangedEvent> {
    let mut events = Vec::new();
    if samples.len() < 2 {
        return events;
    }

    let mut slot = Slot::default();
    let mut previous: Option<&Sample> = None;

    for sample in samples {
        if let Some(prev) = previous {
            if sample.time - prev.time > SLOT_GAP {
                events.extend(std::mem::take(&mut slot).finish());
            }
        }
        slot.push(sample);
        previous = Some(sample);
    }
    events.extend(slot.finish());

    events
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
