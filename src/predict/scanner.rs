use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::propagation::LookAngles;
use crate::predict::types::{PredictionOptions, Sample};

pub const SAMPLES_PER_MIN: i64 = 12;
pub const STEP_SECONDS: i64 = 60 / SAMPLES_PER_MIN;
/// Jump width used to skip stretches where the satellite is out of view
pub const FAST_FORWARD_SAMPLES: i64 = 3 * SAMPLES_PER_MIN;

// Upper bound lies past the zenith.
pub const MIN_ELEVATION_DEG: f64 = 10.0;
pub const MAX_ELEVATION_DEG: f64 = 170.0;

/// Sunlight state of the satellite at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Illumination {
    pub brightness_mag: f64,
    pub eclipsed: bool,
}

/// Source of per-instant satellite state for one observer
pub trait SkyTrack {
    fn look_angles(&self, instant: DateTime<Utc>) -> Result<LookAngles, PredictError>;

    /// Only called for instants whose look angles made them a candidate
    fn illumination(
        &self,
        instant: DateTime<Utc>,
        look: &LookAngles,
    ) -> Result<Illumination, PredictError>;
}

/// The time axis of one scan: sample `i` lies at `start + i * STEP_SECONDS`
/// for `i` in `1..=sample_count`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanWindow {
    pub start: DateTime<Utc>,
    pub sample_count: i64,
    /// Instants before this (the launch) are never sampled
    pub not_before: Option<DateTime<Utc>>,
}

impl ScanWindow {
    pub fn new(
        now: DateTime<Utc>,
        options: &PredictionOptions,
        not_before: Option<DateTime<Utc>>,
    ) -> Result<Self, PredictError> {
        let sample_count = 24 * 60 * SAMPLES_PER_MIN * i64::from(options.days_count);
        let start = Duration::try_days(options.start_days_offset)
            .and_then(|offset| now.checked_add_signed(offset))
            .filter(|start| {
                Duration::try_seconds(sample_count * STEP_SECONDS)
                    .and_then(|span| start.checked_add_signed(span))
                    .is_some()
            })
            .ok_or_else(|| {
                PredictError::TimeOutOfRange(format!(
                    "{} days starting {} days from {}",
                    options.days_count, options.start_days_offset, now
                ))
            })?;

        Ok(Self {
            start,
            sample_count,
            not_before,
        })
    }

    pub fn instant(&self, index: i64) -> DateTime<Utc> {
        self.start + Duration::seconds(index * STEP_SECONDS)
    }

    fn skips(&self, instant: DateTime<Utc>) -> bool {
        self.not_before.is_some_and(|launch| instant < launch)
    }
}

pub fn is_candidate(elevation_deg: f64) -> bool {
    (MIN_ELEVATION_DEG..=MAX_ELEVATION_DEG).contains(&elevation_deg)
}

/// How the cursor arrived at the sample being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scanning,
    FastForwarding,
    Rewinding,
}

/// Walk the window and return every candidate sample, in time order.
///
/// Out-of-view stretches are crossed in jumps of `FAST_FORWARD_SAMPLES`.
/// A jump that lands inside a pass goes back one jump width and rescans
/// sample by sample, with jumping disabled until the landing point is
/// reached again. Passes shorter than one jump can be missed. Instants the
/// propagator cannot place count as out of view.
pub fn scan_samples<T: SkyTrack + ?Sized>(
    track: &T,
    window: &ScanWindow,
) -> Result<Vec<Sample>, PredictError> {
    let mut samples = Vec::new();
    let mut mode = Mode::Scanning;
    let mut cursor: i64 = 1;
    let mut fast_forward_allowed_after: i64 = 0;
    let mut evaluated = 0usize;
    let mut failed = 0usize;

    while cursor <= window.sample_count {
        let instant = window.instant(cursor);
        if window.skips(instant) {
            cursor += 1;
            continue;
        }

        evaluated += 1;
        let look = match track.look_angles(instant) {
            Ok(look) => Some(look),
            Err(PredictError::Propagation(message)) => {
                failed += 1;
                log::debug!("no position at {}: {}", instant, message);
                None
            }
            Err(e) => return Err(e),
        };
        let valid = look
            .as_ref()
            .is_some_and(|look| is_candidate(look.elevation_deg));
        let may_fast_forward = cursor > fast_forward_allowed_after;

        mode = match (mode, valid) {
            (Mode::FastForwarding, true) => {
                fast_forward_allowed_after = cursor;
                cursor -= FAST_FORWARD_SAMPLES;
                Mode::Rewinding
            }
            (Mode::Scanning | Mode::FastForwarding, false) if may_fast_forward => {
                cursor += FAST_FORWARD_SAMPLES;
                Mode::FastForwarding
            }
            (_, valid) => {
                if let Some(look) = look.filter(|_| valid) {
                    let lit = track.illumination(instant, &look)?;
                    samples.push(Sample {
                        time: instant,
                        azimuth_deg: look.azimuth_deg,
                        elevation_deg: look.elevation_deg,
                        brightness_mag: lit.brightness_mag,
                        eclipsed: lit.eclipsed,
                    });
                }
                Mode::Scanning
            }
        };
        cursor += 1;
    }

    log::debug!(
        "scanned {} of {} samples, kept {}, {} without a position",
        evaluated,
        window.sample_count,
        samples.len(),
        failed
    );

    Ok(samples)
}
