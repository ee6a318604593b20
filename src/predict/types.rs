use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

pub const DEFAULT_DAYS_COUNT: u32 = 5;
pub const DEFAULT_API_VERSION: &str = "1";

/// Part of the local day an event has to start in to be reported
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Evening,
    #[default]
    All,
}

/// Response schema version requested by the client.
///
/// Version "1" predates the `average` tier, so those clients get `poor` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ApiVersion(String);

impl ApiVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn is_legacy(&self) -> bool {
        self.0 == DEFAULT_API_VERSION
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PredictionOptions {
    pub days_count: u32,
    pub time_of_day: TimeOfDay,
    /// Days between now and the start of the scan, negative to look back
    pub start_days_offset: i64,
    pub api_version: ApiVersion,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            days_count: DEFAULT_DAYS_COUNT,
            time_of_day: TimeOfDay::All,
            start_days_offset: 0,
            api_version: ApiVersion::default(),
        }
    }
}

/// Satellite state at one scanned instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    /// Apparent magnitude, lower is brighter
    pub brightness_mag: f64,
    pub eclipsed: bool,
}

/// A contiguous run of sunlit, above-horizon samples
#[derive(Debug, Clone, PartialEq)]
pub struct RangedEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mins: i64,
    pub start_azimuth_deg: f64,
    pub end_azimuth_deg: f64,
    pub start_elevation_deg: f64,
    pub end_elevation_deg: f64,
    pub min_elevation_deg: f64,
    pub max_elevation_deg: f64,
    pub azimuth_at_max_elevation_deg: f64,
    pub best_brightness_mag: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Good,
    Average,
    Poor,
}

/// An event that survived filtering, with its tier and twilight-adjusted brightness
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub event: RangedEvent,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BrightnessText {
    Bright,
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

/// Local wall-clock rendering of an instant; `epoch` is always UTC seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Timestamp {
    pub time: String,
    pub date: String,
    pub epoch: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityEvent {
    pub name: String,
    pub title: String,
    pub visibility: Visibility,
    pub start: Timestamp,
    pub end: Timestamp,
    pub mins: i64,
    pub brightness: f64,
    pub brightness_text: BrightnessText,
    pub start_dir: f64,
    pub start_dir_text: CompassDirection,
    pub end_dir: f64,
    pub end_dir_text: CompassDirection,
    pub start_elev: f64,
    pub max_elev: f64,
    pub end_elev: f64,
    pub azimuth_at_max_elev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub current_local_time: Timestamp,
    /// Element set epoch (UTC midnight of its day), Unix seconds
    pub tle_date: i64,
    pub timezone: String,
    pub timezone_offset: String,
    pub timezone_offset_text: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub message: String,
    pub timings: Vec<VisibilityEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSatellite {
    pub name: String,
    pub reason: String,
}

/// Merged predictions for several satellites, sorted by start time
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityReport {
    pub current_local_time: Timestamp,
    pub timezone: String,
    pub timezone_offset: String,
    pub timezone_offset_text: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub timings: Vec<VisibilityEvent>,
    pub skipped: Vec<SkippedSatellite>,
    /// False when no `good` event exists across all satellites
    pub has_good_visibility: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SatellitePath {
    pub start_epoch: i64,
    /// `[latitude_deg, longitude_deg]` pairs, one per minute
    #[schema(value_type = Vec<Vec<f64>>)]
    pub path: Vec<[f64; 2]>,
}
