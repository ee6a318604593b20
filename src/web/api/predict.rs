use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::predict::{
    predict_all, ApiVersion, Observer, PredictionOptions, TimeOfDay, VisibilityReport,
    DEFAULT_DAYS_COUNT,
};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Longest scan a single request may ask for
pub const MAX_DAYS_COUNT: u32 = 30;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibleTimesQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub days_count: Option<u32>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub start_days_offset: Option<i64>,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Comma-separated satellite names
    #[serde(default)]
    pub satellites: Option<String>,
}

impl VisibleTimesQuery {
    fn options(&self) -> ApiResult<PredictionOptions> {
        let days_count = self.days_count.unwrap_or(DEFAULT_DAYS_COUNT);
        if days_count > MAX_DAYS_COUNT {
            return Err(ApiError::Validation(format!(
                "days_count must not exceed {}",
                MAX_DAYS_COUNT
            )));
        }

        Ok(PredictionOptions {
            days_count,
            time_of_day: self.time_of_day.unwrap_or_default(),
            start_days_offset: self.start_days_offset.unwrap_or(0),
            api_version: self
                .api_version
                .as_deref()
                .map(ApiVersion::new)
                .unwrap_or_default(),
        })
    }

    /// Empty when every active satellite is wanted
    fn satellite_names(&self) -> Vec<String> {
        self.satellites
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[utoipa::path(
    get,
    path = "/api/visible-times",
    tag = "predict",
    params(
        ("latitude" = f64, Query, description = "Observer latitude (degrees, -90..90)"),
        ("longitude" = f64, Query, description = "Observer longitude (degrees, -180..180)"),
        ("days_count" = Option<u32>, Query, description = "Days to scan (default 5)"),
        ("time_of_day" = Option<TimeOfDay>, Query, description = "morning, evening or all"),
        ("start_days_offset" = Option<i64>, Query, description = "Days from now the scan starts at, may be negative"),
        ("api_version" = Option<String>, Query, description = "Response version; \"1\" has no average tier"),
        ("satellites" = Option<String>, Query, description = "Comma-separated satellite names (default: all active)")
    ),
    responses(
        (status = 200, description = "Visibility events of the requested satellites", body = VisibilityReport),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 422, description = "No timezone for the location", body = ErrorResponse)
    )
)]
pub async fn visible_times(
    State(state): State<AppState>,
    Query(query): Query<VisibleTimesQuery>,
) -> ApiResult<Json<VisibilityReport>> {
    let options = query.options()?;
    let names = query.satellite_names();
    let observer = Observer::locate(
        query.latitude,
        query.longitude,
        Utc::now(),
        state.zones.as_ref(),
    )?;

    let report = state
        .with_catalog(move |catalog| predict_all(catalog, &names, &observer, &options))
        .await?;

    Ok(Json(report))
}
