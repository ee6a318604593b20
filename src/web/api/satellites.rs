use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{current_position, satellite_path, SatellitePath, DEFAULT_PATH_MINUTES};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Longest ground track a single request may ask for
pub const MAX_PATH_MINUTES: u32 = 24 * 60;

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteSummary {
    pub name: String,
    pub title: String,
    pub std_mag: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<chrono::DateTime<Utc>>,
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteListResponse {
    pub satellites: Vec<SatelliteSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PathQuery {
    #[serde(default)]
    pub mins: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "satellites",
    responses(
        (status = 200, description = "Catalogued satellites", body = SatelliteListResponse)
    )
)]
pub async fn list_satellites(
    State(state): State<AppState>,
) -> ApiResult<Json<SatelliteListResponse>> {
    let satellites = state
        .with_catalog(|catalog| {
            Ok(catalog
                .satellites()
                .iter()
                .map(|s| SatelliteSummary {
                    name: s.name.clone(),
                    title: s.title.clone(),
                    std_mag: s.std_mag,
                    launch_date: s.launch_date,
                    active: s.active,
                })
                .collect())
        })
        .await?;

    Ok(Json(SatelliteListResponse { satellites }))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{name}/path",
    tag = "satellites",
    params(
        ("name" = String, Path, description = "Satellite name"),
        ("mins" = Option<u32>, Query, description = "Track length in minutes, centred on now (default 90)")
    ),
    responses(
        (status = 200, description = "Ground track, one [lat, lon] point per minute", body = SatellitePath),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse)
    )
)]
pub async fn get_path(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Json<SatellitePath>> {
    let mins = query.mins.unwrap_or(DEFAULT_PATH_MINUTES);
    if mins > MAX_PATH_MINUTES {
        return Err(ApiError::Validation(format!(
            "mins must not exceed {}",
            MAX_PATH_MINUTES
        )));
    }

    let now = Utc::now();
    let path = state
        .with_catalog(move |catalog| {
            let propagator = catalog.propagator(&name)?;
            satellite_path(&propagator, now, mins)
        })
        .await?;

    Ok(Json(path))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{name}/position",
    tag = "satellites",
    params(
        ("name" = String, Path, description = "Satellite name")
    ),
    responses(
        (status = 200, description = "[latitude, longitude, altitude_km] of the sub-satellite point", body = Vec<f64>),
        (status = 404, description = "Unknown satellite", body = ErrorResponse)
    )
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<[f64; 3]>> {
    let now = Utc::now();
    let position = state
        .with_catalog(move |catalog| {
            let propagator = catalog.propagator(&name)?;
            current_position(&propagator, now)
        })
        .await?;

    Ok(Json(position))
}
