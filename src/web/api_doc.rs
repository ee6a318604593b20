use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::predict::VisibleTimesQuery;
use super::api::satellites::{PathQuery, SatelliteListResponse, SatelliteSummary};
use crate::predict::{
    BrightnessText, CompassDirection, SatellitePath, SkippedSatellite, TimeOfDay, Timestamp,
    Visibility, VisibilityEvent, VisibilityReport,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::predict::visible_times,
        super::api::satellites::list_satellites,
        super::api::satellites::get_path,
        super::api::satellites::get_position,
    ),
    components(
        schemas(
            VisibilityReport,
            VisibilityEvent,
            Timestamp,
            Visibility,
            BrightnessText,
            CompassDirection,
            SkippedSatellite,
            TimeOfDay,
            VisibleTimesQuery,
            SatellitePath,
            PathQuery,
            SatelliteListResponse,
            SatelliteSummary,
            ErrorResponse,
        )
    ),
    info(
        title = "Sat-Sighting API",
        description = "Naked-eye visibility predictions for catalogued satellites",
        version = "0.1.0"
    ),
    tags(
        (name = "predict", description = "Visibility predictions"),
        (name = "satellites", description = "Satellite catalog, ground tracks and positions")
    )
)]
pub struct ApiDoc;
