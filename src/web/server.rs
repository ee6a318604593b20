use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::error::ErrorResponse;
use super::api::predict as predict_handlers;
use super::api::satellites as satellite_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Predict API endpoints
        .route("/api/visible-times", get(predict_handlers::visible_times))
        // Satellite API endpoints
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route(
            "/api/satellites/{name}/path",
            get(satellite_handlers::get_path),
        )
        .route(
            "/api/satellites/{name}/position",
            get(satellite_handlers::get_position),
        )
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not_found"))) })
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.web.bind.clone();
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
