//! Format registry handlers.

use crate::api::doc::FORMAT_TAG;
use crate::api::dto::FormatResponse;
use crate::error::AppResult;
use crate::state::AppState;
use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn format_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_formats))
}

/// GET /api/formats - List the bitstream format registry
#[utoipa::path(
    get,
    path = "/",
    tag = FORMAT_TAG,
    responses(
        (status = 200, description = "Registered formats", body = Vec<FormatResponse>)
    )
)]
async fn list_formats(State(state): State<AppState>) -> AppResult<Json<Vec<FormatResponse>>> {
    let formats = state.services.submissions.list_formats().await?;
    Ok(Json(formats.into_iter().map(FormatResponse::from).collect()))
}
