//! Submission and upload step handlers.

use crate::api::doc::SUBMISSION_TAG;
use crate::api::dto::{
    CreateSubmissionRequest, CreatedSubmissionResponse, ErrorResponse, SubmissionResponse,
    UploadResponse,
};
use crate::error::AppResult;
use crate::session::Session;
use crate::state::AppState;
use crate::utils::{StepForm, ValidatedJson};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_submission))
        .routes(routes!(get_submission))
        .routes(routes!(upload))
}

/// POST /api/submissions - Start a submission
#[utoipa::path(
    post,
    path = "/",
    tag = SUBMISSION_TAG,
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = CreatedSubmissionResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
async fn create_submission(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<CreatedSubmissionResponse>)> {
    let workspace_item = state.services.submissions.create(&req.title).await?;
    Ok((StatusCode::CREATED, Json(workspace_item.into())))
}

/// GET /api/submissions/{id} - Files uploaded so far and what is still needed
#[utoipa::path(
    get,
    path = "/{id}",
    tag = SUBMISSION_TAG,
    params(
        ("id" = i32, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission found", body = SubmissionResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
async fn get_submission(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
) -> AppResult<Json<SubmissionResponse>> {
    let editing = session.editing_bitstream(id);
    let view = state.services.submissions.get(id, editing).await?;
    Ok(Json(view.into()))
}

/// POST /api/submissions/{id}/upload - Run the upload step
///
/// Step outcomes, failures included, are reported with HTTP 200.
#[utoipa::path(
    post,
    path = "/{id}/upload",
    tag = SUBMISSION_TAG,
    params(
        ("id" = i32, Path, description = "Submission ID")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "File parts plus step parameters such as `description`, `format`, `remove` and the pressed `submit_*` button"
    ),
    responses(
        (status = 200, description = "Step outcome", body = UploadResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
    StepForm(request): StepForm,
) -> AppResult<Json<UploadResponse>> {
    let editing = session.editing_bitstream(id);
    let outcome = state
        .services
        .submissions
        .process_upload(id, &request, editing)
        .await?;

    session.set_editing_bitstream(id, outcome.editing_bitstream);
    Ok(Json(outcome.into()))
}
