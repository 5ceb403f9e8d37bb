//! Locale request handlers.

use crate::api::doc::LOCALE_TAG;
use crate::api::dto::LocaleResponse;
use crate::i18n::ResolvedLocale;
use crate::state::AppState;
use axum::{Extension, Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn locale_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(current_locale))
}

/// GET /api/locale - Locale resolved for this request
#[utoipa::path(
    get,
    path = "/",
    tag = LOCALE_TAG,
    params(
        ("locale" = Option<String>, Query, description = "Explicit locale, e.g. `fr_CA`")
    ),
    responses(
        (status = 200, description = "Resolved locale and its source", body = LocaleResponse)
    )
)]
async fn current_locale(Extension(resolved): Extension<ResolvedLocale>) -> Json<LocaleResponse> {
    Json(LocaleResponse::from(&resolved))
}
