//! Router configuration for the API.
//!
//! Centralizes route registration, the OpenAPI document and middleware.

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    global_error_handler, locale_middleware, logging_middleware, request_id_middleware,
    session_middleware,
};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run outermost first: CORS, compression, request ID, logging,
/// error normalization, session, locale. The body limit applies to the
/// handlers themselves.
///
/// # Routes
/// - `/api/submissions` - Submissions and the upload step
/// - `/api/formats` - Format registry
/// - `/api/locale` - Resolved request locale
/// - `/health` - Health probes
/// - `/swagger-ui` - API documentation
pub fn create_router(state: AppState) -> Router {
    let (api_router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/submissions", handlers::submissions::submission_routes())
        .nest("/api/formats", handlers::formats::format_routes())
        .nest("/api/locale", handlers::locale::locale_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    let body_limit = state.settings.upload.max_request_size;

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(DefaultBodyLimit::max(body_limit))
        // Last added runs first.
        .layer(middleware::from_fn_with_state(state.clone(), locale_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const BOUNDARY: &str = "XBOUNDARYX";

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    async fn create_submission(app: &Router) -> i64 {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/submissions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "title": "Award" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_locale_negotiation_and_parameter() {
        let app = create_router(AppState::in_memory());

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/locale")
                    .header(header::ACCEPT_LANGUAGE, "fr-CA;q=0.9, de;q=0.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LANGUAGE], "fr-CA");
        let json = json_body(response).await;
        assert_eq!(json["locale"], "fr_CA");
        assert_eq!(json["country"], "CA");
        assert_eq!(json["source"], "negotiated");

        let response = app
            .oneshot(
                Request::get("/api/locale?locale=pt_BR")
                    .header(header::ACCEPT_LANGUAGE, "fr")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["locale"], "pt_BR");
        assert_eq!(json["source"], "request_parameter");
    }

    #[tokio::test]
    async fn test_locale_stored_in_session_when_enabled() {
        let mut settings = Settings::default();
        settings.i18n.store_in_session = true;
        let app = create_router(AppState::with_settings(settings));

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/locale?locale=de")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .oneshot(
                Request::get("/api/locale")
                    .header(header::COOKIE, cookie)
                    .header(header::ACCEPT_LANGUAGE, "fr")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["locale"], "de");
        assert_eq!(json["source"], "session");
    }

    #[tokio::test]
    async fn test_create_submission_validation() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(
                Request::post("/api/submissions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-request-id", "req-1")
                    .body(Body::from(json!({ "title": "" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["request_id"], "req-1");
    }

    #[tokio::test]
    async fn test_unknown_submission_is_404() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(Request::get("/api/submissions/999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_upload_flow_keeps_editing_bitstream_in_session() {
        let app = create_router(AppState::in_memory());
        let id = create_submission(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/api/submissions/{id}/upload"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(multipart(&[
                        ("file", Some("/home/me/Essay.pdf"), "%PDF-1.4"),
                        ("file-description", None, "Essay"),
                        ("submit_upload", None, "Upload"),
                    ]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let json = json_body(response).await;
        assert_eq!(json["status"], "missing_bitstreams");
        assert_eq!(json["code"], 30);
        let editing = json["editing_bitstream_id"].as_i64().unwrap();
        assert!(!json["needed_files"].as_array().unwrap().contains(&json!("Essay")));

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/submissions/{id}"))
                    .header(header::COOKIE, cookie.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["editing_bitstream_id"], editing);
        let file = &json["bundles"][0]["files"][0];
        assert_eq!(file["name"], "Essay.pdf");
        assert_eq!(file["source"], "/home/me/Essay.pdf");
        assert_eq!(file["format"]["mime_type"], "application/pdf");

        let response = app
            .oneshot(
                Request::post(format!("/api/submissions/{id}/upload"))
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header(header::COOKIE, cookie)
                    .body(Body::from(format!("submit_remove_{editing}=Remove")))
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["status"], "no_files_error");
        assert_eq!(json["code"], 5);
        assert_eq!(json["editing_bitstream_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_upload_rejects_json_body() {
        let app = create_router(AppState::in_memory());
        let id = create_submission(&app).await;
        let response = app
            .oneshot(
                Request::post(format!("/api/submissions/{id}/upload"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_formats_and_openapi() {
        let app = create_router(AppState::in_memory());
        let response = app
            .clone()
            .oneshot(Request::get("/api/formats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 8);

        let response = app
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/submissions/{id}/upload"].is_object());
    }
}
