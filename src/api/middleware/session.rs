//! Session middleware.
//!
//! Resolves the session cookie into a [`Session`] stored in request
//! extensions, creating a session when the cookie is missing or stale.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::session::Session;
use crate::state::AppState;

/// Values of every cookie called `name`, in header order.
pub(crate) fn cookie_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .collect()
}

/// Appends a `Set-Cookie` header scoped to the whole site.
pub(crate) fn set_cookie(headers: &mut HeaderMap, name: &str, value: &str) {
    let cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(cookie = name, error = %e, "Cookie value is not a valid header"),
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.settings.session.cookie_name.as_str();
    let id = cookie_values(request.headers(), cookie_name)
        .iter()
        .find_map(|value| Uuid::parse_str(value).ok());

    let session: Session = state.sessions.load_or_create(id);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if session.is_new() {
        set_cookie(
            response.headers_mut(),
            cookie_name,
            &session.id().to_string(),
        );
    }
    response
}
