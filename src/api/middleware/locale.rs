//! Locale middleware.
//!
//! Runs the locale fallback chain for every request and makes the result
//! available to handlers as a [`ResolvedLocale`](crate::i18n::ResolvedLocale) extension.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderValue, Uri, header},
    middleware::Next,
    response::Response,
};

use super::session::{cookie_values, set_cookie};
use crate::i18n::{LOCALE_PARAMETER, LocaleSources};
use crate::session::Session;
use crate::state::AppState;

/// First query parameter named `locale` or after the locale attribute.
fn locale_parameter(uri: &Uri, attribute: &str) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs
        .into_iter()
        .find(|(name, _)| name == LOCALE_PARAMETER || name == attribute)
        .map(|(_, value)| value)
}

fn gather_sources(state: &AppState, request: &Request) -> LocaleSources {
    let attribute = state.locales.attribute();
    LocaleSources {
        request_parameter: locale_parameter(request.uri(), attribute),
        session: request
            .extensions()
            .get::<Session>()
            .and_then(|s| s.attribute(attribute)),
        cookies: cookie_values(request.headers(), attribute),
        accept_language: request
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

pub async fn locale_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let sources = gather_sources(&state, &request);
    let resolved = state.locales.resolve(&sources);
    let session = request.extensions().get::<Session>().cloned();
    request.extensions_mut().insert(resolved.clone());

    let mut response = next.run(request).await;

    let tag = resolved.locale.language_tag();
    if !tag.is_empty()
        && let Ok(value) = HeaderValue::from_str(&tag)
    {
        response.headers_mut().insert(header::CONTENT_LANGUAGE, value);
    }

    let i18n = &state.settings.i18n;
    let locale = resolved.locale_string();
    if i18n.store_in_session
        && let Some(session) = &session
    {
        session.set_attribute(state.locales.attribute(), locale.clone());
    }
    if i18n.store_in_cookie {
        set_cookie(response.headers_mut(), state.locales.attribute(), &locale);
    }

    response
}
