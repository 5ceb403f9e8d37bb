//! Locale DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::i18n::{LocaleSource, ResolvedLocale};

/// Locale chosen for the current request and where it came from.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "language": "en",
    "country": "GB",
    "variant": "",
    "locale": "en_GB",
    "source": "negotiated"
}))]
pub struct LocaleResponse {
    pub language: String,
    pub country: String,
    pub variant: String,
    /// Full locale string, e.g. `en_GB`
    pub locale: String,
    pub source: LocaleSource,
}

impl From<&ResolvedLocale> for LocaleResponse {
    fn from(resolved: &ResolvedLocale) -> Self {
        Self {
            language: resolved.language().to_string(),
            country: resolved.country().to_string(),
            variant: resolved.variant().to_string(),
            locale: resolved.locale_string(),
            source: resolved.source,
        }
    }
}
