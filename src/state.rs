//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::Settings;
use crate::content::ContentBackend;
use crate::error::AppResult;
use crate::i18n::LocaleResolver;
use crate::services::Services;
use crate::session::SessionStore;
use crate::submit::{UploadPolicy, UploadStep};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: every field is reference counted or holds a pool.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct access to the content backend, for health probes
    pub content: ContentBackend,
    pub sessions: SessionStore,
    pub locales: LocaleResolver,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wires services, sessions and locale resolution over `content`.
    ///
    /// Fails when the i18n section holds an unparseable locale.
    pub fn new(settings: Settings, content: ContentBackend) -> AppResult<Self> {
        let step = UploadStep::new(UploadPolicy::from_config(&settings.upload));
        let locales = LocaleResolver::from_config(&settings.i18n)?;
        let sessions = SessionStore::from_config(&settings.session);

        Ok(Self {
            services: Services::new(content.clone(), step),
            content,
            sessions,
            locales,
            settings: Arc::new(settings),
        })
    }

    /// State over a fresh in-memory store with default settings.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self::with_settings(Settings::default())
    }

    #[cfg(test)]
    pub(crate) fn with_settings(mut settings: Settings) -> Self {
        settings.storage.backend = crate::config::StorageBackend::Memory;
        let content = ContentBackend::Memory(crate::content::MemoryContentStore::new());
        Self::new(settings, content).unwrap()
    }
}
