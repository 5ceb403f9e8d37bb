use crate::i18n::Locale;

/// Decides whether a candidate locale may be used.
///
/// `source` names where the candidate came from, e.g. `"request"` or
/// `"cookie"`, and is only used for logging by implementations.
pub trait LocaleValidator: Send + Sync {
    fn test(&self, source: &str, locale: &Locale) -> bool;
}

/// Allow-list from `i18n.supported_locales`. Without a list every locale
/// passes.
#[derive(Debug, Clone, Default)]
pub struct SupportedLocales {
    locales: Option<Vec<Locale>>,
}

impl SupportedLocales {
    pub fn accept_all() -> Self {
        Self { locales: None }
    }

    /// Parses a comma separated list, skipping malformed entries.
    pub fn parse(list: &str) -> Self {
        let locales = list
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .filter_map(|tag| match tag.parse::<Locale>() {
                Ok(locale) => Some(locale),
                Err(e) => {
                    tracing::warn!(tag, error = %e, "Skipping malformed supported locale");
                    None
                }
            })
            .collect();
        Self {
            locales: Some(locales),
        }
    }

    pub fn from_config(list: Option<&str>) -> Self {
        list.map_or_else(Self::accept_all, Self::parse)
    }

    /// True when a list is configured but holds no usable locale.
    pub fn is_empty(&self) -> bool {
        self.locales.as_ref().is_some_and(Vec::is_empty)
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.locales.as_ref().is_none_or(|list| list.contains(locale))
    }

    pub fn locales(&self) -> Option<&[Locale]> {
        self.locales.as_deref()
    }
}

impl LocaleValidator for SupportedLocales {
    fn test(&self, source: &str, locale: &Locale) -> bool {
        let ok = self.contains(locale);
        if !ok {
            tracing::debug!(source, %locale, "Locale not in supported list");
        }
        ok
    }
}
