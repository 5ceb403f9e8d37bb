use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{ConfigError, I18nConfig};
use crate::i18n::{Locale, LocaleValidator, SupportedLocales};

/// Request parameter that selects a locale explicitly, alongside the one
/// named after the locale attribute
pub const LOCALE_PARAMETER: &str = "locale";

/// Where a resolved locale was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocaleSource {
    RequestParameter,
    Session,
    Cookie,
    Pipeline,
    Negotiated,
    Default,
    Blank,
    /// No candidate passed; the configured default was used unchecked
    Fallback,
}

impl LocaleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestParameter => "request",
            Self::Session => "session",
            Self::Cookie => "cookie",
            Self::Pipeline => "pipeline",
            Self::Negotiated => "negotiated",
            Self::Default => "default",
            Self::Blank => "blank",
            Self::Fallback => "fallback",
        }
    }
}

/// Locale candidates gathered from one request.
#[derive(Debug, Clone, Default)]
pub struct LocaleSources {
    /// Value of the `locale` request parameter
    pub request_parameter: Option<String>,
    /// Value stored in the session under the locale attribute
    pub session: Option<String>,
    /// Values of cookies named after the locale attribute, in header order
    pub cookies: Vec<String>,
    /// Raw `Accept-Language` header
    pub accept_language: Option<String>,
}

/// Outcome of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub locale: Locale,
    pub source: LocaleSource,
}

impl ResolvedLocale {
    pub fn language(&self) -> &str {
        self.locale.language()
    }

    pub fn country(&self) -> &str {
        self.locale.country()
    }

    pub fn variant(&self) -> &str {
        self.locale.variant()
    }

    /// Full locale string, e.g. `en_US`.
    pub fn locale_string(&self) -> String {
        self.locale.to_string()
    }
}

/// Language tags of an `Accept-Language` header, best quality first.
///
/// Entries with `q=0` or an unreadable quality are dropped. Ties keep header
/// order. Tags are not parsed here, so `*` survives and is rejected later.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(f32, &str)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let tag = parts.next().filter(|t| !t.is_empty())?;
            let mut quality = 1.0_f32;
            for param in parts {
                if let Some(q) = param
                    .strip_prefix("q=")
                    .or_else(|| param.strip_prefix("Q="))
                {
                    quality = q.trim().parse().ok()?;
                }
            }
            (quality > 0.0).then_some((quality, tag))
        })
        .collect();

    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
    weighted.into_iter().map(|(_, tag)| tag.to_string()).collect()
}

/// Ordered locale fallback chain.
///
/// The chain tries the request parameter, the session attribute, matching
/// cookies, the pipeline locale, the negotiated locales, the default and,
/// when enabled, the blank locale. Each candidate must parse and pass the
/// validator.
#[derive(Clone)]
pub struct LocaleResolver {
    validator: Arc<dyn LocaleValidator>,
    default_locale: Locale,
    server_locale: Locale,
    pipeline_locale: Option<String>,
    use_blank: bool,
    attribute: String,
}

impl LocaleResolver {
    pub fn new(
        validator: Arc<dyn LocaleValidator>,
        default_locale: Locale,
        server_locale: Locale,
    ) -> Self {
        Self {
            validator,
            default_locale,
            server_locale,
            pipeline_locale: None,
            use_blank: false,
            attribute: "locale-attribute".to_string(),
        }
    }

    pub fn from_config(config: &I18nConfig) -> Result<Self, ConfigError> {
        let parse = |field: &str, tag: &str| {
            tag.parse::<Locale>().map_err(|e| ConfigError::ValidationError {
                field: field.to_string(),
                message: e.to_string(),
            })
        };
        let validator = SupportedLocales::from_config(config.supported_locales.as_deref());

        Ok(Self {
            validator: Arc::new(validator),
            default_locale: parse("i18n.default_locale", &config.default_locale)?,
            server_locale: parse("i18n.server_locale", &config.server_locale)?,
            pipeline_locale: config.pipeline_locale.clone(),
            use_blank: false,
            attribute: config.attribute.clone(),
        })
    }

    pub fn with_pipeline_locale(mut self, tag: impl Into<String>) -> Self {
        self.pipeline_locale = Some(tag.into());
        self
    }

    pub fn with_blank_locale(mut self, enabled: bool) -> Self {
        self.use_blank = enabled;
        self
    }

    /// Session attribute and cookie name carrying the locale.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    fn candidate(&self, source: LocaleSource, tag: &str) -> Option<Locale> {
        match tag.parse::<Locale>() {
            Ok(locale) if self.validator.test(source.as_str(), &locale) => Some(locale),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(source = source.as_str(), tag, error = %e, "Ignoring malformed locale");
                None
            }
        }
    }

    /// First valid locale along the chain, if any.
    pub fn find_locale(&self, sources: &LocaleSources) -> Option<(Locale, LocaleSource)> {
        let single = [
            (LocaleSource::RequestParameter, sources.request_parameter.as_deref()),
            (LocaleSource::Session, sources.session.as_deref()),
        ];
        let cookies = sources
            .cookies
            .iter()
            .map(|c| (LocaleSource::Cookie, Some(c.as_str())));
        let pipeline = [(LocaleSource::Pipeline, self.pipeline_locale.as_deref())];

        let negotiated = match sources.accept_language.as_deref().map(parse_accept_language) {
            Some(tags) if !tags.is_empty() => tags,
            _ => vec![self.server_locale.to_string()],
        };
        let negotiated = negotiated.iter().map(|t| (LocaleSource::Negotiated, Some(t.as_str())));

        let default = self.default_locale.to_string();
        let default = [(LocaleSource::Default, Some(default.as_str()))];

        let found = single
            .into_iter()
            .chain(cookies)
            .chain(pipeline)
            .chain(negotiated)
            .chain(default)
            .find_map(|(source, tag)| Some((self.candidate(source, tag?)?, source)));

        found.or_else(|| {
            let blank = Locale::blank();
            (self.use_blank && self.validator.test(LocaleSource::Blank.as_str(), &blank))
                .then_some((blank, LocaleSource::Blank))
        })
    }

    /// Resolves the request locale, falling back to the configured default.
    pub fn resolve(&self, sources: &LocaleSources) -> ResolvedLocale {
        let (locale, source) = self
            .find_locale(sources)
            .unwrap_or_else(|| (self.default_locale.clone(), LocaleSource::Fallback));

        tracing::debug!(%locale, source = source.as_str(), "Resolved request locale");
        ResolvedLocale { locale, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(supported: Option<&str>) -> LocaleResolver {
        LocaleResolver::new(
            Arc::new(SupportedLocales::from_config(supported)),
            "en".parse().unwrap(),
            "en".parse().unwrap(),
        )
    }

    fn sources() -> LocaleSources {
        LocaleSources {
            accept_language: Some(String::new()),
            ..LocaleSources::default()
        }
    }

    #[test]
    fn test_accept_language_ordering() {
        assert_eq!(
            parse_accept_language("fr;q=0.5, de, en-GB;q=0.8, *;q=0.1, it;q=0"),
            vec!["de", "en-GB", "fr", "*"]
        );
        assert_eq!(parse_accept_language("da, en;q=1"), vec!["da", "en"]);
        assert_eq!(parse_accept_language("xx;q=abc, yy"), vec!["yy"]);
        assert!(parse_accept_language("").is_empty());
    }

    #[test]
    fn test_request_parameter_wins() {
        let r = resolver(None);
        let s = LocaleSources {
            request_parameter: Some("de".to_string()),
            session: Some("fr".to_string()),
            ..sources()
        };
        let resolved = r.resolve(&s);
        assert_eq!(resolved.locale_string(), "de");
        assert_eq!(resolved.source, LocaleSource::RequestParameter);
    }

    #[test]
    fn test_disallowed_parameter_falls_through_in_order() {
        let r = resolver(Some("en, fr")).with_pipeline_locale("fr");
        let mut s = LocaleSources {
            request_parameter: Some("de".to_string()),
            session: Some("fr".to_string()),
            cookies: vec!["en".to_string()],
            accept_language: Some("en".to_string()),
        };
        assert_eq!(r.find_locale(&s).map(|(_, src)| src), Some(LocaleSource::Session));

        s.session = None;
        assert_eq!(r.find_locale(&s).map(|(_, src)| src), Some(LocaleSource::Cookie));

        s.cookies = vec!["zz".to_string(), "de".to_string()];
        assert_eq!(r.find_locale(&s).map(|(_, src)| src), Some(LocaleSource::Pipeline));

        let r = resolver(Some("en, fr"));
        assert_eq!(r.find_locale(&s).map(|(_, src)| src), Some(LocaleSource::Negotiated));

        s.accept_language = Some("de, *".to_string());
        assert_eq!(r.find_locale(&s).map(|(_, src)| src), Some(LocaleSource::Default));
    }

    #[test]
    fn test_missing_header_uses_server_locale() {
        let r = LocaleResolver::new(
            Arc::new(SupportedLocales::parse("fr, en")),
            "en".parse().unwrap(),
            "fr".parse().unwrap(),
        );
        let (locale, source) = r.find_locale(&LocaleSources::default()).unwrap();
        assert_eq!(locale.to_string(), "fr");
        assert_eq!(source, LocaleSource::Negotiated);
    }

    #[test]
    fn test_no_valid_source_uses_default() {
        let r = LocaleResolver::new(
            Arc::new(SupportedLocales::parse("fr")),
            "en".parse().unwrap(),
            "en".parse().unwrap(),
        );
        let s = LocaleSources {
            request_parameter: Some("de".to_string()),
            ..sources()
        };
        assert!(r.find_locale(&s).is_none());

        let resolved = r.resolve(&s);
        assert_eq!(resolved.locale_string(), "en");
        assert_eq!(resolved.source, LocaleSource::Fallback);
        assert_eq!(resolved.language(), "en");
        assert_eq!(resolved.country(), "");
    }

    #[test]
    fn test_blank_locale_only_when_enabled() {
        struct OnlyBlank;
        impl LocaleValidator for OnlyBlank {
            fn test(&self, _: &str, locale: &Locale) -> bool {
                locale.language().is_empty()
            }
        }

        let r = LocaleResolver::new(
            Arc::new(OnlyBlank),
            "en".parse().unwrap(),
            "en".parse().unwrap(),
        );
        assert!(r.find_locale(&sources()).is_none());

        let r = r.with_blank_locale(true);
        assert_eq!(
            r.find_locale(&sources()).map(|(_, s)| s),
            Some(LocaleSource::Blank)
        );
    }

    #[test]
    fn test_any_valid_tag_accepted_without_list() {
        let r = resolver(None);
        let s = LocaleSources {
            cookies: vec!["pt-br".to_string()],
            ..sources()
        };
        let resolved = r.resolve(&s);
        assert_eq!(resolved.locale_string(), "pt_BR");
        assert_eq!(resolved.country(), "BR");
    }
}
