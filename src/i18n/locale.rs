use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,8}$").expect("valid language pattern"));
static COUNTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]{2}|[0-9]{3})$").expect("valid country pattern"));
static VARIANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z_-]*$").expect("valid variant pattern"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocaleParseError {
    #[error("Locale tag is empty")]
    Empty,

    #[error("Invalid language '{0}'")]
    Language(String),

    #[error("Invalid country '{0}'")]
    Country(String),

    #[error("Invalid variant '{0}'")]
    Variant(String),

    #[error("Locale tag '{0}' ends with a separator")]
    TrailingSeparator(String),
}

/// Language, optional country and optional variant.
///
/// Tags use `_` or `-` between parts: `en`, `en_US`, `pt-BR`, `en__POSIX`.
/// The language is stored lower-case and the country upper-case; the
/// variant is kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: String,
    variant: String,
}

impl Locale {
    pub fn new(language: &str, country: &str, variant: &str) -> Result<Self, LocaleParseError> {
        if !LANGUAGE.is_match(language) {
            return Err(LocaleParseError::Language(language.to_string()));
        }
        if !country.is_empty() && !COUNTRY.is_match(country) {
            return Err(LocaleParseError::Country(country.to_string()));
        }
        if !variant.is_empty() && !VARIANT.is_match(variant) {
            return Err(LocaleParseError::Variant(variant.to_string()));
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            country: country.to_ascii_uppercase(),
            variant: variant.to_string(),
        })
    }

    /// The empty locale. Never produced by parsing.
    pub fn blank() -> Self {
        Self {
            language: String::new(),
            country: String::new(),
            variant: String::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// BCP 47 style form for `Content-Language`, e.g. `en-US`.
    pub fn language_tag(&self) -> String {
        if self.country.is_empty() {
            self.language.clone()
        } else {
            format!("{}-{}", self.language, self.country)
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LocaleParseError::Empty);
        }

        let mut parts = tag.splitn(3, ['_', '-']);
        let language = parts.next().unwrap_or_default();
        let country = parts.next();
        let variant = parts.next().unwrap_or_default();

        if country.is_some_and(str::is_empty) && variant.is_empty() {
            return Err(LocaleParseError::TrailingSeparator(tag.to_string()));
        }

        Self::new(language, country.unwrap_or_default(), variant)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if !self.country.is_empty() || !self.variant.is_empty() {
            write!(f, "_{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}
