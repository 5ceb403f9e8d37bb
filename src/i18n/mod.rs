//! Request locale resolution.

mod locale;
mod resolver;
mod validator;

pub use locale::{Locale, LocaleParseError};
pub use resolver::{
    LOCALE_PARAMETER, LocaleResolver, LocaleSource, LocaleSources, ResolvedLocale,
    parse_accept_language,
};
pub use validator::{LocaleValidator, SupportedLocales};
