//! Supported content languages and per-language translation maps.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Fi,
    Sv,
    En,
}

impl Language {
    /// Language used when nothing else is requested or available
    pub const DEFAULT: Language = Language::Fi;

    /// Lower-case storage code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Fi => "fi",
            Language::Sv => "sv",
            Language::En => "en",
        }
    }

    /// Upper-case code used on the wire
    pub fn wire_code(&self) -> &'static str {
        match self {
            Language::Fi => "FI",
            Language::Sv => "SV",
            Language::En => "EN",
        }
    }

    /// Picks the first supported language out of an `Accept-Language` value
    pub fn from_accept_language(header: &str) -> Option<Language> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .filter_map(|tag| tag.trim().split('-').next())
            .find_map(|primary| primary.parse().ok())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fi" => Ok(Language::Fi),
            "sv" => Ok(Language::Sv),
            "en" => Ok(Language::En),
            _ => Err(DomainError::validation(format!(
                "Unsupported language code: {}",
                s
            ))),
        }
    }
}

/// One fixed translation record per language
pub type Translations<T> = BTreeMap<Language, T>;

/// Requested language first, then the default language, then anything.
pub fn resolve_translation<T>(translations: &Translations<T>, language: Language) -> Option<&T> {
    translations
        .get(&language)
        .or_else(|| translations.get(&Language::DEFAULT))
        .or_else(|| translations.values().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("FI".parse::<Language>().unwrap(), Language::Fi);
        assert_eq!("fi".parse::<Language>().unwrap(), Language::Fi);
        assert_eq!(" Sv ".parse::<Language>().unwrap(), Language::Sv);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_accept_language() {
        assert_eq!(Language::from_accept_language("sv-FI,sv;q=0.9"), Some(Language::Sv));
        assert_eq!(Language::from_accept_language("de-DE, en;q=0.5"), Some(Language::En));
        assert_eq!(Language::from_accept_language("de"), None);
    }

    #[test]
    fn test_resolve_translation_fallback() {
        let mut translations = Translations::new();
        translations.insert(Language::Sv, "svenska");

        assert_eq!(resolve_translation(&translations, Language::Sv), Some(&"svenska"));
        assert_eq!(resolve_translation(&translations, Language::En), Some(&"svenska"));

        translations.insert(Language::Fi, "suomi");
        assert_eq!(resolve_translation(&translations, Language::En), Some(&"suomi"));
    }
}
