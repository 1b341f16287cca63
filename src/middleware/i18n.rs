// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n::DEFAULT_LANG;

// Idioma negociado a partir do Accept-Language ("pt-BR" -> "pt").
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .map(Locale)
            .unwrap_or_default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_primary_language_tag() {
        assert_eq!(Locale::from_header("pt-BR,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("en-US").0, "en");
    }

    #[test]
    fn empty_header_uses_default_language() {
        assert_eq!(Locale::from_header("").0, DEFAULT_LANG);
    }
}
