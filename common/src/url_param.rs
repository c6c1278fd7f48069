//! URL-safe tokens for carrying browse state between runs.

use std::{fmt::Display, str::FromStr};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};


/// Wraps any serde value so it can be written as `URL_SAFE(base64(cbor))`
/// and parsed back with `FromStr`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UrlParam<T>(pub T);

impl<T> From<T> for UrlParam<T> {
    fn from(value: T) -> Self {
        UrlParam(value)
    }
}

impl<T> UrlParam<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Display for UrlParam<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut serialized = Vec::new();
        ciborium::into_writer(&self.0, &mut serialized).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", URL_SAFE.encode(serialized))
    }
}

#[derive(Debug)]
pub enum StateParseError {
    DecodeError(base64::DecodeError),
    CiboriumError(ciborium::de::Error<std::io::Error>),
}

impl std::fmt::Display for StateParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeError(err) => write!(f, "Failed to decode base64: {}", err),
            Self::CiboriumError(err) => write!(f, "Failed to deserialize: {}", err),
        }
    }
}

impl std::error::Error for StateParseError {}

impl<T: for<'de> Deserialize<'de>> FromStr for UrlParam<T> {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = URL_SAFE
            .decode(s.trim().as_bytes())
            .map_err(StateParseError::DecodeError)?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(bytes))
            .map_err(StateParseError::CiboriumError)?;
        Ok(UrlParam(parsed))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse_query::{FilterSet, PageCursor, PageDirection};

    #[test]
    fn token_is_url_safe_and_parses_back() {
        let state = (
            FilterSet::new("browseSubjects").with_query("Cats / history?"),
            PageCursor::initial().step(PageDirection::Next, "Cats+"),
        );
        let token = UrlParam(state.clone()).to_string();
        assert!(!token.contains('/') && !token.contains('+'));

        let parsed: UrlParam<(FilterSet, PageCursor)> = token.parse().unwrap();
        assert_eq!(parsed.into_inner(), state);
    }

    #[test]
    fn garbage_token_is_a_decode_error() {
        let parsed = "not base64 at all!".parse::<UrlParam<FilterSet>>();
        assert!(matches!(parsed, Err(StateParseError::DecodeError(_))));
    }
}
