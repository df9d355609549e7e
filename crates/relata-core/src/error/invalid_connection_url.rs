use super::ErrorKind;
use crate::Error;

/// The connection URL could not be parsed or names no known driver.
#[derive(Debug)]
pub(super) struct InvalidConnectionUrl {
    url: Box<str>,
    reason: Box<str>,
}

impl Error {
    pub fn invalid_connection_url(url: &str, reason: impl Into<String>) -> Error {
        Error::from(ErrorKind::InvalidConnectionUrl(InvalidConnectionUrl {
            url: url.into(),
            reason: reason.into().into(),
        }))
    }

    pub fn is_invalid_connection_url(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidConnectionUrl(_))
    }
}

impl std::fmt::Display for InvalidConnectionUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid connection URL `{}`: {}", self.url, self.reason)
    }
}
