use super::{Error, ErrorKind};
use std::fmt;

/// A lookup expected at least one row and got none.
#[derive(Debug)]
pub(super) struct RecordNotFoundError {
    detail: Box<str>,
}

impl std::error::Error for RecordNotFoundError {}

impl fmt::Display for RecordNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.detail {
            "" => f.write_str("record not found"),
            detail => write!(f, "record not found: {detail}"),
        }
    }
}

impl Error {
    pub fn record_not_found(detail: impl Into<String>) -> Error {
        Error::from(ErrorKind::RecordNotFound(RecordNotFoundError {
            detail: detail.into().into(),
        }))
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::RecordNotFound(_))
    }
}
