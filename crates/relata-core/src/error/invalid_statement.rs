use super::{Error, ErrorKind};
use std::fmt;

/// A statement tree that cannot be turned into SQL, or a command whose
/// payload does not fit the entity it targets. Raised before anything
/// reaches the driver.
#[derive(Debug)]
pub(super) struct InvalidStatement {
    message: Box<str>,
}

impl std::error::Error for InvalidStatement {}

impl fmt::Display for InvalidStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid statement: ")?;
        f.write_str(&self.message)
    }
}

impl Error {
    pub fn invalid_statement(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::InvalidStatement(InvalidStatement {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_statement(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidStatement(_))
    }
}
