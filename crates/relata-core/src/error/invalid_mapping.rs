use super::Error;

/// Error when an entity or relation descriptor is malformed.
///
/// This occurs when:
/// - A relation targets an entity that is not part of the repository
/// - A relation is missing its foreign key
/// - A join-table relation is missing its reverse foreign key
/// - A has-many relation is marked eager
///
/// The message always names the offending relation or entity.
#[derive(Debug)]
pub(super) struct InvalidMapping {
    message: Box<str>,
}

impl std::error::Error for InvalidMapping {}

impl core::fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping: {}", self.message)
    }
}

impl Error {
    pub fn invalid_mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMapping {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidMapping(_))
    }
}
