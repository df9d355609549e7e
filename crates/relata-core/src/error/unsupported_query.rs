use super::Error;

/// Error when a query has a shape the entity engine cannot build.
///
/// This occurs when:
/// - A filter or ordering references a has-many relation through `find`
/// - A relation is referenced by a name the entity does not declare
#[derive(Debug)]
pub(super) struct UnsupportedQuery {
    message: Box<str>,
}

impl std::error::Error for UnsupportedQuery {}

impl core::fmt::Display for UnsupportedQuery {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported query: {}", self.message)
    }
}

impl Error {
    pub fn unsupported_query(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedQuery(UnsupportedQuery {
            message: message.into().into(),
        }))
    }

    /// Reference to an undeclared relation; the message lists the relation
    /// names that do exist.
    pub fn unknown_relation<I, S>(entity: &str, relation: &str, available: I) -> Error
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available = available
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>();

        let available = if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        };

        Error::unsupported_query(format!(
            "entity `{entity}` has no relation `{relation}`; available relations: {available}"
        ))
    }

    pub fn is_unsupported_query(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedQuery(_))
    }
}
