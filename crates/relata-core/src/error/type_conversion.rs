use super::{Error, ErrorKind};
use crate::stmt::Value;
use std::fmt;

#[derive(Debug)]
pub(super) struct TypeConversionError {
    from: Value,
    into: &'static str,
}

impl std::error::Error for TypeConversionError {}

impl fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.type_name();
        write!(f, "cannot convert {from} to {}", self.into)
    }
}

impl Error {
    /// `value` was found where a `into` was required.
    pub fn type_conversion(value: Value, into: &'static str) -> Error {
        Error::from(ErrorKind::TypeConversion(TypeConversionError {
            from: value,
            into,
        }))
    }
}
