mod adhoc;
mod connection_pool;
mod driver_operation_failed;
mod invalid_connection_url;
mod invalid_mapping;
mod invalid_statement;
mod record_not_found;
mod type_conversion;
mod unsupported_query;

use adhoc::AdhocError;
use connection_pool::ConnectionPoolError;
use driver_operation_failed::DriverOperationFailed;
use invalid_connection_url::InvalidConnectionUrl;
use invalid_mapping::InvalidMapping;
use invalid_statement::InvalidStatement;
use record_not_found::RecordNotFoundError;
use std::{fmt, sync::Arc};
use type_conversion::TypeConversionError;
use unsupported_query::UnsupportedQuery;

/// Return early with an ad-hoc error built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Build an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in relata.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    fn new(kind: ErrorKind, cause: Option<Error>) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause })),
        }
    }

    /// Wraps this error under `consequent`, which is displayed first.
    ///
    /// `consequent` keeps only its own message; any cause it carried is
    /// replaced by `self`.
    pub fn context(self, consequent: impl Into<Error>) -> Error {
        let kind = match consequent.into().inner.map(Arc::try_unwrap) {
            Some(Ok(inner)) => inner.kind,
            Some(Err(shared)) => ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())),
            None => ErrorKind::Unknown,
        };

        Error::new(kind, Some(self))
    }

    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(args.to_string())))
    }

    /// This error followed by its causes, outermost first.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| err.inner.as_ref()?.cause.as_ref())
    }

    fn kind(&self) -> &ErrorKind {
        match &self.inner {
            Some(inner) => &inner.kind,
            None => &ErrorKind::Unknown,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::DriverOperationFailed(err) => Some(err),
            ErrorKind::ConnectionPool(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, err) in self.chain().enumerate() {
            if depth > 0 {
                f.write_str(": ")?;
            }
            fmt::Display::fmt(err.kind(), f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) if f.alternate() => f
                .debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish(),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

macro_rules! error_kinds {
    ( $( $variant:ident($ty:ty), )* ) => {
        #[derive(Debug)]
        enum ErrorKind {
            $( $variant($ty), )*
            Unknown,
        }

        impl fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( ErrorKind::$variant(err) => fmt::Display::fmt(err, f), )*
                    ErrorKind::Unknown => f.write_str("unknown relata error"),
                }
            }
        }
    };
}

error_kinds! {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    DriverOperationFailed(DriverOperationFailed),
    ConnectionPool(ConnectionPoolError),
    InvalidConnectionUrl(InvalidConnectionUrl),
    InvalidMapping(InvalidMapping),
    InvalidStatement(InvalidStatement),
    UnsupportedQuery(UnsupportedQuery),
    RecordNotFound(RecordNotFoundError),
    TypeConversion(TypeConversionError),
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind, None)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}
