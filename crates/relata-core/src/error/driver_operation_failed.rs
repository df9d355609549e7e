use super::{Error, ErrorKind};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The driver rejected an operation: a failed connect, a constraint
/// violation, a broken transaction control statement.
#[derive(Debug)]
pub(super) struct DriverOperationFailed(BoxError);

impl std::error::Error for DriverOperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

impl std::fmt::Display for DriverOperationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let causes = std::iter::successors(self.0.source(), |err| err.source());
        for cause in causes {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Wraps an error raised by the database library. The message is kept
    /// verbatim.
    pub fn driver_operation_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(ErrorKind::DriverOperationFailed(DriverOperationFailed(
            Box::new(err),
        )))
    }

    pub fn is_driver_operation_failed(&self) -> bool {
        matches!(self.kind(), ErrorKind::DriverOperationFailed(_))
    }
}
