//! Error types for the data-access layer.

use crate::driver::DriverError;
use crate::parser::ParseError;
use crate::types::ConversionError;

/// A value could not be bound to a parameter or read into a column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The value is not assignable or convertible to the target type.
    #[error("cannot bind {target}: {source}")]
    Conversion {
        /// Parameter, column or type the value was meant for.
        target: String,
        /// The underlying conversion failure.
        source: ConversionError,
    },

    /// An input marker has no value at execution time.
    #[error("parameter :{name} is not bound")]
    Unbound {
        /// Upper-cased parameter name.
        name: String,
    },
}

/// Errors raised by connections, statements and result tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A parameter or column value could not be converted.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// The native driver rejected a call.
    #[error("{source} [query: {query}]")]
    Execution {
        /// Clean text of the statement that failed.
        query: String,
        /// The wrapped driver error.
        source: DriverError,
    },

    /// An operation was called out of order.
    #[error("protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// A column name did not resolve.
    #[error("no such column: {name} (available: {available})")]
    NoSuchColumn {
        /// The requested name.
        name: String,
        /// Comma-separated column names of the result.
        available: String,
    },

    /// One or more resources failed to close.
    #[error("failed to release resources:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Resource(Vec<DriverError>),
}

impl Error {
    /// Wraps a driver error with the query it belongs to.
    #[must_use]
    pub fn execution(query: impl Into<String>, source: DriverError) -> Self {
        Self::Execution {
            query: query.into(),
            source,
        }
    }

    /// Creates a protocol misuse error.
    #[must_use]
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::ProtocolMisuse(message.into())
    }

    /// Returns the wrapped driver error, if any.
    #[must_use]
    pub const fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for data-access operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Collects close failures so that every resource gets released.
#[derive(Debug, Default)]
pub(crate) struct CloseErrors(Vec<DriverError>);

impl CloseErrors {
    pub(crate) fn record(&mut self, result: std::result::Result<(), DriverError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    pub(crate) fn absorb(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {}
            Err(Error::Resource(errors)) => self.0.extend(errors),
            Err(Error::Execution { source, .. }) => self.0.push(source),
            Err(other) => self.0.push(DriverError::new(other.to_string())),
        }
    }

    pub(crate) fn into_result(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Resource(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_display_keeps_query() {
        let err = Error::execution(
            "SELECT * FROM missing",
            DriverError::new("no such table: missing").with_vendor_code(1),
        );
        let message = err.to_string();
        assert!(message.contains("no such table: missing"));
        assert!(message.contains("[query: SELECT * FROM missing]"));
        assert!(err.driver_error().is_some());
    }

    #[test]
    fn test_close_errors_aggregate() {
        let mut errors = CloseErrors::default();
        errors.record(Ok(()));
        errors.record(Err(DriverError::new("cursor")));
        errors.absorb(Err(Error::Resource(vec![DriverError::new("statement")])));
        let err = errors.into_result().unwrap_err();
        let Error::Resource(all) = &err else {
            panic!("expected resource error, got {err:?}");
        };
        assert_eq!(all.len(), 2);
        assert!(err.to_string().contains("  - cursor"));
    }

    #[test]
    fn test_close_errors_empty_is_ok() {
        assert!(CloseErrors::default().into_result().is_ok());
    }
}
