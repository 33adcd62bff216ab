//! Service layer error types.
//!
//! [`Error`] is what the analysis orchestrator returns. It keeps the
//! originating provider or database error as its source so the HTTP layer can
//! map it precisely.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use vizor_postgres::PgError;

/// Boxed error used as the source of an [`Error`].
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of a service layer [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    Config,
    /// The caller supplied something unusable (bad image URL, empty object list).
    InvalidInput,
    /// A referenced analysis request does not exist.
    NotFound,
    /// The vision provider failed.
    External,
    /// An outbound call did not finish in time.
    Timeout,
    /// Database or other internal failure.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::External => "external_service",
            Self::Timeout => "timeout",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with a kind, a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consumes the error and returns its source, if any.
    #[inline]
    pub fn into_source(self) -> Option<BoxedError> {
        self.source
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a new not found error.
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new external service error.
    #[inline]
    pub fn external(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(
            ErrorKind::External,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Creates a new timeout error.
    #[inline]
    pub fn timeout(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(
            ErrorKind::Internal,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl From<vizor_gigachat::Error> for Error {
    fn from(err: vizor_gigachat::Error) -> Self {
        let error = if err.is_bad_image() {
            Error::invalid_input(err.to_string())
        } else if err.is_timeout() {
            Error::timeout(format!("{} request timed out", err.stage()))
        } else if err.is_config() {
            Error::config(err.to_string())
        } else {
            Error::external("gigachat", err.to_string())
        };

        error.with_source(err)
    }
}

impl From<PgError> for Error {
    fn from(err: PgError) -> Self {
        Error::internal("postgres", err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use vizor_gigachat::Error as ProviderError;

    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "invalid configuration");
        assert_eq!(error.to_string(), "config error: invalid configuration");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::internal("service", "cannot read file").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert!(error.into_source().is_some());
    }

    #[test]
    fn non_image_urls_are_invalid_input() {
        let error = Error::from(ProviderError::NotAnImage {
            content_type: "text/html".to_owned(),
        });

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(error.message().contains("text/html"));
    }

    #[test]
    fn provider_failures_are_external() {
        let error = Error::from(ProviderError::MissingFileId);
        assert_eq!(error.kind(), ErrorKind::External);
        assert!(error.message().starts_with("gigachat: "));

        let source = error.into_source().expect("source is kept");
        assert!(source.downcast_ref::<ProviderError>().is_some());
    }

    #[test]
    fn certificate_errors_are_config() {
        let error = Error::from(ProviderError::Certificate("empty bundle".to_owned()));
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn database_errors_are_internal() {
        let error = Error::from(PgError::Config("bad url".to_owned()));
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(error.message().contains("postgres"));
    }

    #[test]
    fn error_kind_as_str() {
        assert_eq!(ErrorKind::InvalidInput.as_str(), "invalid_input");
        assert_eq!(ErrorKind::External.as_str(), "external_service");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }
}
