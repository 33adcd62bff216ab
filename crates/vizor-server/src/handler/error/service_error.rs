//! Service error to HTTP error conversion.
//!
//! Provider and database sources are mapped by their own conversions; errors
//! without a typed source are mapped by kind.

use vizor_postgres::PgError;

use super::http_error::{Error as HttpError, ErrorKind};
use crate::{Error as ServiceError, ErrorKind as ServiceErrorKind};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "vizor_server::handler::service";

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        let kind = error.kind();
        let message = error.message().to_owned();

        let Some(source) = error.into_source() else {
            return from_kind(kind, message);
        };

        let source = match source.downcast::<vizor_gigachat::Error>() {
            Ok(provider_error) => return HttpError::from(*provider_error),
            Err(source) => source,
        };

        match source.downcast::<PgError>() {
            Ok(pg_error) => HttpError::from(*pg_error),
            Err(source) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error_kind = %kind,
                    source = %source,
                    "Service operation failed"
                );
                from_kind(kind, message)
            }
        }
    }
}

fn from_kind(kind: ServiceErrorKind, message: String) -> HttpError<'static> {
    match kind {
        ServiceErrorKind::InvalidInput => {
            tracing::warn!(target: TRACING_TARGET, %message, "Invalid input");
            ErrorKind::BadRequest.with_message(message)
        }
        ServiceErrorKind::NotFound => {
            tracing::debug!(target: TRACING_TARGET, %message, "Resource not found");
            ErrorKind::NotFound
                .with_message(message)
                .with_resource("analysis_request")
        }
        ServiceErrorKind::Timeout => {
            tracing::error!(target: TRACING_TARGET, %message, "Service timed out");
            ErrorKind::GatewayTimeout.with_context(message)
        }
        ServiceErrorKind::External => {
            tracing::error!(target: TRACING_TARGET, %message, "External service failed");
            ErrorKind::BadGateway.with_context(message)
        }
        ServiceErrorKind::Config | ServiceErrorKind::Internal => {
            tracing::error!(
                target: TRACING_TARGET,
                error_kind = %kind,
                %message,
                "Internal service error"
            );
            ErrorKind::InternalServerError.with_context(message)
        }
    }
}
