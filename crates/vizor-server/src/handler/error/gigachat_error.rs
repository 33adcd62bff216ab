//! Vision provider error to HTTP error conversion.
//!
//! Image problems are the caller's fault (400). Provider failures become
//! 502 and name the failed stage; the upstream status and body are only kept
//! as server-side context.

use vizor_gigachat::{Error as ProviderError, Stage};

use crate::handler::{Error, ErrorKind};

/// Tracing target for provider error conversions.
const TRACING_TARGET: &str = "vizor_server::handler::gigachat";

impl From<ProviderError> for Error<'static> {
    fn from(error: ProviderError) -> Self {
        let stage = error.stage();

        match &error {
            ProviderError::NotAnImage { content_type } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    content_type = %content_type,
                    "image URL did not return an image"
                );

                ErrorKind::BadRequest
                    .with_message("The image URL does not point to an image")
                    .with_resource("image")
                    .with_context(format!("content type: {content_type}"))
            }
            _ if error.is_bad_image() => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    status = ?error.status(),
                    error = %error,
                    "image download failed"
                );

                ErrorKind::BadRequest
                    .with_message("The image could not be downloaded")
                    .with_resource("image")
                    .with_context(error.to_string())
            }
            _ if error.is_timeout() => {
                tracing::error!(
                    target: TRACING_TARGET,
                    stage = %stage,
                    error = %error,
                    "outbound request timed out"
                );

                let message = if stage == Stage::Fetch {
                    "The image download timed out"
                } else {
                    "The vision provider did not respond in time"
                };

                ErrorKind::GatewayTimeout
                    .with_message(message)
                    .with_context(error.to_string())
            }
            _ if error.is_config() => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "vision provider is misconfigured"
                );

                ErrorKind::InternalServerError.into_error()
            }
            _ => {
                tracing::error!(
                    target: TRACING_TARGET,
                    stage = %stage,
                    status = ?error.status(),
                    error = %error,
                    "vision provider request failed"
                );

                ErrorKind::BadGateway
                    .with_message(format!("The {stage} stage failed"))
                    .with_resource("vision")
                    .with_context(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn html_pages_are_bad_requests() {
        let error = Error::from(ProviderError::NotAnImage {
            content_type: "text/html; charset=utf-8".to_owned(),
        });

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("image"));
    }

    #[test]
    fn failed_downloads_are_bad_requests() {
        let error = Error::from(ProviderError::FetchFailure {
            status: StatusCode::NOT_FOUND,
        });

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert!(error.context().is_some_and(|c| c.contains("404")));
    }

    #[test]
    fn upstream_failures_name_the_stage() {
        let error = Error::from(ProviderError::UploadFailure {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            body: "file too large".to_owned(),
        });

        assert_eq!(error.kind(), ErrorKind::BadGateway);
        assert_eq!(error.message(), Some("The upload stage failed"));
        assert!(error.context().is_some_and(|c| c.contains("file too large")));
    }

    #[test]
    fn auth_failures_are_bad_gateway() {
        let error = Error::from(ProviderError::AuthFailure {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid credentials".to_owned(),
        });

        assert_eq!(error.kind(), ErrorKind::BadGateway);
        assert_eq!(error.message(), Some("The auth stage failed"));
    }

    #[test]
    fn configuration_errors_are_internal() {
        let error = Error::from(ProviderError::Config("bad key".to_owned()));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.context(), None);
    }
}
