//! Provider error taxonomy.

use reqwest::StatusCode;
use strum::{AsRefStr, Display, IntoStaticStr};

/// Result type alias for provider operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Pipeline stage an [`Error`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Building clients from configuration.
    Setup,
    /// Downloading the caller's image.
    Fetch,
    /// Obtaining an access token.
    Auth,
    /// Uploading the image to the provider.
    Upload,
    /// Requesting the chat completion.
    Completion,
}

/// Error returned by the provider integration.
///
/// Upstream failures carry the status and the response body as received.
#[derive(Debug, thiserror::Error)]
#[must_use = "provider errors should be handled appropriately"]
pub enum Error {
    /// Image download returned a non-success status.
    #[error("image download failed with status {status}")]
    FetchFailure { status: StatusCode },

    /// Image URL answered with something that is not an image.
    #[error("image URL returned non-image content type `{content_type}`")]
    NotAnImage { content_type: String },

    /// Provider rejected the authentication request.
    #[error("provider authentication failed with status {status}: {body}")]
    AuthFailure { status: StatusCode, body: String },

    /// Provider rejected the file upload.
    #[error("file upload failed with status {status}: {body}")]
    UploadFailure { status: StatusCode, body: String },

    /// Provider rejected the chat completion request.
    #[error("chat completion failed with status {status}: {body}")]
    CompletionFailure { status: StatusCode, body: String },

    /// Upload succeeded but the response carried no file id.
    #[error("file upload response did not contain a file id")]
    MissingFileId,

    /// Invalid provider configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configured CA bundle could not be read or parsed.
    #[error("invalid CA certificate bundle: {0}")]
    Certificate(String),

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {source}")]
    Http {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// A success response could not be decoded.
    #[error("failed to decode {stage} response: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn http(stage: Stage) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { stage, source }
    }

    pub(crate) fn decode(stage: Stage) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Decode { stage, source }
    }

    /// Returns the stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::FetchFailure { .. } | Self::NotAnImage { .. } => Stage::Fetch,
            Self::AuthFailure { .. } => Stage::Auth,
            Self::UploadFailure { .. } | Self::MissingFileId => Stage::Upload,
            Self::CompletionFailure { .. } => Stage::Completion,
            Self::Config(_) | Self::Certificate(_) => Stage::Setup,
            Self::Http { stage, .. } | Self::Decode { stage, .. } => *stage,
        }
    }

    /// Returns the upstream status code, if the error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::FetchFailure { status }
            | Self::AuthFailure { status, .. }
            | Self::UploadFailure { status, .. }
            | Self::CompletionFailure { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns whether the caller supplied an unusable image URL.
    pub fn is_bad_image(&self) -> bool {
        matches!(self, Self::FetchFailure { .. } | Self::NotAnImage { .. })
            || matches!(self, Self::Http { stage: Stage::Fetch, source } if !source.is_timeout())
    }

    /// Returns whether the provider itself answered with an error.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::AuthFailure { .. }
                | Self::UploadFailure { .. }
                | Self::CompletionFailure { .. }
                | Self::MissingFileId
                | Self::Decode { .. }
        ) || matches!(self, Self::Http { stage, source } if *stage != Stage::Fetch && !source.is_timeout())
    }

    /// Returns whether a request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }

    /// Returns whether the error comes from invalid local configuration.
    pub fn is_config(&self) -> bool {
        matches!(self.stage(), Stage::Setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_the_pipeline() {
        let fetch = Error::FetchFailure {
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(fetch.stage(), Stage::Fetch);
        assert_eq!(fetch.status(), Some(StatusCode::NOT_FOUND));
        assert!(fetch.is_bad_image());
        assert!(!fetch.is_upstream());

        let upload = Error::MissingFileId;
        assert_eq!(upload.stage(), Stage::Upload);
        assert!(upload.is_upstream());
        assert_eq!(upload.status(), None);
    }

    #[test]
    fn upstream_errors_keep_status_and_body() {
        let error = Error::CompletionFailure {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "rate limited".to_owned(),
        };

        assert_eq!(error.stage().as_ref(), "completion");
        assert!(error.to_string().contains("429"));
        assert!(error.to_string().contains("rate limited"));
    }

    #[test]
    fn certificate_errors_are_setup_errors() {
        let error = Error::Certificate("bad pem".to_owned());
        assert!(error.is_config());
        assert!(!error.is_upstream());
    }
}
