//! Provider seam used by the analysis orchestrator.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::{Image, Result, TRACING_TARGET_CLIENT};

/// Image download plus one vision round-trip (upload, then complete).
///
/// [`GigaChatClient`] is the production implementation; tests substitute
/// in-memory fakes.
///
/// [`GigaChatClient`]: crate::GigaChatClient
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Downloads the caller's image.
    async fn fetch_image(&self, url: &Url) -> Result<Image>;

    /// Sends `image` with `prompt` and returns the model's raw answer.
    async fn analyze(&self, image: &Image, prompt: &str) -> Result<String>;
}

/// Shared handle to a [`VisionProvider`] that logs every call.
#[derive(Clone)]
pub struct VisionService {
    inner: Arc<dyn VisionProvider>,
}

impl fmt::Debug for VisionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionService").finish_non_exhaustive()
    }
}

impl VisionService {
    pub fn new<P>(provider: P) -> Self
    where
        P: VisionProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub async fn fetch_image(&self, url: &Url) -> Result<Image> {
        let started_at = Instant::now();
        let result = self.inner.fetch_image(url).await;

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                %url,
                error = %error,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Image fetch failed"
            );
        }

        result
    }

    pub async fn analyze(&self, image: &Image, prompt: &str) -> Result<String> {
        let started_at = Instant::now();
        let result = self.inner.analyze(image, prompt).await;
        let elapsed_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(answer) => tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                answer_len = answer.len(),
                elapsed_ms,
                "Vision analysis completed"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET_CLIENT,
                stage = %error.stage(),
                error = %error,
                elapsed_ms,
                "Vision analysis failed"
            ),
        }

        result
    }
}
