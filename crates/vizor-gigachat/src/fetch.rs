//! Image download and mime type detection.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{Error, Result, Stage, TRACING_TARGET_FETCH};

/// User agent sent with image downloads; some hosts refuse non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Downloaded image bytes and the mime type used to upload them.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Bytes,
    pub mime_type: &'static str,
}

impl Image {
    pub fn new(bytes: impl Into<Bytes>, mime_type: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Maps the extension of the URL path to an image mime type.
///
/// Query and fragment are ignored; unknown extensions fall back to `image/jpeg`.
pub fn mime_type_for(url: &Url) -> &'static str {
    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Downloads caller-supplied image URLs.
///
/// Uses its own client: image hosts are arbitrary, so the provider CA bundle
/// does not apply here.
#[derive(Clone)]
pub struct ImageFetcher {
    http: Client,
}

impl ImageFetcher {
    /// Creates a fetcher whose downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(Error::http(Stage::Setup))?;

        Ok(Self { http })
    }

    /// Downloads `url` and returns its body.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnImage`] when a content type is declared and is not `image/*`,
    ///   whatever the status code
    /// - [`Error::FetchFailure`] on any other non-success status
    #[tracing::instrument(skip_all, fields(url = %url), target = TRACING_TARGET_FETCH)]
    pub async fn fetch(&self, url: &Url) -> Result<Image> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(Error::http(Stage::Fetch))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        if let Some(content_type) = content_type
            && !content_type.trim_start().to_ascii_lowercase().starts_with("image/")
        {
            tracing::warn!(
                target: TRACING_TARGET_FETCH,
                status = status.as_u16(),
                %content_type,
                "Image URL returned non-image content"
            );
            return Err(Error::NotAnImage { content_type });
        }

        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET_FETCH,
                status = status.as_u16(),
                "Image download failed"
            );
            return Err(Error::FetchFailure { status });
        }

        let bytes = response.bytes().await.map_err(Error::http(Stage::Fetch))?;
        let image = Image::new(bytes, mime_type_for(url));

        tracing::debug!(
            target: TRACING_TARGET_FETCH,
            len = image.len(),
            mime_type = image.mime_type,
            "Image downloaded"
        );

        Ok(image)
    }
}

impl fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("test url")
    }

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(5)).expect("fetcher")
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for(&url("https://x.test/a/photo.PNG")), "image/png");
        assert_eq!(mime_type_for(&url("https://x.test/cat.gif?size=large")), "image/gif");
        assert_eq!(mime_type_for(&url("https://x.test/cat.webp#top")), "image/webp");
        assert_eq!(mime_type_for(&url("https://x.test/cat.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(&url("https://x.test/download?f=cat.png")), "image/jpeg");
        assert_eq!(mime_type_for(&url("https://x.test/")), "image/jpeg");
    }

    #[tokio::test]
    async fn image_body_is_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cat.png")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([0x89, b'P', b'N', b'G'])
            .create_async()
            .await;

        let image = fetcher()
            .fetch(&url(&format!("{}/cat.png", server.url())))
            .await
            .expect("image should download");

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes.as_ref(), &[0x89, b'P', b'N', b'G']);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn html_is_rejected_whatever_the_status() {
        let mut server = mockito::Server::new_async().await;
        for (path, status) in [("/ok", 200), ("/missing", 404)] {
            let _mock = server
                .mock("GET", path)
                .with_status(status)
                .with_header("content-type", "text/html; charset=utf-8")
                .with_body("<html></html>")
                .create_async()
                .await;

            let error = fetcher()
                .fetch(&url(&format!("{}{path}", server.url())))
                .await
                .expect_err("html must be rejected");
            assert!(
                matches!(error, Error::NotAnImage { ref content_type } if content_type.starts_with("text/html")),
                "{path}: {error:?}"
            );
        }
    }

    #[tokio::test]
    async fn error_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.jpg")
            .with_status(410)
            .with_header("content-type", "image/jpeg")
            .create_async()
            .await;

        let error = fetcher()
            .fetch(&url(&format!("{}/gone.jpg", server.url())))
            .await
            .expect_err("410 must fail");
        assert!(matches!(error, Error::FetchFailure { status } if status.as_u16() == 410));
    }
}
