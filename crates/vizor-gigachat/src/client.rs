//! GigaChat REST client.

use std::fmt;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Certificate, Client};
use url::Url;

use crate::typed::{ChatRequest, ChatResponse, UploadResponse};
use crate::{
    AccessToken, Error, GigaChatConfig, Image, ImageFetcher, Result, Stage, TRACING_TARGET_CLIENT,
    TokenCache, VisionProvider, VisionService,
};

/// File name reported for every uploaded image.
const UPLOAD_FILE_NAME: &str = "image_upload";

/// Upload purpose accepted by the files endpoint.
const UPLOAD_PURPOSE: &str = "general";

/// Sampling temperature of every completion.
pub const COMPLETION_TEMPERATURE: f64 = 0.1;

struct GigaChatClientInner {
    http: Client,
    config: GigaChatConfig,
    tokens: TokenCache,
    fetcher: ImageFetcher,
}

/// Client for the GigaChat files and chat completion endpoints.
///
/// Certificate verification stays on. When the configuration names a CA
/// bundle, its certificates are trusted in addition to the platform roots.
///
/// ```rust,ignore
/// let client = GigaChatClient::new(config, ImageFetcher::new(Duration::from_secs(30))?)?;
/// let image = client.fetch_image(&url).await?;
/// let answer = client.analyze(&image, "What is in the photo?").await?;
/// ```
#[derive(Clone)]
pub struct GigaChatClient {
    inner: Arc<GigaChatClientInner>,
}

impl GigaChatClient {
    /// Validates `config` and builds the provider HTTP client.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or an unreadable CA bundle.
    pub fn new(config: GigaChatConfig, fetcher: ImageFetcher) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().timeout(config.timeout());
        if let Some(path) = &config.gigachat_ca_cert {
            let pem = std::fs::read(path).map_err(|err| {
                Error::Certificate(format!("failed to read {}: {err}", path.display()))
            })?;
            let certificates = Certificate::from_pem_bundle(&pem)
                .map_err(|err| Error::Certificate(format!("{}: {err}", path.display())))?;
            if certificates.is_empty() {
                return Err(Error::Certificate(format!(
                    "{} contains no certificates",
                    path.display()
                )));
            }

            tracing::info!(
                target: TRACING_TARGET_CLIENT,
                path = %path.display(),
                count = certificates.len(),
                "Trusting additional provider certificates"
            );
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let http = builder.build().map_err(Error::http(Stage::Setup))?;
        let tokens = TokenCache::new(http.clone(), &config);

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            api_url = config.api_base(),
            model = %config.gigachat_model,
            timeout_secs = config.gigachat_timeout_secs,
            "GigaChat client created"
        );

        Ok(Self {
            inner: Arc::new(GigaChatClientInner {
                http,
                config,
                tokens,
                fetcher,
            }),
        })
    }

    #[inline]
    pub fn config(&self) -> &GigaChatConfig {
        &self.inner.config
    }

    /// Wraps the client for dependency injection.
    pub fn into_service(self) -> VisionService {
        VisionService::new(self)
    }

    /// Uploads `image` and returns the provider file id.
    #[tracing::instrument(skip_all, fields(len = image.len(), mime_type = image.mime_type), target = TRACING_TARGET_CLIENT)]
    pub async fn upload(&self, image: &Image, token: &AccessToken) -> Result<String> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(image.mime_type)
            .map_err(Error::http(Stage::Upload))?;
        let form = Form::new()
            .part("file", part)
            .text("purpose", UPLOAD_PURPOSE);

        let response = self
            .inner
            .http
            .post(self.endpoint("files"))
            .bearer_auth(token.secret())
            .multipart(form)
            .send()
            .await
            .map_err(Error::http(Stage::Upload))?;

        let status = response.status();
        let body = response.text().await.map_err(Error::http(Stage::Upload))?;
        if !status.is_success() {
            return Err(Error::UploadFailure { status, body });
        }

        let decoded: UploadResponse =
            serde_json::from_str(&body).map_err(Error::decode(Stage::Upload))?;
        let file_id = decoded
            .id
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingFileId)?;

        tracing::debug!(target: TRACING_TARGET_CLIENT, %file_id, "Image uploaded");
        Ok(file_id)
    }

    /// Asks the model about an uploaded file and returns the first answer.
    ///
    /// A success response without content yields an empty string.
    #[tracing::instrument(skip_all, fields(%file_id), target = TRACING_TARGET_CLIENT)]
    pub async fn complete(&self, file_id: &str, prompt: &str, token: &AccessToken) -> Result<String> {
        let config = &self.inner.config;
        let request = ChatRequest::with_attachment(
            &config.gigachat_model,
            prompt,
            file_id,
            COMPLETION_TEMPERATURE,
        );

        let response = self
            .inner
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await
            .map_err(Error::http(Stage::Completion))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(Error::http(Stage::Completion))?;
        if !status.is_success() {
            return Err(Error::CompletionFailure { status, body });
        }

        let decoded: ChatResponse =
            serde_json::from_str(&body).map_err(Error::decode(Stage::Completion))?;
        let answer = decoded.into_first_content();

        if answer.is_empty() {
            tracing::warn!(target: TRACING_TARGET_CLIENT, "Completion returned no content");
        }

        Ok(answer)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.config.api_base())
    }
}

#[async_trait::async_trait]
impl VisionProvider for GigaChatClient {
    async fn fetch_image(&self, url: &Url) -> Result<Image> {
        self.inner.fetcher.fetch(url).await
    }

    async fn analyze(&self, image: &Image, prompt: &str) -> Result<String> {
        let token = self.inner.tokens.get_token().await?;
        let file_id = self.upload(image, &token).await?;
        self.complete(&file_id, prompt, &token).await
    }
}

impl fmt::Debug for GigaChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GigaChatClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
