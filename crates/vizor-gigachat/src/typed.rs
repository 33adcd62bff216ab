//! Typed request and response bodies for the provider endpoints.
//!
//! Response fields are optional; callers decide which absences are errors.

use serde::{Deserialize, Serialize};

/// `POST /oauth` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    /// Absolute expiry in Unix milliseconds.
    pub expires_at: Option<i64>,
}

/// `POST /files` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadResponse {
    pub id: Option<String>,
}

/// `POST /chat/completions` request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
    pub attachments: Vec<&'a str>,
}

impl<'a> ChatRequest<'a> {
    /// Single user message referencing one uploaded file.
    pub fn with_attachment(model: &'a str, prompt: &'a str, file_id: &'a str, temperature: f64) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                attachments: vec![file_id],
            }],
            temperature,
        }
    }
}

/// `POST /chat/completions` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, or an empty string when any part is missing.
    pub fn into_first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}
