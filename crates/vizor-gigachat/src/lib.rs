#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod fetch;
mod provider;
mod token;
mod typed;

pub use crate::client::{COMPLETION_TEMPERATURE, GigaChatClient};
pub use crate::config::GigaChatConfig;
pub use crate::error::{Error, Result, Stage};
pub use crate::fetch::{BROWSER_USER_AGENT, Image, ImageFetcher, mime_type_for};
pub use crate::provider::{VisionProvider, VisionService};
pub use crate::token::{AccessToken, TOKEN_SAFETY_MARGIN, TokenCache};

/// Tracing target for token acquisition and refresh.
pub const TRACING_TARGET_AUTH: &str = "vizor_gigachat::auth";

/// Tracing target for image downloads.
pub const TRACING_TARGET_FETCH: &str = "vizor_gigachat::fetch";

/// Tracing target for file upload and chat completion calls.
pub const TRACING_TARGET_CLIENT: &str = "vizor_gigachat::client";
