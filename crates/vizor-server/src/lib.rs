#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for the analysis orchestrator.
pub const TRACING_TARGET_ANALYSIS: &str = "vizor_server::service::analysis";

/// Tracing target for service initialization.
pub const TRACING_TARGET_SERVICE: &str = "vizor_server::service";
