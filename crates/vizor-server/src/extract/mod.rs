//! Request extractors with JSON error bodies.
//!
//! - [`Json`]: JSON body with descriptive rejection messages
//! - [`ValidateJson`]: [`Json`] followed by `validator` checks
//! - [`Path`]: path parameters with descriptive rejection messages

pub mod reject;

pub use crate::extract::reject::{Json, Path, ValidateJson};
