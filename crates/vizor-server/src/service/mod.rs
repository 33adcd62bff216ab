//! Application services, configuration and dependency injection.

pub mod analysis;
mod service_config;
mod service_state;

pub use crate::service::analysis::{
    AnalysisDetails, AnalysisService, AnalysisStore, MaterialResult, ObjectDetection,
    StoredRequest,
};
pub use crate::service::service_config::ServiceConfig;
pub use crate::service::service_state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, ErrorKind, Result};
