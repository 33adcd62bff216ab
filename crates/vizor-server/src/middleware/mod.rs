//! Middleware for `axum::Router` and HTTP request processing.
//!
//! ```rust,no_run
//! use vizor_server::middleware::{
//!     CorsConfig, OpenApiConfig, RecoveryConfig, RouterObservabilityExt, RouterOpenApiExt,
//!     RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
//! };
//!
//! # fn build(state: vizor_server::service::ServiceState) -> axum::Router {
//! vizor_server::handler::routes()
//!     .with_open_api(&OpenApiConfig::default())
//!     .with_state(state)
//!     .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default())
//! # }
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, DEFAULT_MAX_BODY_SIZE, FrameOptions, ReferrerPolicy, RouterSecurityExt,
    SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};

/// Tracing target for security middleware.
pub const TRACING_TARGET_SECURITY: &str = "vizor_server::middleware::security";
