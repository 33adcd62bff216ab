//! Repositories over the analysis tables.
//!
//! Each repository is a trait implemented for [`PgClient`]; every method checks
//! out its own pooled connection.
//!
//! [`PgClient`]: crate::PgClient

mod analysis_request;
mod detected_object;

pub use analysis_request::AnalysisRequestRepository;
pub use detected_object::DetectedObjectRepository;
