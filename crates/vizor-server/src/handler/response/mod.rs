//! Response types for HTTP handlers.

mod analysis;
mod errors;
mod monitors;

pub use analysis::{AnalysisRecord, DetectedObjects, MaterialResults};
pub use errors::ErrorResponse;
pub use monitors::{DatabaseStatus, MonitorStatus};
