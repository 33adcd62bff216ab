//! Request types for HTTP handlers.

mod analysis;
mod paths;

pub use analysis::{DetectMaterials, DetectObjects};
pub use paths::AnalysisPathParams;
