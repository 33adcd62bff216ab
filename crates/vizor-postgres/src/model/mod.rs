//! Diesel models for the analysis tables.
//!
//! Queryable structs mirror rows; `New*` structs are their insertable forms.

mod analysis_request;
mod detected_object;
mod object_material;

pub use analysis_request::{AnalysisRequest, NewAnalysisRequest};
pub use detected_object::{
    DetectedObject, DetectedObjectWithMaterials, NewDetectedObject, NewObjectWithMaterials,
};
pub use object_material::{NewObjectMaterial, ObjectMaterial};
