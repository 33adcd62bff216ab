//! Analysis response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::{AnalysisDetails, MaterialResult, ObjectDetection};

/// Result of the object detection stage.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObjects {
    /// Identifier to pass to the material detection stage.
    pub request_id: Uuid,
    /// Object names suggested by the model.
    ///
    /// A single entry that does not look like an object name means the model
    /// answer could not be decoded; the entry holds that answer.
    pub probable_objects: Vec<String>,
}

impl From<ObjectDetection> for DetectedObjects {
    fn from(detection: ObjectDetection) -> Self {
        Self {
            request_id: detection.request_id,
            probable_objects: detection.objects,
        }
    }
}

/// Result of the material detection stage, one entry per object.
pub type MaterialResults = Vec<MaterialResult>;

/// A stored analysis request with its latest material results.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Unique identifier of the analysis request.
    pub request_id: Uuid,
    /// Image URL the request was created for.
    pub image_url: String,
    /// Timestamp when the request was created.
    pub created_at: Timestamp,
    /// Objects and materials stored by the last material detection call.
    pub objects: Vec<MaterialResult>,
}

impl From<AnalysisDetails> for AnalysisRecord {
    fn from(details: AnalysisDetails) -> Self {
        Self {
            request_id: details.request.request_id,
            image_url: details.request.image_url,
            created_at: details.request.created_at,
            objects: details.objects,
        }
    }
}
