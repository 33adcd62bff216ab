//! Analysis request model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::analysis_requests;

/// A single object-detection call and the raw model answer it produced.
///
/// Rows are immutable once written; only their detected objects change.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = analysis_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnalysisRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Source image URL supplied by the caller.
    pub image_url: String,
    /// Timestamp when the request was created.
    pub created_at: Timestamp,
    /// Uncleaned first-stage model output, kept for audit.
    pub raw_detection_response: Option<String>,
}

/// Data for creating a new analysis request.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = analysis_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAnalysisRequest {
    /// Request ID.
    pub id: Uuid,
    /// Image URL.
    pub image_url: String,
    /// Raw detection response.
    pub raw_detection_response: Option<String>,
}

impl NewAnalysisRequest {
    /// Creates a new request with a freshly generated v4 identifier.
    pub fn new(image_url: impl Into<String>, raw_detection_response: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url: image_url.into(),
            raw_detection_response: Some(raw_detection_response.into()),
        }
    }
}

impl AnalysisRequest {
    /// Returns the creation time as a [`jiff::Timestamp`].
    #[inline]
    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }

    /// Returns the audited raw response, or an empty string when none was stored.
    #[inline]
    pub fn raw_response(&self) -> &str {
        self.raw_detection_response.as_deref().unwrap_or_default()
    }
}
