//! Persistence seam of the analysis service.

use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;
use vizor_postgres::PgClient;
use vizor_postgres::model::{AnalysisRequest, DetectedObjectWithMaterials, NewAnalysisRequest, NewObjectWithMaterials};
use vizor_postgres::query::{AnalysisRequestRepository, DetectedObjectRepository};

use super::MaterialResult;
use crate::Result;

/// A stored analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRequest {
    pub request_id: Uuid,
    pub image_url: String,
    pub created_at: Timestamp,
    /// First-stage model answer as received, before cleaning.
    pub raw_response: String,
}

impl From<AnalysisRequest> for StoredRequest {
    fn from(request: AnalysisRequest) -> Self {
        Self {
            request_id: request.id,
            created_at: request.created_at(),
            raw_response: request.raw_response().to_owned(),
            image_url: request.image_url,
        }
    }
}

impl From<DetectedObjectWithMaterials> for MaterialResult {
    fn from(stored: DetectedObjectWithMaterials) -> Self {
        let materials = stored.material_names();
        Self::new(stored.object.name, materials)
    }
}

/// Storage used by [`AnalysisService`].
///
/// [`AnalysisService`]: super::AnalysisService
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Records a new request with a fresh identifier.
    async fn create_request(&self, image_url: &str, raw_response: &str) -> Result<StoredRequest>;

    /// Looks a request up by identifier.
    async fn find_request(&self, request_id: Uuid) -> Result<Option<StoredRequest>>;

    /// Atomically replaces every object and material stored under `request_id`.
    async fn replace_objects(&self, request_id: Uuid, results: &[MaterialResult]) -> Result<()>;

    /// Lists the objects stored under `request_id`, in insertion order.
    async fn list_objects(&self, request_id: Uuid) -> Result<Vec<MaterialResult>>;
}

#[async_trait]
impl AnalysisStore for PgClient {
    async fn create_request(&self, image_url: &str, raw_response: &str) -> Result<StoredRequest> {
        let request = self
            .create_analysis_request(NewAnalysisRequest::new(image_url, raw_response))
            .await?;
        Ok(request.into())
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<StoredRequest>> {
        let request = self.find_analysis_request(request_id).await?;
        Ok(request.map(Into::into))
    }

    async fn replace_objects(&self, request_id: Uuid, results: &[MaterialResult]) -> Result<()> {
        let objects = results
            .iter()
            .map(|result| {
                NewObjectWithMaterials::new(result.object_name.clone(), result.materials.clone())
            })
            .collect();

        self.replace_detected_objects(request_id, objects).await?;
        Ok(())
    }

    async fn list_objects(&self, request_id: Uuid) -> Result<Vec<MaterialResult>> {
        let objects = self.list_detected_objects(request_id).await?;
        Ok(objects.into_iter().map(Into::into).collect())
    }
}
