//! Two-stage image analysis.
//!
//! [`AnalysisService::detect_objects`] asks the model what is on a photo and
//! records the request. [`AnalysisService::detect_materials`] downloads the
//! photo again, asks about the materials of the objects the caller
//! confirmed, and replaces whatever that request stored before.

mod parser;
mod prompt;
mod store;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use url::Url;
use uuid::Uuid;
use vizor_gigachat::VisionService;

pub use self::parser::{
    MaterialResult, clean_json, decode_material_results, decode_object_list,
    parse_material_results, parse_object_list,
};
pub use self::prompt::{OBJECT_DETECTION_PROMPT, material_detection_prompt};
pub use self::store::{AnalysisStore, StoredRequest};
use crate::{Error, Result, TRACING_TARGET_ANALYSIS};

/// Outcome of the object detection stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDetection {
    pub request_id: Uuid,
    pub objects: Vec<String>,
}

/// A stored request together with its latest material results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDetails {
    pub request: StoredRequest,
    pub objects: Vec<MaterialResult>,
}

/// Orchestrates the vision provider and the store.
///
/// Cloning is cheap; clones share the store and the provider.
#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<dyn AnalysisStore>,
    vision: VisionService,
}

impl AnalysisService {
    pub fn new<S>(store: S, vision: VisionService) -> Self
    where
        S: AnalysisStore + 'static,
    {
        Self {
            store: Arc::new(store),
            vision,
        }
    }

    /// Lists the objects on the image at `image_url` and records the request.
    ///
    /// The raw model answer is stored for audit; the returned names are the
    /// parsed answer, or the raw answer alone when it could not be decoded.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_ANALYSIS, fields(image_url = %image_url))]
    pub async fn detect_objects(&self, image_url: &Url) -> Result<ObjectDetection> {
        ensure_http(image_url)?;

        let image = self.vision.fetch_image(image_url).await?;
        let answer = self.vision.analyze(&image, OBJECT_DETECTION_PROMPT).await?;
        let objects = parse_object_list(&answer);

        let request = self.store.create_request(image_url.as_str(), &answer).await?;

        tracing::info!(
            target: TRACING_TARGET_ANALYSIS,
            request_id = %request.request_id,
            object_count = objects.len(),
            "Objects detected"
        );

        Ok(ObjectDetection {
            request_id: request.request_id,
            objects,
        })
    }

    /// Classifies the materials of `confirmed_objects` on the image of `request_id`.
    ///
    /// Fails with a not found error, before any download or write, if the
    /// request does not exist. Stored objects are replaced, never appended to.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_ANALYSIS, fields(request_id = %request_id))]
    pub async fn detect_materials(
        &self,
        request_id: Uuid,
        confirmed_objects: &[String],
    ) -> Result<Vec<MaterialResult>> {
        let request = self.find_request(request_id).await?;
        let image_url = Url::parse(&request.image_url).map_err(|err| {
            Error::internal("analysis", "stored image URL is invalid").with_source(err)
        })?;

        let image = self.vision.fetch_image(&image_url).await?;
        let prompt = material_detection_prompt(confirmed_objects);
        let answer = self.vision.analyze(&image, &prompt).await?;
        let results = parse_material_results(&answer);

        self.store.replace_objects(request_id, &results).await?;

        tracing::info!(
            target: TRACING_TARGET_ANALYSIS,
            confirmed_count = confirmed_objects.len(),
            result_count = results.len(),
            "Materials detected"
        );

        Ok(results)
    }

    /// Returns a stored request with the objects of its last material detection.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_ANALYSIS, fields(request_id = %request_id))]
    pub async fn get_analysis(&self, request_id: Uuid) -> Result<AnalysisDetails> {
        let request = self.find_request(request_id).await?;
        let objects = self.store.list_objects(request_id).await?;

        Ok(AnalysisDetails { request, objects })
    }

    async fn find_request(&self, request_id: Uuid) -> Result<StoredRequest> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Analysis request {request_id} was not found")))
    }
}

fn ensure_http(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::invalid_input(format!(
            "Image URL must use http or https, got `{scheme}`"
        ))),
    }
}

impl fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisService")
            .field("vision", &self.vision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use vizor_gigachat::Error as ProviderError;

    use super::testing::{FakeVision, MemoryStore};
    use super::*;
    use crate::ErrorKind;

    const MATERIALS_ANSWER: &str =
        "```json\n[{\"objectName\": \"стол\", \"materials\": [\"дерево\", \"металл\"]}]\n```";

    fn url(value: &str) -> Url {
        Url::parse(value).expect("valid url")
    }

    #[tokio::test]
    async fn detect_objects_records_the_raw_answer() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let answer = "```json\n[\"стол\", \"стул\"]\n```";
        let vision = FakeVision::answering([answer]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let detection = service
            .detect_objects(&url("https://example.com/room.jpg"))
            .await?;

        assert_eq!(detection.objects, ["стол", "стул"]);

        let stored = store.request(detection.request_id).expect("request stored");
        assert_eq!(stored.image_url, "https://example.com/room.jpg");
        assert_eq!(stored.raw_response, answer);
        assert_eq!(vision.prompts(), [OBJECT_DETECTION_PROMPT]);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_objects_fall_back_to_the_raw_answer() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let vision = FakeVision::answering(["На фото стол и стул"]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let detection = service
            .detect_objects(&url("https://example.com/room.jpg"))
            .await?;

        assert_eq!(detection.objects, ["На фото стол и стул"]);
        assert_eq!(store.request_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_download_stores_nothing() {
        let store = MemoryStore::default();
        let vision = FakeVision::failing_fetch(|| ProviderError::NotAnImage {
            content_type: "text/html".to_owned(),
        });
        let service = AnalysisService::new(store.clone(), vision.service());

        let error = service
            .detect_objects(&url("https://example.com/missing.jpg"))
            .await
            .expect_err("download must fail");

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(store.request_count(), 0);
        assert!(vision.prompts().is_empty());
    }

    #[tokio::test]
    async fn non_http_urls_are_rejected() {
        let vision = FakeVision::answering(["[]"]);
        let service = AnalysisService::new(MemoryStore::default(), vision.service());

        let error = service
            .detect_objects(&url("file:///etc/passwd"))
            .await
            .expect_err("file URLs are rejected");

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(vision.fetch_count(), 0);
    }

    #[tokio::test]
    async fn provider_failures_propagate() {
        let store = MemoryStore::default();
        let vision = FakeVision::failing_analysis(|| ProviderError::MissingFileId);
        let service = AnalysisService::new(store.clone(), vision.service());

        let error = service
            .detect_objects(&url("https://example.com/room.jpg"))
            .await
            .expect_err("analysis must fail");

        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(store.request_count(), 0);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found_without_writes() {
        let store = MemoryStore::default();
        let vision = FakeVision::answering([MATERIALS_ANSWER]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let error = service
            .detect_materials(Uuid::new_v4(), &["стол".to_owned()])
            .await
            .expect_err("request does not exist");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(store.write_count(), 0);
        assert_eq!(vision.fetch_count(), 0);
    }

    #[tokio::test]
    async fn detect_materials_downloads_the_stored_url() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let request_id = store.insert("https://example.com/room.png", "[\"стол\"]");
        let vision = FakeVision::answering([MATERIALS_ANSWER]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let results = service
            .detect_materials(request_id, &["стол".to_owned(), "стул".to_owned()])
            .await?;

        assert_eq!(
            results,
            [MaterialResult::new(
                "стол",
                ["дерево".to_owned(), "металл".to_owned()]
            )]
        );
        assert_eq!(vision.fetched_urls(), ["https://example.com/room.png"]);
        assert!(vision.prompts()[0].contains("предметы: стол, стул."));
        assert_eq!(store.objects(request_id), results);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_material_detection_replaces_results() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let request_id = store.insert("https://example.com/room.jpg", "[]");
        let second = "[{\"objectName\": \"стул\", \"materials\": [\"пластик\"]}]";
        let vision = FakeVision::answering([MATERIALS_ANSWER, second]);
        let service = AnalysisService::new(store.clone(), vision.service());

        service
            .detect_materials(request_id, &["стол".to_owned()])
            .await?;
        service
            .detect_materials(request_id, &["стул".to_owned()])
            .await?;

        assert_eq!(
            store.objects(request_id),
            [MaterialResult::new("стул", ["пластик".to_owned()])]
        );
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_materials_clear_previous_results() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let request_id = store.insert("https://example.com/room.jpg", "[]");
        let vision = FakeVision::answering([MATERIALS_ANSWER, "не знаю"]);
        let service = AnalysisService::new(store.clone(), vision.service());

        service
            .detect_materials(request_id, &["стол".to_owned()])
            .await?;
        let results = service
            .detect_materials(request_id, &["стол".to_owned()])
            .await?;

        assert!(results.is_empty());
        assert!(store.objects(request_id).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_request_with_no_objects_is_not_found() {
        let store = MemoryStore::default();
        let vision = FakeVision::answering([MATERIALS_ANSWER]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let error = service
            .detect_materials(Uuid::new_v4(), &[])
            .await
            .expect_err("request does not exist");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(store.write_count(), 0);
        assert_eq!(vision.fetch_count(), 0);
    }

    #[tokio::test]
    async fn empty_confirmation_is_still_analyzed() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let request_id = store.insert("https://example.com/room.jpg", "[]");
        let vision = FakeVision::answering(["[]"]);
        let service = AnalysisService::new(store.clone(), vision.service());

        let results = service.detect_materials(request_id, &[]).await?;

        assert!(results.is_empty());
        assert_eq!(vision.fetch_count(), 1);
        assert_eq!(store.write_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn get_analysis_reads_back_stored_objects() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let request_id = store.insert("https://example.com/room.jpg", "[\"стол\"]");
        let vision = FakeVision::answering([MATERIALS_ANSWER]);
        let service = AnalysisService::new(store.clone(), vision.service());

        service
            .detect_materials(request_id, &["стол".to_owned()])
            .await?;
        let details = service.get_analysis(request_id).await?;

        assert_eq!(details.request.request_id, request_id);
        assert_eq!(details.objects.len(), 1);
        assert_eq!(details.objects[0].object_name, "стол");

        let missing = service.get_analysis(Uuid::new_v4()).await;
        assert!(missing.is_err_and(|e| e.kind() == ErrorKind::NotFound));
        Ok(())
    }
}
