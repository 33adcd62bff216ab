//! In-memory fakes for the store and the vision provider.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use jiff::Timestamp;
use url::Url;
use uuid::Uuid;
use vizor_gigachat::{Error as ProviderError, Image, Result as ProviderResult};
use vizor_gigachat::{VisionProvider, VisionService};

use super::{AnalysisStore, MaterialResult, StoredRequest};
use crate::Result;

#[derive(Default)]
struct StoreState {
    requests: HashMap<Uuid, StoredRequest>,
    objects: HashMap<Uuid, Vec<MaterialResult>>,
    writes: usize,
}

/// [`AnalysisStore`] kept in process memory. Clones share state.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seeds a request without counting it as a write.
    pub(crate) fn insert(&self, image_url: &str, raw_response: &str) -> Uuid {
        let request = stored_request(image_url, raw_response);
        let request_id = request.request_id;
        self.state().requests.insert(request_id, request);
        request_id
    }

    pub(crate) fn request(&self, request_id: Uuid) -> Option<StoredRequest> {
        self.state().requests.get(&request_id).cloned()
    }

    pub(crate) fn objects(&self, request_id: Uuid) -> Vec<MaterialResult> {
        self.state()
            .objects
            .get(&request_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.state().writes
    }
}

fn stored_request(image_url: &str, raw_response: &str) -> StoredRequest {
    StoredRequest {
        request_id: Uuid::new_v4(),
        image_url: image_url.to_owned(),
        created_at: Timestamp::now(),
        raw_response: raw_response.to_owned(),
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn create_request(&self, image_url: &str, raw_response: &str) -> Result<StoredRequest> {
        let request = stored_request(image_url, raw_response);
        let mut state = self.state();
        state.writes += 1;
        state.requests.insert(request.request_id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<StoredRequest>> {
        Ok(self.request(request_id))
    }

    async fn replace_objects(&self, request_id: Uuid, results: &[MaterialResult]) -> Result<()> {
        let mut state = self.state();
        state.writes += 1;
        state.objects.insert(request_id, results.to_vec());
        Ok(())
    }

    async fn list_objects(&self, request_id: Uuid) -> Result<Vec<MaterialResult>> {
        Ok(self.objects(request_id))
    }
}

type ErrorFactory = Arc<dyn Fn() -> ProviderError + Send + Sync>;

#[derive(Default)]
struct VisionState {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    fetched: Vec<String>,
}

/// [`VisionProvider`] answering from a script.
///
/// Every fetch returns a tiny JPEG; every analysis pops the next answer.
#[derive(Clone, Default)]
pub(crate) struct FakeVision {
    state: Arc<Mutex<VisionState>>,
    fetch_error: Option<ErrorFactory>,
    analysis_error: Option<ErrorFactory>,
}

impl FakeVision {
    pub(crate) fn answering<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fake = Self::default();
        fake.state().answers = answers.into_iter().map(Into::into).collect();
        fake
    }

    pub(crate) fn failing_fetch(error: impl Fn() -> ProviderError + Send + Sync + 'static) -> Self {
        Self {
            fetch_error: Some(Arc::new(error)),
            ..Self::default()
        }
    }

    pub(crate) fn failing_analysis(
        error: impl Fn() -> ProviderError + Send + Sync + 'static,
    ) -> Self {
        Self {
            analysis_error: Some(Arc::new(error)),
            ..Self::default()
        }
    }

    pub(crate) fn service(&self) -> VisionService {
        VisionService::new(self.clone())
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    pub(crate) fn fetched_urls(&self) -> Vec<String> {
        self.state().fetched.clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.state().fetched.len()
    }

    fn state(&self) -> MutexGuard<'_, VisionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl VisionProvider for FakeVision {
    async fn fetch_image(&self, url: &Url) -> ProviderResult<Image> {
        self.state().fetched.push(url.to_string());
        match &self.fetch_error {
            Some(error) => Err(error()),
            None => Ok(Image::new(&b"\xFF\xD8\xFF\xE0"[..], "image/jpeg")),
        }
    }

    async fn analyze(&self, _image: &Image, prompt: &str) -> ProviderResult<String> {
        if let Some(error) = &self.analysis_error {
            return Err(error());
        }

        let mut state = self.state();
        state.prompts.push(prompt.to_owned());
        Ok(state.answers.pop_front().unwrap_or_else(|| "[]".to_owned()))
    }
}
