//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{
    CloneRecord, CloneSummary, DistilledPage, PageBlock, RawDocument,
};
use crate::traits::{CloneStore, Distiller, Fetcher, Provider};

/// Build a `RawDocument` around an HTML body, as a real fetch would.
pub fn raw_doc(body: &str) -> RawDocument {
    RawDocument {
        body: body.to_string(),
        final_url: "https://example.com/".to_string(),
        content_type: "text/html; charset=utf-8".to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response and counts calls.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    responses: Arc<Mutex<Vec<Result<RawDocument, AppError>>>>,
    /// Number of fetch calls observed.
    pub calls: Arc<Mutex<usize>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(raw_doc(html))])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<RawDocument, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<RawDocument, AppError> {
        *self.calls.lock().unwrap() += 1;
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(raw_doc("<html><body>default</body></html>"))
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockDistiller
// ---------------------------------------------------------------------------

/// Mock distiller: wraps the raw body into a single block, or fails.
#[derive(Clone)]
pub struct MockDistiller {
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockDistiller {
    /// Distiller that emits one `body` block containing the raw text.
    pub fn passthrough() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Distiller for MockDistiller {
    fn distill(&self, raw: &RawDocument) -> Result<DistilledPage, AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        Ok(DistilledPage {
            title: None,
            blocks: vec![PageBlock {
                tag: "body".to_string(),
                text: raw.body.clone(),
                style: None,
            }],
            assets: Default::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// Mock provider that returns scripted raw model output.
///
/// Uses the default prompt builder and response parser, so tests exercise
/// the real document extraction against the scripted output. Prompts are
/// recorded for assertions.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new(raw_output: &str) -> Self {
        Self::with_responses(vec![Ok(raw_output.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// Mock store backed by an in-memory Vec, recording appends.
#[derive(Clone)]
pub struct MockStore {
    pub appended: Arc<Mutex<Vec<CloneRecord>>>,
    append_error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            appended: Arc::new(Mutex::new(Vec::new())),
            append_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_append_error(error: AppError) -> Self {
        Self {
            appended: Arc::new(Mutex::new(Vec::new())),
            append_error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl CloneStore for MockStore {
    async fn append(&self, record: &CloneRecord) -> Result<(), AppError> {
        let mut err = self.append_error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        let mut appended = self.appended.lock().unwrap();
        if appended.iter().any(|r| r.filename == record.filename) {
            return Err(AppError::DuplicateFilename(record.filename.clone()));
        }
        appended.push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CloneSummary>, AppError> {
        let appended = self.appended.lock().unwrap();
        let mut summaries: Vec<_> = appended.iter().map(CloneRecord::summary).collect();
        summaries.reverse(); // newest first
        Ok(summaries)
    }

    async fn get_by_filename(&self, filename: &str) -> Result<Option<CloneRecord>, AppError> {
        let appended = self.appended.lock().unwrap();
        Ok(appended.iter().find(|r| r.filename == filename).cloned())
    }
}
