use std::future::Future;

use crate::error::AppError;
use crate::models::{CloneRecord, CloneSummary, DistilledPage, RawDocument, SynthesisResult};

/// Fetches the raw document for an already-validated http/https URL.
///
/// At-most-one attempt per call; retry policy, if any, belongs to the
/// caller.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawDocument, AppError>> + Send;
}

/// Reduces a raw document into a compact structural representation.
///
/// Must be deterministic: the same `RawDocument` always yields the same
/// `DistilledPage`.
pub trait Distiller: Send + Sync + Clone {
    fn distill(&self, raw: &RawDocument) -> Result<DistilledPage, AppError>;
}

/// An interchangeable LLM backend capable of turning a distilled page
/// description into synthesized HTML.
///
/// The capability set is {build-prompt, invoke, parse-response}. Prompt
/// construction and document extraction are shared defaults; each backend
/// supplies its own wire call in `invoke` (envelope shapes differ across
/// backends). No retries here — the caller decides whether a failure is
/// terminal.
pub trait Provider: Send + Sync + Clone {
    /// Stable backend name, recorded on each synthesis result.
    fn name(&self) -> &'static str;

    /// Serialize the distilled page plus source URL into one instruction.
    fn build_prompt(&self, page: &DistilledPage, source_url: &str) -> String {
        crate::prompt::build_prompt(page, source_url)
    }

    /// Single call to the backend; returns the raw model output text.
    fn invoke(&self, prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Extract the HTML document from the raw model output.
    fn parse_response(&self, raw: &str) -> Result<String, AppError> {
        crate::html::extract_document(raw)
    }
}

/// Run one full synthesis against a provider: build the prompt, invoke the
/// backend, parse the output.
pub async fn synthesize<P: Provider>(
    provider: &P,
    page: &DistilledPage,
    source_url: &str,
) -> Result<SynthesisResult, AppError> {
    let prompt = provider.build_prompt(page, source_url);
    let raw = provider.invoke(&prompt).await?;
    let html = provider.parse_response(&raw)?;
    Ok(SynthesisResult {
        html,
        provider: provider.name().to_string(),
    })
}

/// Persists and retrieves clone records.
///
/// The store is the system of record for history: an acknowledged append
/// must survive a process restart, and `filename` uniquely identifies one
/// record for the lifetime of the store.
pub trait CloneStore: Send + Sync + Clone {
    /// Append a new record. Rejects an existing filename — duplicates are
    /// a programming error, surfaced not swallowed.
    fn append(&self, record: &CloneRecord) -> impl Future<Output = Result<(), AppError>> + Send;

    /// List record summaries, newest first. Deterministic given the same
    /// writes.
    fn list(&self) -> impl Future<Output = Result<Vec<CloneSummary>, AppError>> + Send;

    /// Point lookup by filename.
    fn get_by_filename(
        &self,
        filename: &str,
    ) -> impl Future<Output = Result<Option<CloneRecord>, AppError>> + Send;
}
