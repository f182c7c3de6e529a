use crate::error::{AppError, PipelineError, PipelineStage};
use crate::models::{CloneRecord, SynthesisResult, validate_url};
use crate::traits::{CloneStore, Distiller, Fetcher, Provider, synthesize};

/// Result of one successful clone run.
#[derive(Debug)]
pub struct CloneOutcome {
    /// The synthesis output, for the immediate response.
    pub result: SynthesisResult,
    /// The record as built for persistence.
    pub record: CloneRecord,
    /// Set when synthesis succeeded but the store rejected the append.
    /// The HTML is still returned to the caller; history will not contain
    /// the record.
    pub store_warning: Option<PipelineError>,
}

/// Orchestrates the clone pipeline: validate → fetch → distill →
/// synthesize → persist.
///
/// Generic over all external dependencies via traits, enabling dependency
/// injection and testability without real HTTP or LLM calls. Each request
/// is an independent unit of work; the only shared state is the store.
pub struct CloneService<F, D, P, S>
where
    F: Fetcher,
    D: Distiller,
    P: Provider,
    S: CloneStore,
{
    fetcher: F,
    distiller: D,
    provider: P,
    store: S,
}

impl<F, D, P, S> CloneService<F, D, P, S>
where
    F: Fetcher,
    D: Distiller,
    P: Provider,
    S: CloneStore,
{
    pub fn new(fetcher: F, distiller: D, provider: P, store: S) -> Self {
        Self {
            fetcher,
            distiller,
            provider,
            store,
        }
    }

    /// Run the full clone pipeline for a URL.
    ///
    /// Any stage failure short-circuits as a [`PipelineError`] tagged with
    /// the failing stage; no record is persisted on failure. A record
    /// exists in the store iff the full pipeline succeeded — with one
    /// deliberate exception: if the append itself fails after a successful
    /// synthesis, the outcome is still `Ok` and carries the store error as
    /// a warning, so the synthesized HTML is never silently dropped.
    pub async fn clone_site(&self, url: &str) -> Result<CloneOutcome, PipelineError> {
        validate_url(url).map_err(|e| PipelineError::new(PipelineStage::Validate, e))?;

        tracing::info!(%url, "Fetching");
        let raw = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Fetch, e))?;
        tracing::info!(bytes = raw.body.len(), final_url = %raw.final_url, "Fetched");

        let page = self
            .distiller
            .distill(&raw)
            .map_err(|e| PipelineError::new(PipelineStage::Distill, e))?;
        tracing::info!(blocks = page.blocks.len(), "Distilled");

        tracing::info!(provider = self.provider.name(), "Synthesizing");
        let result = synthesize(&self.provider, &page, url)
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Synthesize, e))?;
        tracing::info!(bytes = result.html.len(), "Synthesis complete");

        let record = CloneRecord::create(url, result.html.clone());

        let store_warning = match self.store.append(&record).await {
            Ok(()) => {
                tracing::info!(filename = %record.filename, "Clone persisted");
                None
            }
            Err(e) => {
                tracing::warn!(filename = %record.filename, error = %e, "Persist failed; returning HTML without history entry");
                Some(PipelineError::new(PipelineStage::Persist, e))
            }
        };

        Ok(CloneOutcome {
            result,
            record,
            store_warning,
        })
    }
}
