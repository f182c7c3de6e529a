//! Core types, traits, and pipeline orchestration for Mirage.
//!
//! Everything here is I/O-free except through the injected trait
//! implementations: the concrete fetcher, distiller, providers, and store
//! live in `mirage-client` and `mirage-db`.

pub mod clone;
pub mod error;
pub mod html;
pub mod models;
pub mod prompt;
pub mod testutil;
pub mod traits;

pub use clone::{CloneOutcome, CloneService};
pub use error::{AppError, PipelineError, PipelineStage};
pub use models::{
    AssetHints, CloneRecord, CloneSummary, DistilledPage, PageBlock, RawDocument, SynthesisResult,
    compute_hash, validate_url,
};
pub use traits::{CloneStore, Distiller, Fetcher, Provider};
