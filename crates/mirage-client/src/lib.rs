//! Concrete pipeline components: HTTP fetcher, HTML distiller, and the
//! LLM provider backends.

pub mod distiller;
pub mod fetcher;
pub mod providers;

pub use distiller::ScraperDistiller;
pub use fetcher::ReqwestFetcher;
pub use providers::{
    AnyProvider, ClaudeProvider, GeminiProvider, OpenAiProvider, ProviderConfig, ProviderKind,
};
