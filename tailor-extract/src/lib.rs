//! Job-description extraction from arbitrary job-posting URLs.
//!
//! The pipeline fetches a page, strips it down to plain text and decides
//! whether that text is usable as-is, too sparse (script-rendered pages,
//! metadata-only shells) or too large and noisy. Sparse and noisy pages are
//! routed through a completion model; every model failure degrades to the
//! best raw text available instead of failing the request.
//!
//! - [`normalize`]: HTML → plain text, no I/O
//! - [`fetch`]: capped, timed GET with a closed set of user-facing errors
//! - [`model`]: prompt templates, truncation and output sanitation around an
//!   [`LlmClient`](tailor_llm::traits::LlmClient)
//! - [`orchestrator`]: the ordered fallback chain
//!
//! ```no_run
//! use std::sync::Arc;
//! use tailor_extract::{ExtractionLimits, ExtractionOrchestrator};
//! use tailor_llm::disabled::DisabledClient;
//!
//! # async fn demo() -> tailor_common::Result<()> {
//! let orchestrator =
//!     ExtractionOrchestrator::with_llm(Arc::new(DisabledClient), ExtractionLimits::default())?;
//! match orchestrator.extract("https://jobs.example.com/rust-engineer").await {
//!     Ok(text) => println!("{text}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # Ok(()) }
//! ```
pub mod error;
pub mod fetch;
pub mod limits;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod text;

pub use error::{ErrorKind, ExtractionError, FetchError, ModelError};
pub use fetch::{PageFetcher, PageSource, RawPage};
pub use limits::ExtractionLimits;
pub use model::ModelExtractor;
pub use normalize::normalize;
pub use orchestrator::{ExtractionOrchestrator, ExtractionOutcome, Provenance};
