//! Due-diligence report generation.
//!
//! [`ResearchEngine`] asks a generative text service for a markdown report (with live
//! search, falling back to the model's own knowledge), [`report`] splits the trailing
//! JSON data block from the prose into an immutable [`Report`], and [`render`] turns the
//! report's shared block model into an interactive view or an exportable document.

pub mod config;
pub mod error;
pub mod llm;
pub mod markdown;
pub mod render;
pub mod report;
pub mod research;

pub use config::ResearchConfig;
pub use error::GenerationError;
pub use llm::{GeminiClient, GenerationBackend, GenerationCall, GenerationReply};
pub use markdown::{parse_blocks, Block, Inline, Span};
pub use render::{render_document, render_view, ExportDocument, ReportView};
pub use report::{assemble, extract, FinancialYearRecord, Provenance, Report};
pub use research::{GenerationRequest, ResearchEngine};
