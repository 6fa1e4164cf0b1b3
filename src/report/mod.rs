pub mod citations;
pub mod extract;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::markdown::{parse_blocks, Block};

pub use citations::dedupe_citations;
pub use extract::{extract, FinancialYearRecord};

/// Appended to bodies generated without live retrieval.
pub const INTERNAL_KNOWLEDGE_DISCLAIMER: &str = "> *Note: This report was generated using the \
model's internal knowledge base as live search was unavailable. Figures may be estimates.*";

/// Where the report's facts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Generated with live web retrieval.
    Retrieval,
    /// Retrieval was unavailable; the model answered from internal knowledge.
    InternalKnowledge,
}

/// A finished report. Never mutated after assembly; a new generation
/// produces a new value.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Content-addressed ID (blake3 hex of subject and body).
    id: String,
    subject: String,
    body_markdown: String,
    financial_series: Vec<FinancialYearRecord>,
    citations: BTreeSet<String>,
    provenance: Provenance,
    generated_at: DateTime<Utc>,
    #[serde(skip)]
    blocks: OnceLock<Vec<Block>>,
}

impl Report {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Report prose with the data block removed.
    pub fn body_markdown(&self) -> &str {
        &self.body_markdown
    }

    /// Financial series, oldest year first. Empty when the response had no usable data block.
    pub fn financial_series(&self) -> &[FinancialYearRecord] {
        &self.financial_series
    }

    pub fn citations(&self) -> &BTreeSet<String> {
        &self.citations
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Block model of the body, parsed on first use and shared by every renderer.
    pub fn blocks(&self) -> &[Block] {
        self.blocks.get_or_init(|| parse_blocks(&self.body_markdown))
    }
}

/// Build a report from a retrieval-backed response, stamped with the current time.
pub fn assemble<I, S>(subject: &str, raw_body: &str, citations: I) -> Report
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assemble_with_provenance(subject, raw_body, citations, Provenance::Retrieval, Utc::now())
}

/// Build a report, appending the internal-knowledge disclaimer when retrieval was not used.
///
/// Pure: equal inputs give an equal report.
pub fn assemble_with_provenance<I, S>(
    subject: &str,
    raw_body: &str,
    citations: I,
    provenance: Provenance,
    generated_at: DateTime<Utc>,
) -> Report
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (mut body_markdown, financial_series) = extract(raw_body);

    if provenance == Provenance::InternalKnowledge {
        if !body_markdown.is_empty() {
            body_markdown.push_str("\n\n");
        }
        body_markdown.push_str(INTERNAL_KNOWLEDGE_DISCLAIMER);
    }

    let id = {
        let mut hasher = blake3::Hasher::new();
        hasher.update(subject.as_bytes());
        hasher.update(b"\0");
        hasher.update(body_markdown.as_bytes());
        hasher.finalize().to_hex().to_string()
    };

    Report {
        id,
        subject: subject.to_string(),
        body_markdown,
        financial_series,
        citations: dedupe_citations(citations),
        provenance,
        generated_at,
        blocks: OnceLock::new(),
    }
}
