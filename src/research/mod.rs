pub mod prompts;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::ResearchConfig;
use crate::error::GenerationError;
use crate::llm::{GeminiClient, GenerationBackend, GenerationCall};
use crate::report::{assemble_with_provenance, Provenance, Report};

use state::{classify_failure, Event, FailureKind, GenerationState};

/// What to research. Subject is required; blank emphasis counts as none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    subject: String,
    emphasis: Option<String>,
}

impl GenerationRequest {
    pub fn new(subject: &str, emphasis: Option<&str>) -> Result<Self, GenerationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GenerationError::EmptySubject);
        }
        let emphasis = emphasis
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        Ok(Self {
            subject: subject.to_string(),
            emphasis,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn emphasis(&self) -> Option<&str> {
        self.emphasis.as_deref()
    }
}

/// Result of one generation plus every state it passed through.
#[derive(Debug)]
pub struct Generation {
    pub outcome: Result<Report, GenerationError>,
    pub trace: Vec<GenerationState>,
}

/// Two-tier report generator: retrieval-backed first, internal knowledge second.
///
/// Holds no per-request state, so one engine can serve concurrent requests
/// for different subjects.
pub struct ResearchEngine {
    backend: Arc<dyn GenerationBackend>,
    temperature: f32,
}

impl ResearchEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            temperature: ResearchConfig::default().temperature,
        }
    }

    /// Engine backed by the Gemini HTTP client.
    pub fn from_config(config: &ResearchConfig) -> Result<Self, GenerationError> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a report for `subject`, optionally focusing on `emphasis`.
    pub async fn generate(
        &self,
        subject: &str,
        emphasis: Option<&str>,
    ) -> Result<Report, GenerationError> {
        let request = GenerationRequest::new(subject, emphasis)?;
        self.run(&request).await.outcome
    }

    /// Drive the state machine until it reaches a terminal state.
    pub async fn run(&self, request: &GenerationRequest) -> Generation {
        let mut state = GenerationState::NotStarted.advance(Event::Start);
        let mut trace = vec![GenerationState::NotStarted, state];
        let mut last_failure = String::new();

        while let Some(use_retrieval) = state.uses_retrieval() {
            let call = self.call_for(request, use_retrieval);
            info!(
                subject = request.subject(),
                use_retrieval,
                "Requesting report generation"
            );

            match self.backend.generate(&call).await {
                Ok(reply) => {
                    state = state.advance(Event::Succeeded);
                    trace.push(state);

                    let provenance = if use_retrieval {
                        Provenance::Retrieval
                    } else {
                        Provenance::InternalKnowledge
                    };
                    // Without retrieval there is nothing to cite.
                    let citations = if use_retrieval {
                        reply.citation_uris
                    } else {
                        Vec::new()
                    };
                    let report = assemble_with_provenance(
                        request.subject(),
                        &reply.text,
                        citations,
                        provenance,
                        Utc::now(),
                    );

                    info!(
                        subject = request.subject(),
                        provenance = ?provenance,
                        body_len = report.body_markdown().len(),
                        records = report.financial_series().len(),
                        citations = report.citations().len(),
                        "Report generated"
                    );
                    return Generation {
                        outcome: Ok(report),
                        trace,
                    };
                }
                Err(e) => {
                    let detail = format!("{:#}", e);
                    let kind = classify_failure(&detail);
                    if use_retrieval && kind == FailureKind::Generic {
                        warn!(error = %detail, "Generation with search failed, retrying without search");
                    }
                    state = state.advance(Event::Failed(kind));
                    trace.push(state);
                    last_failure = detail;
                }
            }
        }

        let outcome = match state {
            GenerationState::Failed(FailureKind::Credential) => {
                error!(error = %last_failure, "Generation rejected: credential failure");
                Err(GenerationError::Credential {
                    detail: last_failure,
                })
            }
            _ => {
                error!(error = %last_failure, state = ?state, "Generation failed");
                Err(GenerationError::Failed {
                    detail: last_failure,
                })
            }
        };

        Generation { outcome, trace }
    }

    fn call_for(&self, request: &GenerationRequest, use_retrieval: bool) -> GenerationCall {
        let prompt = if use_retrieval {
            prompts::primary_prompt(request)
        } else {
            prompts::fallback_prompt(request)
        };
        GenerationCall {
            system_instruction: prompts::SYSTEM_INSTRUCTION.to_string(),
            prompt,
            use_retrieval,
            temperature: self.temperature,
        }
    }
}
