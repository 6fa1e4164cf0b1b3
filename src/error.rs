use thiserror::Error;

/// Terminal outcome of a report generation, shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(
        "Generation Failed: the API key is invalid or has been blocked. \
         Check the configured key and its access to the generative language API. ({detail})"
    )]
    Credential { detail: String },

    #[error("Generation Failed: {detail}")]
    Failed { detail: String },

    #[error("API Key is missing. Set GEMINI_API_KEY in the environment or .env file.")]
    MissingApiKey,

    #[error("A subject is required to generate a report.")]
    EmptySubject,
}

impl GenerationError {
    pub fn is_credential(&self) -> bool {
        matches!(self, GenerationError::Credential { .. })
    }
}
