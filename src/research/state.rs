use serde::Serialize;

use crate::report::Provenance;

/// Failure text fragments (lowercase) that mean the API credential itself was rejected.
const CREDENTIAL_PATTERNS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "api key expired",
    "api key has been blocked",
    "has been suspended",
    "unauthenticated",
    "401 unauthorized",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Credential,
    Generic,
}

/// Classify boundary failure text.
pub fn classify_failure(text: &str) -> FailureKind {
    let lower = text.to_lowercase();
    if CREDENTIAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureKind::Credential
    } else {
        FailureKind::Generic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Succeeded,
    Failed(FailureKind),
}

/// Progress of one two-tier generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    NotStarted,
    TryingPrimary,
    TryingFallback,
    Succeeded(Provenance),
    Failed(FailureKind),
}

impl GenerationState {
    /// Transition on `event`. Terminal states absorb every event, and events
    /// that make no sense for the current state leave it unchanged.
    pub fn advance(self, event: Event) -> Self {
        use GenerationState::*;

        match (self, event) {
            (NotStarted, Event::Start) => TryingPrimary,
            (TryingPrimary, Event::Succeeded) => Succeeded(Provenance::Retrieval),
            // A rejected key fails the fallback too.
            (TryingPrimary, Event::Failed(FailureKind::Credential)) => {
                Failed(FailureKind::Credential)
            }
            (TryingPrimary, Event::Failed(FailureKind::Generic)) => TryingFallback,
            (TryingFallback, Event::Succeeded) => Succeeded(Provenance::InternalKnowledge),
            (TryingFallback, Event::Failed(kind)) => Failed(kind),
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationState::Succeeded(_) | GenerationState::Failed(_))
    }

    /// Whether the call made in this state has retrieval enabled. `None` when no call is due.
    pub fn uses_retrieval(self) -> Option<bool> {
        match self {
            GenerationState::TryingPrimary => Some(true),
            GenerationState::TryingFallback => Some(false),
            _ => None,
        }
    }
}
