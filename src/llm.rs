use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::ResearchConfig;
use crate::error::GenerationError;

/// One request to the generative text service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationCall {
    pub system_instruction: String,
    pub prompt: String,
    /// Enables live web retrieval (search grounding) for this call.
    pub use_retrieval: bool,
    pub temperature: f32,
}

/// Raw text plus the grounding URIs reported alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReply {
    pub text: String,
    pub citation_uris: Vec<String>,
}

/// The generation boundary. Errors are opaque; their text is inspected
/// only to classify credential failures.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, call: &GenerationCall) -> Result<GenerationReply>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &ResearchConfig) -> std::result::Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenerationError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Failed {
                detail: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Resolve the generateContent endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(":generateContent") {
            base.to_string()
        } else if base.ends_with("/v1beta") || base.ends_with("/v1") {
            format!("{}/models/{}:generateContent", base, self.model)
        } else {
            format!("{}/v1beta/models/{}:generateContent", base, self.model)
        }
    }

    fn request_body(call: &GenerationCall) -> serde_json::Value {
        let mut body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": call.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": call.prompt }] }],
            "generationConfig": { "temperature": call.temperature },
        });
        if call.use_retrieval {
            body["tools"] = serde_json::json!([{ "googleSearch": {} }]);
        }
        body
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, call: &GenerationCall) -> Result<GenerationReply> {
        debug!(
            model = %self.model,
            use_retrieval = call.use_retrieval,
            prompt_len = call.prompt.len(),
            "Sending generateContent request"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(call))
            .send()
            .await
            .context("Generation request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read generation response")?;

        if !status.is_success() {
            return Err(anyhow!("HTTP {}: {}", status, error_message(&text)));
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).context("Failed to parse generation JSON")?;
        Ok(parse_reply(&json))
    }
}

/// Pull a readable message out of an error payload, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let err = json.get("error")?;
            let message = err["message"].as_str().unwrap_or("");
            let status = err["status"].as_str().unwrap_or("");
            Some(format!("{} {}", status, message).trim().to_string())
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

/// Concatenate the first candidate's text parts and collect its grounding URIs.
fn parse_reply(json: &serde_json::Value) -> GenerationReply {
    let candidate = &json["candidates"][0];

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    let citation_uris = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|c| c["web"]["uri"].as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    GenerationReply {
        text,
        citation_uris,
    }
}
