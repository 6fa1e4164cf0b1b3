/// Generation endpoint and sampling parameters.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Sampling temperature shared by both tiers. Kept low so reports stay near-deterministic.
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

impl ResearchConfig {
    /// Load from the process environment (and `.env` if present).
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        let defaults = Self::default();

        let base_url = dotenv::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let model = dotenv::var("GEMINI_MODEL").unwrap_or(defaults.model);
        let api_key = dotenv::var("GEMINI_API_KEY")
            .or_else(|_| dotenv::var("API_KEY"))
            .ok()
            .and_then(|k| normalize_key(&k));
        let temperature = dotenv::var("GEMINI_TEMPERATURE")
            .ok()
            .and_then(|s| s.trim().parse::<f32>().ok())
            .unwrap_or(defaults.temperature);
        let timeout_secs = dotenv::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            model,
            api_key,
            temperature,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = normalize_key(key);
        self
    }
}

/// Trim a key; blank keys count as absent.
fn normalize_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
