use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Boundary to the external text-generation service.
///
/// The pipeline only ever needs "instruction in, free-form text out";
/// auth, transport and model selection live behind this trait.
pub trait LlmClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Blocking HTTP client for an Ollama-compatible generation endpoint.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client with a finite request timeout. Calls past the
    /// timeout are aborted and surface as [`PipelineError::Http`].
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Local Ollama instance with a one-minute timeout.
    pub fn default_local(model: &str) -> Self {
        Self::new("http://localhost:11434", model, 60)
    }
}

/// Request body for /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                PipelineError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                PipelineError::Http(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                PipelineError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| PipelineError::JsonParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Scriptable client for tests: a fixed response or a scripted failure,
/// plus a call counter so callers can assert whether the service was
/// consulted at all.
pub struct MockLlmClient {
    responses: Mutex<Vec<Option<String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: Some(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the service were down.
    pub fn unreachable() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer with each scripted item in turn (None = connection
    /// failure), then fall back to the constructor behaviour.
    pub fn with_script(mut self, script: Vec<Option<String>>) -> Self {
        self.responses = Mutex::new(script);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .responses
            .lock()
            .ok()
            .and_then(|mut script| if script.is_empty() { None } else { Some(script.remove(0)) });
        let answer = match scripted {
            Some(item) => item,
            None => self.fallback.clone(),
        };
        answer.ok_or_else(|| PipelineError::Connection("mock".into()))
    }
}
