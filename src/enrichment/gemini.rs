//! Gemini `generateContent` client over reqwest.

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::EnrichmentError;

use super::mock::MockResponder;
use super::prompts::build_prompt_with_context;
use super::{
    GenerateOptions, GeneratedText, TextGenerator, TokenCallback, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const TOP_P: f32 = 0.95;
const TOP_K: u32 = 40;
const MAX_ERROR_BODY: usize = 1024;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, plus its finish reason.
    fn into_text(self) -> (String, Option<String>) {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return (String::new(), None);
        };
        let text = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        (text, candidate.finish_reason)
    }
}

fn build_request(prompt: &str, temperature: Option<f32>, max_tokens: Option<u32>) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            top_p: TOP_P,
            top_k: TOP_K,
        },
    }
}

fn decode_response(body: &str) -> Result<(String, Option<String>), EnrichmentError> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        let msg = format!("Failed to parse Gemini response: {}", e);
        error!("{}", msg);
        EnrichmentError::Decode(msg)
    })?;
    Ok(response.into_text())
}

/// Decode one SSE line. Returns the chunk text for `data:` lines that carry any.
fn decode_sse_line(line: &str) -> Result<Option<String>, EnrichmentError> {
    let Some(payload) = line.trim_end_matches('\r').strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }
    let (text, _) = decode_response(payload)?;
    Ok((!text.is_empty()).then_some(text))
}

fn truncate_body(body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_ERROR_BODY)
            .last()
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Gemini API client. Falls back to [`MockResponder`] without a key.
///
/// Not `Debug`, so the key cannot end up in logs.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout_secs: u64,
    mock_mode: bool,
    mock: MockResponder,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, EnrichmentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout_secs,
            mock_mode: false,
            mock: MockResponder::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Force canned responses even when a key is present.
    pub fn with_mock_mode(mut self, enabled: bool) -> Self {
        self.mock_mode = enabled;
        self
    }

    pub fn with_mock_responder(mut self, mock: MockResponder) -> Self {
        self.mock = mock;
        self
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = Some(key.to_string()).filter(|k| !k.is_empty());
    }

    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    async fn send(
        &self,
        api_key: &str,
        url: &str,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, EnrichmentError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    EnrichmentError::Timeout(self.timeout_secs)
                } else {
                    EnrichmentError::Http(e.to_string())
                };
                error!("{}", err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            let err = EnrichmentError::Api {
                status: status.as_u16(),
                body: truncate_body(body),
            };
            error!("{}", err);
            return Err(err);
        }
        Ok(response)
    }

    async fn generate_once(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GeneratedText, EnrichmentError> {
        let response = self
            .send(api_key, &self.endpoint("generateContent"), request)
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::Http(format!("Failed to read Gemini response body: {}", e)))?;

        let (text, finish_reason) = decode_response(&body)?;
        if text.is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }

        Ok(GeneratedText {
            text,
            finish_reason,
            mock: false,
        })
    }

    async fn generate_streamed(
        &self,
        api_key: &str,
        request: &GenerateRequest,
        mut on_token: Option<TokenCallback<'_>>,
    ) -> Result<GeneratedText, EnrichmentError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.send(api_key, &url, request).await?;

        let mut stream = response.bytes_stream();
        // Bytes, not text: a multi-byte character may straddle two chunks
        let mut buffer: Vec<u8> = Vec::new();
        let mut full_text = String::new();
        let mut chunks = 0usize;

        let mut emit = |line: &[u8], full_text: &mut String| -> Result<(), EnrichmentError> {
            let line = std::str::from_utf8(line).map_err(|e| {
                let msg = format!("Invalid UTF-8 in Gemini stream: {}", e);
                error!("{}", msg);
                EnrichmentError::Decode(msg)
            })?;
            if let Some(chunk) = decode_sse_line(line)? {
                chunks += 1;
                if let Some(on_token) = on_token.as_mut() {
                    on_token(&chunk);
                }
                full_text.push_str(&chunk);
            }
            Ok(())
        };

        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| EnrichmentError::Http(format!("Stream interrupted: {}", e)))?;
            buffer.extend_from_slice(&bytes);

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                emit(&line[..line.len() - 1], &mut full_text)?;
            }
        }
        if !buffer.is_empty() {
            emit(&buffer, &mut full_text)?;
        }

        debug!("Gemini stream complete: {} chunks", chunks);
        if full_text.is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }

        Ok(GeneratedText {
            text: full_text,
            finish_reason: None,
            mock: false,
        })
    }
}

impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.mock_mode
    }

    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions<'_>,
    ) -> Result<GeneratedText, EnrichmentError> {
        let GenerateOptions {
            stream,
            context,
            temperature,
            max_tokens,
            on_token,
            on_complete,
            on_error,
        } = options;

        let api_key = match (&self.api_key, self.mock_mode) {
            (Some(key), false) => key.clone(),
            _ => return Ok(self.mock.respond(prompt, on_token, on_complete).await),
        };

        let full_prompt = build_prompt_with_context(prompt, context);
        let request = build_request(&full_prompt, temperature, max_tokens);
        info!(
            "Calling Gemini model {} ({} prompt chars, stream: {})",
            self.model,
            full_prompt.chars().count(),
            stream
        );

        let result = if stream {
            self.generate_streamed(&api_key, &request, on_token).await
        } else {
            self.generate_once(&api_key, &request).await
        };

        match result {
            Ok(generated) => {
                if let Some(on_complete) = on_complete {
                    on_complete(&generated.text);
                }
                Ok(generated)
            }
            Err(e) => {
                if let Some(on_error) = on_error {
                    on_error(&e);
                }
                Err(e)
            }
        }
    }
}
