use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::providers::{credential_usable, retry_after_hint};
use crate::request::{GenerationRequest, GenerationResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Cooldown attached to a quota rejection when the upstream supplies no
/// explicit Retry-After of its own.
const QUOTA_COOLDOWN_SECS: u64 = 25;

/// Adapter for the Gemini generateContent API. The only multimodal backend:
/// media attachments ride along as inlineData parts.
pub struct GeminiAdapter {
    name: String,
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u64>,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiAdapter {
    pub fn new(base_url: impl Into<String>, api_key: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");

        Self {
            name: "gemini".to_string(),
            base_url: base_url.into(),
            api_key,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_configured(&self) -> bool {
        credential_usable(&self.api_key)
    }

    pub async fn generate(
        &self,
        req: &GenerationRequest,
        model: &str,
    ) -> Result<GenerationResult, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured {
                provider: self.name.clone(),
            });
        }

        let mut parts = vec![serde_json::json!({"text": req.prompt})];
        for item in &req.media {
            parts.push(serde_json::json!({
                "inlineData": {
                    "mimeType": item.mime_type,
                    "data": BASE64.encode(&item.data),
                }
            }));
        }

        let mut generation_config = serde_json::json!({
            "temperature": req.temperature,
            "maxOutputTokens": req.max_tokens,
        });
        if let Some(mime) = &req.response_mime_type {
            generation_config["responseMimeType"] = serde_json::json!(mime);
        }

        let body = serde_json::json!({
            "contents": [{"parts": parts}],
            "generationConfig": generation_config,
        });

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = retry_after_hint(response.headers());
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            let text = String::from_utf8_lossy(truncated);
            let message = if text.trim().is_empty() {
                format!("{status}")
            } else {
                text.into_owned()
            };

            // Quota exhaustion is reported by message content as often as by
            // status. Either signal maps to 429 with a stock cooldown so the
            // caller knows when this provider is worth trying again.
            let quota = status.as_u16() == 429 || message.contains("RESOURCE_EXHAUSTED");
            return Err(ProviderError::Upstream {
                provider: self.name.clone(),
                message,
                status: if quota { 429 } else { status.as_u16() },
                retry_after: if quota {
                    retry_after.or(Some(QUOTA_COOLDOWN_SECS))
                } else {
                    retry_after
                },
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: self.name.clone(),
                message: format!("failed to read response body: {e}"),
            })?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(ProviderError::Decode {
                provider: self.name.clone(),
                message: format!(
                    "response too large: {} bytes (max {MAX_RESPONSE_BYTES})",
                    bytes.len()
                ),
            });
        }

        let decoded: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;

        // Gemini may legitimately return no text (e.g. a blocked candidate);
        // an empty string is the upstream's answer, not a decode failure.
        let text: String = decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(GenerationResult {
            output_text: text,
            provider_used: self.name.clone(),
            model_used: model.to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            tokens_used: decoded
                .usage_metadata
                .and_then(|u| u.total_token_count),
        })
    }
}
