use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::providers::{credential_usable, retry_after_hint};
use crate::request::{GenerationRequest, GenerationResult};

/// Upper bound on each upstream call. Exceeding it is a retryable
/// transport failure like any other.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Adapter for chat-completions backends speaking the OpenAI wire shape.
/// One instance per provider; `openai` and `groq` differ only in name,
/// endpoint and bearer token.
pub struct ChatAdapter {
    name: String,
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

impl std::fmt::Debug for ChatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAdapter")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ChatAdapter {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, api_key: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");

        Self {
            name: name.into(),
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
        if !req.media.is_empty() {
            return Err(ProviderError::MediaUnsupported {
                provider: self.name.clone(),
            });
        }

        let mut body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": req.prompt}],
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
        });
        if req.response_mime_type.as_deref() == Some("application/json") {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let start = Instant::now();

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
            // Cap error body reads — upstreams can return arbitrary junk
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            let text = String::from_utf8_lossy(truncated);
            let message = if text.trim().is_empty() {
                format!("{status}")
            } else {
                text.into_owned()
            };
            return Err(ProviderError::Upstream {
                provider: self.name.clone(),
                message,
                status: status.as_u16(),
                retry_after,
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

        let completion: ChatCompletion =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode {
                provider: self.name.clone(),
                message: "empty choices or null content".to_string(),
            })?;

        Ok(GenerationResult {
            output_text: text,
            provider_used: self.name.clone(),
            model_used: model.to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            tokens_used: completion.usage.and_then(|u| u.total_tokens),
        })
    }
}
