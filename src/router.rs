//! Provider failover loop. One pass over the configured trial order,
//! first success wins, retryable failures advance, hard failures abort.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::RouterConfig;
use crate::error::ProviderError;
use crate::extract;
use crate::providers::Adapter;
use crate::request::{GenerationRequest, GenerationResult};
use crate::resolve::{ModelRef, ModelTable};

pub struct Router {
    adapters: HashMap<String, Adapter>,
    order: Vec<String>,
    models: ModelTable,
}

impl Router {
    /// Build the provider registry from a config assembled at startup.
    /// Registry and trial order are immutable from here on.
    pub fn from_config(config: RouterConfig) -> Self {
        let adapters: HashMap<String, Adapter> = config
            .adapters
            .into_iter()
            .map(|a| (a.name().to_string(), a))
            .collect();

        let configured: Vec<&str> = adapters
            .values()
            .filter(|a| a.is_configured())
            .map(Adapter::name)
            .collect();
        tracing::info!(
            providers = ?configured,
            order = ?config.provider_order,
            "AI router initialized"
        );
        if configured.is_empty() {
            tracing::warn!("no AI provider configured — check credentials");
        }

        Self {
            adapters,
            order: config.provider_order,
            models: config.models,
        }
    }

    /// Provider names currently holding usable credentials, in trial order.
    pub fn configured_providers(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|name| self.adapters.get(name))
            .filter(|a| a.is_configured())
            .map(Adapter::name)
            .collect()
    }

    /// Try each provider in the configured order until one succeeds.
    ///
    /// Providers that are unregistered, unconfigured, or have no model for
    /// this task are skipped without counting as attempts. A retryable
    /// failure records "provider:model" and moves on; a non-retryable one
    /// is returned unchanged — a later provider cannot fix a request that
    /// was itself rejected. Exhaustion yields a terminal 503 listing every
    /// attempt and carrying the last retry-after hint seen.
    pub async fn generate(
        &self,
        req: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        if !self.adapters.values().any(Adapter::is_configured) {
            return Err(ProviderError::NoProviderConfigured);
        }

        let request_id = Uuid::new_v4();
        let model_override = req.model_override.as_deref().and_then(ModelRef::parse);
        let mut tried: Vec<String> = Vec::new();
        let mut last_retry_after: Option<u64> = None;

        for name in &self.order {
            let Some(adapter) = self.adapters.get(name) else {
                continue;
            };
            if !adapter.is_configured() {
                continue;
            }
            let Some(model) = self.models.resolve(&req.task, name, model_override.as_ref())
            else {
                tracing::debug!(%request_id, provider = %name, task = %req.task, "no model mapping — skipping");
                continue;
            };

            tracing::debug!(%request_id, provider = %name, model = %model, "trying provider");
            match adapter.generate(req, &model).await {
                Ok(result) => {
                    tracing::info!(
                        %request_id,
                        provider = %name,
                        model = %model,
                        latency_ms = result.latency_ms,
                        "generation succeeded"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    tried.push(format!("{name}:{model}"));
                    if let Some(secs) = e.retry_after() {
                        last_retry_after = Some(secs);
                    }
                    if !e.is_retryable() {
                        tracing::warn!(%request_id, provider = %name, status = e.status_code(), "non-retryable failure: {e}");
                        return Err(e);
                    }
                    tracing::warn!(%request_id, provider = %name, status = e.status_code(), "provider failed, trying next: {e}");
                }
            }
        }

        Err(ProviderError::Exhausted {
            tried,
            retry_after: last_retry_after,
        })
    }

    /// Run a generation whose output must parse as JSON, retrying exactly
    /// once with `strict_prompt` when the first round comes back malformed.
    /// The JSON response hint is forced on both rounds; backends without a
    /// JSON mode return free text and extraction does what it can.
    pub async fn generate_json(
        &self,
        req: &GenerationRequest,
        strict_prompt: &str,
    ) -> Result<(GenerationResult, serde_json::Value), ProviderError> {
        let mut attempt = req.clone();
        attempt.response_mime_type = Some("application/json".to_string());

        let result = self.generate(&attempt).await?;
        match extract::extract_json(&result.output_text) {
            Ok(value) => Ok((result, value)),
            Err(e) => {
                tracing::warn!(
                    provider = %result.provider_used,
                    "malformed JSON output ({e}), retrying with strict prompt"
                );
                attempt.prompt = strict_prompt.to_string();
                let retry = self.generate(&attempt).await?;
                match extract::extract_json(&retry.output_text) {
                    Ok(value) => Ok((retry, value)),
                    Err(e) => Err(ProviderError::Decode {
                        provider: retry.provider_used,
                        message: format!("output is not valid JSON after strict retry: {e}"),
                    }),
                }
            }
        }
    }
}
