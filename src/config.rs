use std::env;

use crate::providers::{Adapter, ChatAdapter, GeminiAdapter, gemini};
use crate::resolve::{ModelRef, ModelTable};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const DEFAULT_PROVIDER_ORDER: &str = "openai,groq,gemini";

/// Everything the router needs, assembled once by the process entry point
/// and handed to `Router::from_config`. Read-only afterwards.
pub struct RouterConfig {
    pub adapters: Vec<Adapter>,
    /// Sequence in which providers are attempted for every request.
    pub provider_order: Vec<String>,
    pub models: ModelTable,
}

impl RouterConfig {
    /// Build from environment variables.
    ///
    /// Credentials: `OPENAI_API_KEY`, `GROQ_API_KEY`, `GEMINI_API_KEY`.
    /// Routing: `AI_PROVIDER_ORDER` (comma-separated), `AI_MODEL_PLAN`,
    /// `AI_MODEL_FAST` (task "evaluate"), `AI_MODEL_REPORT`, and
    /// `AI_MODEL_FALLBACK_{OPENAI,GROQ,GEMINI}` — all "provider:model".
    pub fn from_env() -> Self {
        let mut adapters = Vec::new();

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            adapters.push(Adapter::Chat(ChatAdapter::new("openai", OPENAI_BASE_URL, key)));
        } else {
            tracing::warn!("OPENAI_API_KEY not set — openai unavailable");
        }

        if let Ok(key) = env::var("GROQ_API_KEY") {
            adapters.push(Adapter::Chat(ChatAdapter::new("groq", GROQ_BASE_URL, key)));
        } else {
            tracing::warn!("GROQ_API_KEY not set — groq unavailable");
        }

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            adapters.push(Adapter::Gemini(GeminiAdapter::new(gemini::DEFAULT_BASE_URL, key)));
        } else {
            tracing::warn!("GEMINI_API_KEY not set — gemini unavailable");
        }

        let mut models = ModelTable::new();
        insert_task(&mut models, "plan", "AI_MODEL_PLAN", "openai:gpt-4o-mini");
        insert_task(&mut models, "evaluate", "AI_MODEL_FAST", "openai:gpt-4.1-nano");
        insert_task(&mut models, "report", "AI_MODEL_REPORT", "openai:gpt-4o-mini");
        insert_fallback(&mut models, "openai", "AI_MODEL_FALLBACK_OPENAI", "openai:gpt-4o-mini");
        insert_fallback(
            &mut models,
            "groq",
            "AI_MODEL_FALLBACK_GROQ",
            "groq:llama-3.1-8b-instant",
        );
        insert_fallback(
            &mut models,
            "gemini",
            "AI_MODEL_FALLBACK_GEMINI",
            "gemini:gemini-1.5-mini",
        );

        RouterConfig {
            adapters,
            provider_order: provider_order_from_env(),
            models,
        }
    }
}

fn provider_order_from_env() -> Vec<String> {
    let raw = env::var("AI_PROVIDER_ORDER").unwrap_or_else(|_| DEFAULT_PROVIDER_ORDER.to_string());
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn insert_task(models: &mut ModelTable, task: &str, var: &str, default: &str) {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    let accepted = ModelRef::parse(&raw).is_some_and(|r| models.insert_task(task, r));
    if !accepted {
        tracing::warn!("{var}={raw:?} is not \"provider:model\" — ignored");
    }
}

fn insert_fallback(models: &mut ModelTable, provider: &str, var: &str, default: &str) {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    let accepted = ModelRef::parse(&raw).is_some_and(|r| models.insert_fallback(provider, r));
    if !accepted {
        tracing::warn!("{var}={raw:?} does not name a {provider} model — ignored");
    }
}
