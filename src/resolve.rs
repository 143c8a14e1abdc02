//! Task-to-model resolution. Pure lookup over static tables built at
//! startup — no I/O, no state.

use std::collections::HashMap;

/// A parsed model reference. Callers and configuration pass single strings
/// ("provider:model" or a bare model name); they are split exactly once on
/// entry and carried as this pair afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    /// Lowercased provider qualifier. None for a bare model name, which is
    /// usable with any provider.
    pub provider: Option<String>,
    pub model: String,
}

impl ModelRef {
    /// Parse "provider:model" or a bare model name. Returns None for empty
    /// input or an empty piece on either side of the colon.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(':') {
            Some((provider, model)) => {
                let provider = provider.trim().to_lowercase();
                let model = model.trim();
                if provider.is_empty() || model.is_empty() {
                    return None;
                }
                Some(Self {
                    provider: Some(provider),
                    model: model.to_string(),
                })
            }
            None => Some(Self {
                provider: None,
                model: raw.to_string(),
            }),
        }
    }

    /// The model name to use when trying `provider`, or None when this
    /// reference is pinned to a different provider.
    pub fn for_provider(&self, provider: &str) -> Option<&str> {
        match self.provider.as_deref() {
            Some(p) if p == provider => Some(&self.model),
            Some(_) => None,
            None => Some(&self.model),
        }
    }
}

/// Static model routing tables: per-task defaults and per-provider
/// fallbacks. Both hold provider-qualified references only — an entry
/// without a provider prefix could never match any provider, so `insert_*`
/// reject them at load time.
#[derive(Debug, Default, Clone)]
pub struct ModelTable {
    tasks: HashMap<String, ModelRef>,
    fallbacks: HashMap<String, ModelRef>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default "provider:model" for a task. Returns false
    /// (and stores nothing) when the reference has no provider qualifier.
    pub fn insert_task(&mut self, task: impl Into<String>, model_ref: ModelRef) -> bool {
        if model_ref.provider.is_none() {
            return false;
        }
        self.tasks.insert(task.into(), model_ref);
        true
    }

    /// Register a provider's fallback model, used when no task mapping
    /// applies. The reference's qualifier must name that same provider.
    pub fn insert_fallback(&mut self, provider: impl Into<String>, model_ref: ModelRef) -> bool {
        let provider = provider.into();
        if model_ref.provider.as_deref() != Some(provider.as_str()) {
            return false;
        }
        self.fallbacks.insert(provider, model_ref);
        true
    }

    /// Resolve the model to use for `task` on `provider`.
    ///
    /// Precedence: explicit override (restricted by its qualifier) → task
    /// mapping (qualifier must match) → per-provider fallback → None.
    /// A None result means the router skips this provider for this task
    /// without counting it as a failed attempt.
    pub fn resolve(
        &self,
        task: &str,
        provider: &str,
        model_override: Option<&ModelRef>,
    ) -> Option<String> {
        if let Some(r) = model_override
            && let Some(model) = r.for_provider(provider)
        {
            return Some(model.to_string());
        }

        if let Some(r) = self.tasks.get(task)
            && let Some(model) = r.for_provider(provider)
        {
            return Some(model.to_string());
        }

        self.fallbacks
            .get(provider)
            .and_then(|r| r.for_provider(provider))
            .map(str::to_string)
    }
}
