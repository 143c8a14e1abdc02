//! Environment-driven configuration defaults. Tolerant of variables the
//! host environment may already have set, as model routing is deployment
//! policy.

use gale::config::RouterConfig;

#[test]
fn default_trial_order_is_openai_groq_gemini() {
    if std::env::var("AI_PROVIDER_ORDER").is_ok() {
        return;
    }
    let config = RouterConfig::from_env();
    assert_eq!(config.provider_order, vec!["openai", "groq", "gemini"]);
}

#[test]
fn default_task_models_resolve_against_their_providers() {
    for var in ["AI_MODEL_PLAN", "AI_MODEL_FAST", "AI_MODEL_FALLBACK_GROQ"] {
        if std::env::var(var).is_ok() {
            return;
        }
    }
    let config = RouterConfig::from_env();
    assert_eq!(
        config.models.resolve("plan", "openai", None).as_deref(),
        Some("gpt-4o-mini")
    );
    assert_eq!(
        config.models.resolve("evaluate", "openai", None).as_deref(),
        Some("gpt-4.1-nano")
    );
    // a task mapped to openai falls back to groq's own default on groq
    assert_eq!(
        config.models.resolve("plan", "groq", None).as_deref(),
        Some("llama-3.1-8b-instant")
    );
}
