use thiserror::Error;

/// Statuses worth handing to another provider. Everything else from an
/// upstream is a permanent rejection of the request itself.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no AI provider configured")]
    NoProviderConfigured,

    #[error("{provider} provider is not configured")]
    NotConfigured { provider: String },

    #[error("{provider} provider does not accept media inputs")]
    MediaUnsupported { provider: String },

    #[error("upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        message: String,
        status: u16,
        retry_after: Option<u64>,
    },

    #[error("request to {provider} failed: {message}")]
    Transport { provider: String, message: String },

    #[error("failed to decode {provider} response: {message}")]
    Decode { provider: String, message: String },

    #[error("all AI providers failed (tried: {})", .tried.join(", "))]
    Exhausted {
        /// Every "provider:model" pair attempted, in trial order.
        tried: Vec<String>,
        retry_after: Option<u64>,
    },
}

impl ProviderError {
    /// HTTP-style status for this failure. 503 when no upstream status is known.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MediaUnsupported { .. } => 415,
            Self::Upstream { status, .. } => *status,
            Self::NoProviderConfigured
            | Self::NotConfigured { .. }
            | Self::Transport { .. }
            | Self::Decode { .. }
            | Self::Exhausted { .. } => 503,
        }
    }

    /// Server-suggested cooldown in seconds before the same provider should
    /// be tried again. Informational only — nothing in this crate sleeps.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Upstream { retry_after, .. } | Self::Exhausted { retry_after, .. } => {
                *retry_after
            }
            _ => None,
        }
    }

    /// Returns true when attempting the next provider in the trial order is
    /// a reasonable recovery. False aborts the failover loop: the request
    /// itself was rejected, or there is nothing left to try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoProviderConfigured | Self::NotConfigured { .. } | Self::Exhausted { .. } => {
                false
            }
            // Another backend may accept what this one rejected (e.g. media).
            Self::MediaUnsupported { .. } => true,
            // Uncategorized transport and decode failures are assumed transient.
            Self::Transport { .. } | Self::Decode { .. } => true,
            Self::Upstream { status, .. } => RETRYABLE_STATUSES.contains(status),
        }
    }

    /// Extract provider name from variants that carry one.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::NotConfigured { provider }
            | Self::MediaUnsupported { provider }
            | Self::Upstream { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Decode { provider, .. } => Some(provider),
            _ => None,
        }
    }
}
