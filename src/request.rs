//! Normalized request/result types crossing the adapter boundary.
//! Every backend accepts a `GenerationRequest` and returns a
//! `GenerationResult`, whatever its native wire shape.

/// One media attachment (audio, image). Text-only backends reject requests
/// carrying these with 415 so the router can fail over to a multimodal one.
#[derive(Clone)]
pub struct MediaPart {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for MediaPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPart")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Caller-owned input, immutable for the duration of one `generate` call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Abstract intent tag ("plan", "evaluate", "report") used to pick a
    /// default model per provider.
    pub task: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Response MIME hint. "application/json" asks backends with a JSON
    /// mode for strict JSON; backends without one return free text and the
    /// caller extracts.
    pub response_mime_type: Option<String>,
    /// Ordered media attachments.
    pub media: Vec<MediaPart>,
    /// "provider:model" pins the override to one provider; a bare model
    /// name applies to whichever provider is being tried.
    pub model_override: Option<String>,
}

impl GenerationRequest {
    pub fn new(task: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
            response_mime_type: None,
            media: Vec::new(),
            model_override: None,
        }
    }
}

/// What the winning provider produced.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub output_text: String,
    pub provider_used: String,
    pub model_used: String,
    /// Wall-clock time from just before the network call to just after
    /// successful decode.
    pub latency_ms: u64,
    /// Upstream-reported token usage. None when the backend omits it —
    /// never fabricated as zero.
    pub tokens_used: Option<u64>,
}
