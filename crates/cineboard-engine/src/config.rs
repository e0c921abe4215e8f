//! Engine configuration.

/// Configuration for the generation orchestrator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Image model / endpoint identifier stamped into every request
    pub model: String,
}

impl EngineConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Option<Self> {
        std::env::var("VOLC_IMAGE_ENDPOINT_ID").ok().map(Self::new)
    }
}
