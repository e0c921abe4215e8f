//! Clients for the generative backends: image generation and script
//! decomposition, plus the retry policy they share.

pub mod director;
pub mod error;
pub mod image;
pub mod retry;

pub use director::{DirectorClient, DirectorConfig, ScriptDirector, ScriptPanel};
pub use error::{GenAiError, GenAiResult};
pub use image::{ImageBackend, ImageGenClient, ImageGenConfig};
pub use retry::{retry_async, RetryConfig};
