//! Reference image fetching and normalization for generation requests.

pub mod error;
pub mod preprocess;

pub use error::{MediaError, MediaResult};
pub use preprocess::{HeadHint, ReferencePreprocessor};
