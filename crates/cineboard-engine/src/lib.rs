//! The storyboard generation engine.
//!
//! Wires the pure prompt pipeline to the generative backends and panel
//! persistence. Construct an [`Orchestrator`] with a script director, an
//! image backend and a blob store, then drive the panel through analyze,
//! generate, regenerate and repaint.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod roster;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use orchestrator::Orchestrator;
pub use roster::CharacterRoster;
