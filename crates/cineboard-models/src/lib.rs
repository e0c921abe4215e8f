//! Shared data models for the CineBoard storyboard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Shot descriptors and their lifecycle state
//! - Characters and per-view reference assets
//! - Style presets and atmosphere tags
//! - Aspect ratios and output sizes
//! - Generation requests and per-shot outcomes
//! - Panel (storyboard) state

pub mod character;
pub mod panel;
pub mod ratio;
pub mod request;
pub mod shot;
pub mod style;

// Re-export common types
pub use character::{Character, CharacterId, CharacterSlots, CharacterView};
pub use panel::{BatchPhase, PanelState};
pub use ratio::{AspectRatio, AspectRatioParseError, OutputSize};
pub use request::{GenerationRequest, RenderSettings, ShotOutcome};
pub use shot::{CameraAngle, ShotDescriptor, ShotId, ShotPhase, ShotType};
pub use style::{StylePreset, ATMOSPHERE_TAGS, STYLE_PRESETS};
