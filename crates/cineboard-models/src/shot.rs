//! Shot descriptors, framing enums and per-shot lifecycle state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::character::CharacterSlots;

/// Unique shot identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ShotId(pub String);

impl ShotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cinematic framing sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    ExtremeWide,
    Wide,
    Full,
    Mid,
    CloseUp,
    ExtremeCloseUp,
}

impl ShotType {
    pub const ALL: &'static [ShotType] = &[
        ShotType::ExtremeWide,
        ShotType::Wide,
        ShotType::Full,
        ShotType::Mid,
        ShotType::CloseUp,
        ShotType::ExtremeCloseUp,
    ];

    /// Canonical uppercase token as used in prompts ("CLOSE-UP").
    pub fn prompt_token(&self) -> &'static str {
        match self {
            ShotType::ExtremeWide => "EXTREME WIDE SHOT",
            ShotType::Wide => "WIDE SHOT",
            ShotType::Full => "FULL SHOT",
            ShotType::Mid => "MID SHOT",
            ShotType::CloseUp => "CLOSE-UP",
            ShotType::ExtremeCloseUp => "EXTREME CLOSE-UP",
        }
    }

    /// Close framings crop below the chest.
    pub fn is_close(&self) -> bool {
        matches!(self, ShotType::CloseUp | ShotType::ExtremeCloseUp)
    }

    /// Wide framings show the full environment.
    pub fn is_wide(&self) -> bool {
        matches!(self, ShotType::ExtremeWide | ShotType::Wide)
    }
}

impl Default for ShotType {
    fn default() -> Self {
        ShotType::Mid
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prompt_token())
    }
}

impl FromStr for ShotType {
    type Err = ShotTypeParseError;

    /// Parses loose framing tokens: casing, spacing and hyphenation are
    /// normalized, so "Close up", "CLOSE-UP" and "closeup" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match norm.as_str() {
            "extremewideshot" | "extremewide" | "extremelongshot" | "ews" => {
                Ok(ShotType::ExtremeWide)
            }
            "wideshot" | "wide" | "longshot" | "ws" => Ok(ShotType::Wide),
            "fullshot" | "full" | "fullbodyshot" | "fs" => Ok(ShotType::Full),
            "midshot" | "mid" | "mediumshot" | "medium" | "ms" => Ok(ShotType::Mid),
            "closeup" | "closeupshot" | "close" | "cu" => Ok(ShotType::CloseUp),
            "extremecloseup" | "extremecloseupshot" | "ecu" => Ok(ShotType::ExtremeCloseUp),
            _ => Err(ShotTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown shot type: {0}")]
pub struct ShotTypeParseError(String);

/// Camera angle relative to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    EyeLevel,
    LowAngle,
    HighAngle,
    Overhead,
    Dutch,
    OverTheShoulder,
}

impl CameraAngle {
    pub const ALL: &'static [CameraAngle] = &[
        CameraAngle::EyeLevel,
        CameraAngle::LowAngle,
        CameraAngle::HighAngle,
        CameraAngle::Overhead,
        CameraAngle::Dutch,
        CameraAngle::OverTheShoulder,
    ];

    pub fn prompt_token(&self) -> &'static str {
        match self {
            CameraAngle::EyeLevel => "EYE LEVEL",
            CameraAngle::LowAngle => "LOW ANGLE",
            CameraAngle::HighAngle => "HIGH ANGLE",
            CameraAngle::Overhead => "OVERHEAD SHOT",
            CameraAngle::Dutch => "DUTCH ANGLE",
            CameraAngle::OverTheShoulder => "OVER-THE-SHOULDER",
        }
    }
}

impl Default for CameraAngle {
    fn default() -> Self {
        CameraAngle::EyeLevel
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prompt_token())
    }
}

impl FromStr for CameraAngle {
    type Err = CameraAngleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match norm.as_str() {
            "eyelevel" | "eye" => Ok(CameraAngle::EyeLevel),
            "lowangle" | "low" => Ok(CameraAngle::LowAngle),
            "highangle" | "high" => Ok(CameraAngle::HighAngle),
            "overheadshot" | "overhead" | "topdown" | "birdseyeview" => Ok(CameraAngle::Overhead),
            "dutchangle" | "dutch" | "dutchtilt" => Ok(CameraAngle::Dutch),
            "overtheshoulder" | "overtheshouldershot" | "ots" => Ok(CameraAngle::OverTheShoulder),
            _ => Err(CameraAngleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown camera angle: {0}")]
pub struct CameraAngleParseError(String);

/// Per-shot generation lifecycle.
///
/// `Succeeded` and `Failed` are both revisitable: a regenerate or repaint
/// moves the shot back to `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShotPhase {
    /// Nothing generated yet
    #[default]
    Idle,
    /// A generation call is in flight
    Queued,
    /// Image attached
    Succeeded,
    /// Last attempt failed; any prior image is kept
    Failed,
}

/// One storyboard frame: description, camera parameters and generated image.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShotDescriptor {
    pub id: ShotId,
    /// Free-text action description
    pub description: String,
    pub shot_type: ShotType,
    #[serde(default)]
    pub camera_angle: CameraAngle,
    /// Per-shot environment override; global scene text applies when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Resolved visual prompt; may be user-edited
    #[serde(default)]
    pub prompt: String,
    /// Set when the user hand-edited the prompt; a sufficiently detailed
    /// edited prompt replaces the compiled template
    #[serde(default)]
    pub prompt_edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub phase: ShotPhase,
    /// Failure message from the last attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub characters: CharacterSlots,
    #[serde(default)]
    pub sort_order: u32,
}

impl ShotDescriptor {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: ShotId::new(id),
            description: description.into(),
            shot_type: ShotType::default(),
            camera_angle: CameraAngle::default(),
            environment: None,
            prompt: String::new(),
            prompt_edited: false,
            image_url: None,
            phase: ShotPhase::Idle,
            error: None,
            characters: CharacterSlots::default(),
            sort_order: 0,
        }
    }

    /// Records a hand-edited prompt.
    pub fn edit_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.prompt_edited = true;
    }

    /// True while a generation call is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == ShotPhase::Queued
    }

    /// Marks the shot queued. Any prior image stays attached until the
    /// attempt resolves.
    pub fn begin_generation(&mut self) {
        self.phase = ShotPhase::Queued;
        self.error = None;
    }

    /// Attaches a generated image and leaves the queued state.
    pub fn complete(&mut self, url: impl Into<String>) {
        self.image_url = Some(url.into());
        self.error = None;
        self.phase = ShotPhase::Succeeded;
    }

    /// Records a failure message. A previously generated image is kept.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.phase = ShotPhase::Failed;
    }

    /// Exactly one of these holds at any time: image set and not loading,
    /// loading, or no image and not loading.
    pub fn state_is_consistent(&self) -> bool {
        match self.phase {
            ShotPhase::Queued => true,
            ShotPhase::Succeeded => self.image_url.is_some(),
            ShotPhase::Idle | ShotPhase::Failed => true,
        }
    }
}
