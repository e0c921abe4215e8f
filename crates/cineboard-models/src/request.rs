//! Generation requests, per-shot outcomes and render settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::character::CharacterId;
use crate::ratio::{AspectRatio, OutputSize};

/// A fully-specified image generation request.
///
/// Serializes to the backend's `images/generations` payload shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRequest {
    /// Backend model / endpoint id
    pub model: String,
    pub prompt: String,
    pub negative_prompt: String,
    /// "WxH" pixel size
    pub size: String,
    /// Base64 data URI of the reference image, if one resolved
    #[serde(rename = "image_url", skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
    /// How far the model may deviate from the reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
    /// How strongly the reference constrains identity
    #[serde(rename = "ref_strength", skip_serializing_if = "Option::is_none")]
    pub reference_strength: Option<f32>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, negative: impl Into<String>, size: OutputSize) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            negative_prompt: negative.into(),
            size: size.to_string(),
            reference_image: None,
            strength: None,
            reference_strength: None,
        }
    }

    /// Attaches a reference image with influence knobs.
    pub fn with_reference(mut self, data_uri: String, strength: f32, reference_strength: f32) -> Self {
        self.reference_image = Some(data_uri);
        self.strength = Some(strength);
        self.reference_strength = Some(reference_strength);
        self
    }
}

/// Result of one shot's generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShotOutcome {
    Success { url: String },
    Failure { message: String },
}

impl ShotOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ShotOutcome::Success { .. })
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ShotOutcome::Failure {
            message: message.into(),
        }
    }
}

/// Page-level settings applied to a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderSettings {
    /// Style preset id (built-in or store-provided)
    pub style_id: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Draft = lower-fidelity line-art mode
    #[serde(default)]
    pub draft: bool,
    /// Global scene/environment text; per-shot environment overrides it
    #[serde(default)]
    pub scene: String,
    /// Atmosphere fragment (joined tag values)
    #[serde(default)]
    pub atmosphere: String,
    /// Character applied to shots with an empty cast list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_character: Option<CharacterId>,
    /// Namespace for storage keys
    pub project_id: String,
}

impl RenderSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            style_id: "realistic".to_string(),
            aspect_ratio: AspectRatio::default(),
            draft: false,
            scene: String::new(),
            atmosphere: String::new(),
            fixed_character: None,
            project_id: project_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_backend_field_names() {
        let req = GenerationRequest::new(
            "ep-123",
            "a street at night",
            "low quality",
            AspectRatio::Widescreen.output_size(),
        )
        .with_reference("data:image/jpeg;base64,AAAA".to_string(), 0.55, 0.95);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["size"], "2560x1440");
        assert_eq!(json["image_url"], "data:image/jpeg;base64,AAAA");
        assert!((json["ref_strength"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_request_omits_reference_fields_when_absent() {
        let req = GenerationRequest::new("ep-123", "p", "n", OutputSize::new(2048, 2048));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("image_url").is_none());
        assert!(json.get("strength").is_none());
    }
}
