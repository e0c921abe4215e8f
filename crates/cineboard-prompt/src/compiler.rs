//! Prompt compilation: turns a shot, a style and a character resolution
//! into the final positive/negative prompt pair sent to the image backend.
//!
//! Positive layering order is fixed: style, shot-size phrase, camera-angle
//! phrase, subject clause, environment fragment, character fragment, then
//! the shot's action text. Negatives layer base, draft, shot-size, subject
//! and character exclusions in that order. Compilation is pure; the same
//! inputs always yield the same prompt pair.

use cineboard_models::{CameraAngle, Character, ShotDescriptor, ShotType, StylePreset};
use tracing::debug;

use crate::keywords::{matches_any, OBJECT_SCENE, STOP_WORDS};
use crate::resolver::{clean_description, ResolvedCharacter};

/// Base exclusions applied to every render.
pub const NEGATIVE_BASE: &str = "nsfw, low quality, bad anatomy, distortion, watermark, text, logo";

/// Style fragment for monochrome draft mode.
pub const DRAFT_STYLE: &str = "monochrome storyboard sketch, rough pencil drawing, black and white, minimal lines, high contrast, loose strokes, (no color:2.0), professional storyboard, greyscale, lineart";

/// Color and style kill-list layered under the negatives in draft mode.
pub const DRAFT_NEGATIVE: &str = "(color:2.0), (rgb:2.0), (colorful:2.0), painting, realistic, photorealistic, 3d render, complex details, shading, gradient, text, watermark, (cyberpunk:2.0), (sci-fi:2.0), (city:2.0), (modern buildings:2.0), pink, blue, red, green, yellow, purple, cyan, teal, orange, magenta, brown, golden, silver, blonde";

/// A user-edited prompt this detailed replaces the template entirely.
const USER_OVERRIDE_MIN_WORDS: usize = 12;

/// Whether a shot frames a person or an object/empty scene. Object shots
/// get different framing vocabulary and actively exclude people.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectClass {
    Human,
    ObjectScene,
}

/// Classifies the shot subject from its description.
pub fn classify_subject(description: &str) -> SubjectClass {
    if matches_any(&description.to_lowercase(), OBJECT_SCENE) {
        SubjectClass::ObjectScene
    } else {
        SubjectClass::Human
    }
}

/// The compiled prompt pair, plus the classification that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPrompt {
    pub positive: String,
    pub negative: String,
    pub subject: SubjectClass,
}

fn shot_phrase(shot: ShotType, subject: SubjectClass) -> &'static str {
    match (subject, shot) {
        (SubjectClass::Human, ShotType::ExtremeWide) => {
            "extreme wide shot, tiny figure in vast surroundings"
        }
        (SubjectClass::Human, ShotType::Wide) => "wide shot, full figure with environment",
        (SubjectClass::Human, ShotType::Full) => "full body shot, head to toe",
        (SubjectClass::Human, ShotType::Mid) => "medium shot, waist up",
        (SubjectClass::Human, ShotType::CloseUp) => "close-up portrait, head and shoulders",
        (SubjectClass::Human, ShotType::ExtremeCloseUp) => {
            "extreme close-up, facial detail filling the frame"
        }
        (SubjectClass::ObjectScene, ShotType::ExtremeWide) => {
            "extreme wide establishing shot of the scene"
        }
        (SubjectClass::ObjectScene, ShotType::Wide) => "wide shot of the scene",
        (SubjectClass::ObjectScene, ShotType::Full) => "full view of the subject",
        (SubjectClass::ObjectScene, ShotType::Mid) => "medium shot of the subject",
        (SubjectClass::ObjectScene, ShotType::CloseUp) => "close-up on the subject",
        (SubjectClass::ObjectScene, ShotType::ExtremeCloseUp) => {
            "macro extreme close-up, subject filling the frame"
        }
    }
}

/// Non-stop-word count used to judge whether an edited prompt is detailed
/// enough to stand on its own.
fn meaningful_word_count(prompt: &str) -> usize {
    prompt
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == ';')
        .filter(|w| !w.is_empty())
        .filter(|w| {
            let lower = w.to_lowercase();
            !STOP_WORDS.contains(&lower.as_str())
        })
        .count()
}

fn push_layer(buf: &mut String, layer: &str) {
    if layer.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push_str(", ");
    }
    buf.push_str(layer);
}

/// Settings that apply to every shot in a batch.
#[derive(Debug, Clone, Default)]
pub struct SceneContext {
    pub scene: String,
    pub atmosphere: String,
    pub draft: bool,
}

/// Compiles the prompt pair for one shot.
pub fn compile(
    shot: &ShotDescriptor,
    style: &StylePreset,
    resolved: &ResolvedCharacter,
    ctx: &SceneContext,
) -> CompiledPrompt {
    let subject = classify_subject(&shot.description);

    // Rules set the framing when they fire; otherwise a back-view
    // character resolution can still nudge the default framing.
    let effective_shot = if shot.shot_type == ShotType::Mid {
        resolved.shot_bias.unwrap_or(shot.shot_type)
    } else {
        shot.shot_type
    };

    let style_fragment = if ctx.draft { DRAFT_STYLE } else { style.positive.as_str() };

    let action = if shot.prompt.is_empty() { shot.description.as_str() } else { shot.prompt.as_str() };

    // A sufficiently detailed hand-edited prompt replaces every template
    // layer except the style. Rule-rewritten prompts are not edits and
    // still get the full template.
    let user_override = shot.prompt_edited
        && !shot.prompt.is_empty()
        && meaningful_word_count(&shot.prompt) >= USER_OVERRIDE_MIN_WORDS;

    let mut positive = String::new();
    push_layer(&mut positive, style_fragment);
    if user_override {
        push_layer(&mut positive, &shot.prompt);
    } else {
        push_layer(&mut positive, shot_phrase(effective_shot, subject));
        if shot.camera_angle != CameraAngle::EyeLevel {
            push_layer(&mut positive, shot.camera_angle.prompt_token());
        }
        if subject == SubjectClass::ObjectScene {
            push_layer(&mut positive, "(no people:1.4), (empty of humans:1.2)");
        }
        let env = shot.environment.as_deref().unwrap_or(&ctx.scene);
        let environment = match (env.is_empty(), ctx.atmosphere.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("(Environment: {env})"),
            (true, false) => format!("(Environment: {})", ctx.atmosphere),
            (false, false) => format!("(Environment: {env}, {})", ctx.atmosphere),
        };
        push_layer(&mut positive, &environment);
        if subject == SubjectClass::Human {
            push_layer(&mut positive, &resolved.prompt_fragment);
        }
        push_layer(&mut positive, action);
    }

    let mut negative = String::new();
    push_layer(&mut negative, NEGATIVE_BASE);
    if ctx.draft {
        push_layer(&mut negative, DRAFT_NEGATIVE);
    } else {
        push_layer(&mut negative, &style.negative);
    }
    match effective_shot {
        s if s.is_wide() => push_layer(&mut negative, "portrait, face close-up, cropped body"),
        s if s.is_close() => push_layer(&mut negative, "full body, distant figure, lower body"),
        _ => {}
    }
    if subject == SubjectClass::ObjectScene {
        push_layer(&mut negative, "(person:1.8), (face:1.8), (human body:1.6)");
    }
    push_layer(&mut negative, &resolved.negative_fragment);

    debug!(
        shot = %shot.id,
        subject = ?subject,
        user_override,
        positive_len = positive.len(),
        "prompt compiled"
    );

    CompiledPrompt { positive, negative, subject }
}

/// Compiles the prompt pair for a repaint pass over an existing image.
///
/// Repaints keep the composition of the source image, so the template is
/// much thinner than a fresh generation: character identity, the user's
/// instruction, and composition anchors. Draft repaints swap in the
/// sketch tables and a cleaned character description.
pub fn compile_repaint(character: Option<&Character>, prompt: &str, draft: bool) -> CompiledPrompt {
    let subject = classify_subject(prompt);
    if draft {
        let mut positive = format!("({DRAFT_STYLE})");
        if let Some(character) = character {
            let cleaned = clean_description(&character.description);
            positive.push_str(&format!(", (Character visual features: {cleaned} in sketch style)"));
        }
        push_layer(&mut positive, prompt);
        positive.push_str(
            ", (keep original background:2.0), (ignore character environment), lineart, rough sketch, (white background:1.2)",
        );
        CompiledPrompt {
            positive,
            negative: DRAFT_NEGATIVE.to_string(),
            subject,
        }
    } else {
        let mut positive = String::new();
        if let Some(character) = character {
            push_layer(&mut positive, &format!("(Character: {})", character.description));
        }
        push_layer(&mut positive, prompt);
        positive.push_str(", (same composition:1.5), (maintain pose:1.4), high quality");
        CompiledPrompt {
            positive,
            negative: NEGATIVE_BASE.to_string(),
            subject,
        }
    }
}
