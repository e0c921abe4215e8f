//! Character consistency resolution.
//!
//! Given a shot description and an optional character, picks which view of
//! the character the camera sees, the matching reference asset, and the
//! prompt fragments that keep the character's identity stable across
//! panels. View precedence is Back > Side > Front: a description carrying
//! both a back cue and a side cue resolves to the back view.

use cineboard_models::{Character, CharacterView, ShotType};
use tracing::debug;

use crate::keywords::{all_matches, matches_any, BACK_VIEW, DRAFT_BAN_LIST, IDENTITY_FEATURES, SIDE_VIEW};

/// The resolver's verdict for one shot/character pairing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCharacter {
    /// Reference image to feed the backend, if the character has one
    /// usable for the detected view.
    pub reference_url: Option<String>,
    /// Positive clause: the character's (view-specific) description plus
    /// an identity anchor over its defining features.
    pub prompt_fragment: String,
    /// Negative clause, non-empty for back views where the model must not
    /// invent a face.
    pub negative_fragment: String,
    pub view: CharacterView,
    /// Framing nudge implied by the view, e.g. back views read better as
    /// full shots.
    pub shot_bias: Option<ShotType>,
}

/// Detects which side of the character the shot shows.
pub fn detect_view(description: &str) -> CharacterView {
    let text = description.to_lowercase();
    if matches_any(&text, BACK_VIEW) {
        CharacterView::Back
    } else if matches_any(&text, SIDE_VIEW) {
        CharacterView::Side
    } else {
        CharacterView::Front
    }
}

/// Strips environment and color terms from a character description so a
/// monochrome draft render is not polluted by them. Removal is word-level
/// and punctuation-preserving; a comma segment emptied entirely is dropped.
pub fn clean_description(description: &str) -> String {
    let segments: Vec<String> = description
        .split(',')
        .map(|segment| {
            segment
                .split_whitespace()
                .filter(|word| {
                    let w: String = word
                        .chars()
                        .filter(|c| c.is_alphanumeric())
                        .collect::<String>()
                        .to_lowercase();
                    !DRAFT_BAN_LIST.contains(&w.as_str())
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|segment| !segment.is_empty())
        .collect();
    // CJK descriptions have no word boundaries; strip banned substrings
    let mut out = segments.join(", ");
    for banned in DRAFT_BAN_LIST {
        if banned.chars().any(|c| !c.is_ascii()) {
            out = out.replace(banned, "");
        }
    }
    out
}

/// Builds an identity anchor clause from the features named in a
/// description, or an empty string when none are found.
fn identity_anchor(description: &str) -> String {
    let features = all_matches(&description.to_lowercase(), IDENTITY_FEATURES);
    if features.is_empty() {
        String::new()
    } else {
        format!("(identity: {}:1.3)", features.join(", "))
    }
}

/// Resolves a shot/character pairing. With no character bound to the
/// shot, every output is empty and the view defaults to front.
pub fn resolve(character: Option<&Character>, shot_description: &str, draft: bool) -> ResolvedCharacter {
    let Some(character) = character else {
        return ResolvedCharacter::default();
    };

    let view = detect_view(shot_description);
    let reference_url = character.asset_for(view).map(str::to_owned);

    let mut description = character.description_for(view).to_string();
    if draft {
        description = clean_description(&description);
    }
    // The anchor scans the canonical description, not the view override:
    // identity traits must survive a framing change that omits them.
    let anchor = identity_anchor(&character.description);

    let mut prompt_fragment = format!("({}:1.2), {}", character.name, description);
    if !anchor.is_empty() {
        prompt_fragment.push_str(", ");
        prompt_fragment.push_str(&anchor);
    }

    let mut negative_fragment = character.negative_prompt.clone().unwrap_or_default();
    let shot_bias = match view {
        CharacterView::Back => {
            // The model must not invent a face we have no reference for
            let suppression = "(face:1.6), (frontal view:1.4), (looking at camera:1.4)";
            if negative_fragment.is_empty() {
                negative_fragment = suppression.to_string();
            } else {
                negative_fragment = format!("{negative_fragment}, {suppression}");
            }
            Some(ShotType::Full)
        }
        _ => None,
    };

    debug!(
        character = character.name.as_str(),
        view = view.as_str(),
        has_reference = reference_url.is_some(),
        "character resolved"
    );

    ResolvedCharacter {
        reference_url,
        prompt_fragment,
        negative_fragment,
        view,
        shot_bias,
    }
}
