//! The cinematic rule engine.
//!
//! An ordered, mutually exclusive table of `(predicate, effect)` pairs is
//! evaluated against each shot description. The first matching rule wins:
//! it overrides the framing and rewrites the visual prompt from its
//! template, embedding both emphasis and suppression clauses. Rules are
//! deterministic and idempotent; a shot that matches nothing passes through
//! unchanged.

use cineboard_models::{ShotDescriptor, ShotType};
use tracing::debug;

use crate::keywords::{matches_any, BACK_VIEW};

/// One grammar rule: a keyword predicate plus its framing/prompt effect.
pub struct CinematicRule {
    pub name: &'static str,
    /// Predicate over the lowercased description
    pub matches: fn(&str) -> bool,
    /// Framing forced when the rule fires
    pub forced_shot: ShotType,
    /// Emphasis + suppression clause prepended to the action text
    pub clause: &'static str,
}

static FULL_FACE: &[&str] = &["full face", "entire face", "whole face", "正脸", "整张脸"];
static EMOTIONAL_EYES: &[&str] = &[
    "eyes well",
    "teary eyes",
    "tears in his eyes",
    "tears in her eyes",
    "eyes tremble",
    "trembling gaze",
    "眼神",
    "眼眶",
    "含泪",
    "泪光",
];
static CLOSED_EYES: &[&str] = &[
    "eyes closed",
    "closed eyes",
    "closes his eyes",
    "closes her eyes",
    "闭上眼",
    "闭眼",
    "闭目",
];
static PANORAMA: &[&str] = &[
    "panorama",
    "panoramic",
    "skyline",
    "horizon",
    "vast",
    "sprawling",
    "全景",
    "天际线",
    "辽阔",
    "远眺",
];
static VEHICLE: &[&str] = &["car", "vehicle", "truck", "bus", "motorcycle", "taxi", "车"];
static VEHICLE_STOP: &[&str] = &[
    "stop", "stops", "stopping", "pulls up", "pulls over", "parks", "brakes", "停下", "刹车", "停在",
];
static HAND_DETAIL: &[&str] = &["hand", "hands", "fingers", "palm", "手", "手指", "指尖"];
static FOOT_DETAIL: &[&str] = &["foot", "feet", "footsteps", "shoes", "boots", "脚", "脚步", "鞋"];

/// Rule table in fixed priority order. Order is load-bearing: a
/// description mentioning both a back cue and a hand cue resolves to the
/// back-view rule.
pub static CINEMATIC_RULES: &[CinematicRule] = &[
    CinematicRule {
        name: "full_face",
        matches: |t| matches_any(t, FULL_FACE),
        forced_shot: ShotType::CloseUp,
        clause: "(full face:1.4), (both eyes visible:1.3), (symmetrical features:1.2), (no single eye:1.5), (no half face:1.4)",
    },
    CinematicRule {
        name: "emotional_eyes",
        matches: |t| matches_any(t, EMOTIONAL_EYES),
        forced_shot: ShotType::ExtremeCloseUp,
        clause: "extreme close-up on both eyes, (emotional gaze:1.4), (glistening eyes:1.3), (no single eye:1.5), (no full body:1.3)",
    },
    CinematicRule {
        name: "back_view",
        matches: |t| matches_any(t, BACK_VIEW),
        forced_shot: ShotType::Full,
        clause: "(view from behind:1.5), (back of head:1.3), (full body from behind:1.2), (no face:1.6), (no facial features:1.4)",
    },
    CinematicRule {
        name: "closed_eyes",
        matches: |t| matches_any(t, CLOSED_EYES),
        forced_shot: ShotType::CloseUp,
        clause: "(eyes closed:1.5), (serene expression:1.2), (no open eyes:1.4)",
    },
    CinematicRule {
        name: "panorama",
        matches: |t| matches_any(t, PANORAMA),
        forced_shot: ShotType::ExtremeWide,
        clause: "(panoramic vista:1.4), (vast scale:1.3), (tiny figures:1.1), (no portrait:1.4), (no close framing:1.3)",
    },
    CinematicRule {
        name: "stopping_vehicle",
        matches: |t| matches_any(t, VEHICLE) && matches_any(t, VEHICLE_STOP),
        forced_shot: ShotType::Wide,
        clause: "(vehicle coming to a stop:1.3), (street level view:1.2), (motion settling:1.1)",
    },
    CinematicRule {
        name: "hand_detail",
        matches: |t| matches_any(t, HAND_DETAIL),
        forced_shot: ShotType::ExtremeCloseUp,
        clause: "(extreme close-up on hands:1.5), (detailed fingers:1.3), (no face:1.5), (no person:1.3)",
    },
    CinematicRule {
        name: "foot_detail",
        matches: |t| matches_any(t, FOOT_DETAIL),
        forced_shot: ShotType::ExtremeCloseUp,
        clause: "(extreme close-up on feet:1.5), (no face:1.5), (no person:1.3)",
    },
];

/// Parses a loose framing token from script decomposition, defaulting to a
/// mid shot when the token is unrecognized.
pub fn normalize_shot_type(raw: &str) -> ShotType {
    raw.parse().unwrap_or(ShotType::Mid)
}

/// Applies the first matching rule to a shot, returning the rule name.
pub fn apply_rules(shot: &mut ShotDescriptor) -> Option<&'static str> {
    let text = shot.description.to_lowercase();
    for rule in CINEMATIC_RULES {
        if (rule.matches)(&text) {
            debug!(shot = %shot.id, rule = rule.name, "cinematic rule fired");
            shot.shot_type = rule.forced_shot;
            shot.prompt = format!("{}, {}", rule.clause, shot.description);
            return Some(rule.name);
        }
    }
    None
}

/// Normalizes a whole decomposition result: pure, order-preserving.
pub fn normalize_shots(mut shots: Vec<ShotDescriptor>) -> Vec<ShotDescriptor> {
    for shot in &mut shots {
        apply_rules(shot);
    }
    shots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(desc: &str) -> ShotDescriptor {
        ShotDescriptor::new("s", desc)
    }

    #[test]
    fn test_back_view_forces_full_shot_and_suppresses_face() {
        let mut s = shot("he turns and walks away, his back vanishing into the rain");
        let fired = apply_rules(&mut s);
        assert_eq!(fired, Some("back_view"));
        assert_eq!(s.shot_type, ShotType::Full);
        assert!(s.prompt.contains("view from behind"));
        assert!(s.prompt.contains("no face"));
    }

    #[test]
    fn test_hand_detail_forces_extreme_close_up() {
        let mut s = shot("close-up on hands typing on keyboard");
        let fired = apply_rules(&mut s);
        assert_eq!(fired, Some("hand_detail"));
        assert_eq!(s.shot_type, ShotType::ExtremeCloseUp);
        assert!(s.prompt.contains("no person"));
    }

    #[test]
    fn test_back_cue_outranks_hand_cue() {
        // Both cues present: fixed priority puts back_view first
        let mut s = shot("her hands clasped behind her back, walking away down the hall");
        assert_eq!(apply_rules(&mut s), Some("back_view"));
        assert_eq!(s.shot_type, ShotType::Full);
    }

    #[test]
    fn test_stopping_vehicle_needs_both_cues() {
        let mut moving = shot("a taxi speeds through the intersection");
        assert_eq!(apply_rules(&mut moving), None);

        let mut stopping = shot("a taxi pulls up at the curb");
        assert_eq!(apply_rules(&mut stopping), Some("stopping_vehicle"));
        assert_eq!(stopping.shot_type, ShotType::Wide);
    }

    #[test]
    fn test_no_match_passes_through() {
        let mut s = shot("two people argue across a kitchen table");
        s.shot_type = ShotType::Mid;
        s.prompt = "original prompt".to_string();
        assert_eq!(apply_rules(&mut s), None);
        assert_eq!(s.shot_type, ShotType::Mid);
        assert_eq!(s.prompt, "original prompt");
    }

    #[test]
    fn test_rules_are_deterministic_and_idempotent() {
        let desc = "she closes her eyes and breathes";
        let mut a = shot(desc);
        let mut b = shot(desc);
        apply_rules(&mut a);
        apply_rules(&mut b);
        assert_eq!(a.prompt, b.prompt);
        assert_eq!(a.shot_type, b.shot_type);

        // Reapplying yields the same shot type; the prompt rewrite keys off
        // the description, which rules never touch
        let prompt_once = a.prompt.clone();
        apply_rules(&mut a);
        assert_eq!(a.prompt, prompt_once);
    }

    #[test]
    fn test_panorama_forces_extreme_wide() {
        let mut s = shot("the city skyline at dawn, vast and silent");
        assert_eq!(apply_rules(&mut s), Some("panorama"));
        assert_eq!(s.shot_type, ShotType::ExtremeWide);
    }

    #[test]
    fn test_normalize_shot_type_fallback() {
        assert_eq!(normalize_shot_type("Wide Shot"), ShotType::Wide);
        assert_eq!(normalize_shot_type("???"), ShotType::Mid);
    }
}
