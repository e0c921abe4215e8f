//! Cinematic grammar and prompt compilation.
//!
//! Everything in this crate is pure and synchronous:
//! - `rules`: ordered keyword rules that rewrite shot framing and prompts
//! - `resolver`: character view detection and identity consistency
//! - `compiler`: final positive/negative prompt assembly
//! - `keywords`: the bilingual keyword tables the above share

pub mod compiler;
pub mod keywords;
pub mod resolver;
pub mod rules;

pub use compiler::{
    classify_subject, compile, compile_repaint, CompiledPrompt, SceneContext, SubjectClass, DRAFT_NEGATIVE,
    DRAFT_STYLE, NEGATIVE_BASE,
};
pub use resolver::{clean_description, detect_view, resolve, ResolvedCharacter};
pub use rules::{apply_rules, normalize_shot_type, normalize_shots, CinematicRule, CINEMATIC_RULES};
