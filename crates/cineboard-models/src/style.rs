//! Style presets and atmosphere tags.
//!
//! The built-in tables are immutable configuration data; a structured data
//! store may supply additional presets through the same shape.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An art-direction preset: one positive fragment and one negative fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StylePreset {
    pub id: String,
    /// Display label
    pub label: String,
    /// Positive prompt fragment
    pub positive: String,
    /// Negative prompt fragment
    pub negative: String,
}

/// Built-in presets: `(id, label, positive, negative)`.
pub static STYLE_PRESETS: &[(&str, &str, &str, &str)] = &[
    (
        "realistic",
        "Cinematic",
        "cinematic film still, shot on 35mm, realistic, 8k, highly detailed, dramatic lighting, movie scene, masterpiece",
        "anime, cartoon, sketch, illustration, drawing, 3d render, painting, low quality, distortion, blurry, text, watermark",
    ),
    (
        "anime_jp",
        "Ghibli",
        "anime style, makoto shinkai style, vibrant colors, beautiful composition, 2d animation, studio ghibli, highly detailed",
        "photorealistic, 3d, sketch, rough lines, western comic, ugly face, low quality",
    ),
    (
        "anime_us",
        "Comics",
        "american comic style, graphic novel, bold lines, dynamic coloring, dc comics style, marvel style",
        "anime, manga, photorealistic, 3d, blurry, low quality",
    ),
    (
        "cyberpunk",
        "Neon",
        "cyberpunk style, neon lights, futuristic, high tech, rain, reflections, sci-fi atmosphere",
        "vintage, rustic, nature, sun, daylight, low quality",
    ),
    (
        "noir",
        "B&W",
        "film noir style, black and white, high contrast, dramatic shadows, mystery, 1940s style",
        "color, colorful, bright, anime, cartoon, 3d",
    ),
    (
        "pixar",
        "Cute",
        "pixar style, 3d animation, cute, vibrant, unreal engine 5, cgsociety, highly detailed",
        "2d, sketch, drawing, photorealistic, scary, dark",
    ),
    (
        "watercolor",
        "Soft",
        "watercolor painting style, soft edges, artistic, impressionism, wet on wet, pastel colors",
        "photorealistic, 3d, sharp edges, digital art, harsh lines",
    ),
    (
        "ink",
        "Ink",
        "chinese ink painting, wash painting, black ink, calligraphy style, artistic, traditional",
        "color, photorealistic, 3d, cartoon, anime",
    ),
    (
        "sketch",
        "Storyboard",
        "rough storyboard sketch, architectural line drawing, black and white, ink lines, comic style, high contrast, professional composition",
        "photorealistic, color, 3d, (hand holding pencil:1.5), (holding pen:1.5), (drawing tools:1.5), stationery, paper edges, blurry, messy lines, watermark, text, realistic hand",
    ),
];

/// Atmosphere tags: `(label, prompt fragment)`.
pub static ATMOSPHERE_TAGS: &[(&str, &str)] = &[
    ("Cinematic", "cinematic lighting, dramatic atmosphere"),
    ("Noir", "dark, moody, low key lighting, noir"),
    ("Warm", "warm lighting, sunny, happy atmosphere"),
    ("Cyberpunk", "neon lights, futuristic, cyberpunk atmosphere"),
    ("Horror", "foggy, scary, horror atmosphere, dim light"),
    ("Dreamy", "soft focus, dreamy, ethereal, glow"),
];

impl StylePreset {
    /// Looks up a built-in preset by id.
    pub fn builtin(id: &str) -> Option<StylePreset> {
        STYLE_PRESETS
            .iter()
            .find(|(pid, _, _, _)| *pid == id)
            .map(Self::from_row)
    }

    /// Looks up a built-in preset, falling back to `realistic`.
    pub fn builtin_or_default(id: &str) -> StylePreset {
        Self::builtin(id).unwrap_or_else(|| Self::from_row(&STYLE_PRESETS[0]))
    }

    fn from_row((id, label, positive, negative): &(&str, &str, &str, &str)) -> StylePreset {
        StylePreset {
            id: (*id).to_string(),
            label: (*label).to_string(),
            positive: (*positive).to_string(),
            negative: (*negative).to_string(),
        }
    }

    pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
        STYLE_PRESETS.iter().map(|(id, _, _, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let noir = StylePreset::builtin("noir").unwrap();
        assert!(noir.positive.contains("film noir"));
        assert!(noir.negative.contains("colorful"));
        assert!(StylePreset::builtin("vaporwave").is_none());
    }

    #[test]
    fn test_fallback_to_realistic() {
        let preset = StylePreset::builtin_or_default("unknown_style");
        assert_eq!(preset.id, "realistic");
    }

    #[test]
    fn test_builtin_ids_unique() {
        let ids: Vec<_> = StylePreset::builtin_ids().collect();
        let mut dedup = ids.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(ids.len(), dedup.len());
    }
}
