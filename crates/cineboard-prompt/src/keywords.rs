//! Bilingual keyword tables for view detection, subject classification and
//! identity anchoring.
//!
//! All matching is lowercase substring matching, which is what the cues in
//! real scripts look like ("his back vanishing into the rain"). Tables are
//! ordered; callers that need precedence take the first match.

/// Cues that the camera sees the subject from behind.
pub static BACK_VIEW: &[&str] = &[
    "back view",
    "from behind",
    "seen from behind",
    "walks away",
    "walking away",
    "turns away",
    "turns around",
    "his back",
    "her back",
    "their back",
    "背影",
    "背对",
    "转身离",
    "背过身",
];

/// Cues for a profile view.
pub static SIDE_VIEW: &[&str] = &[
    "profile",
    "side view",
    "from the side",
    "侧面",
    "侧脸",
    "侧身",
];

/// Terms that classify a shot as object/empty-scene rather than
/// human-subject: body-part details, vehicles, ground and ambient objects.
pub static OBJECT_SCENE: &[&str] = &[
    "hand",
    "hands",
    "fingers",
    "palm",
    "fist",
    "foot",
    "feet",
    "footsteps",
    "shoes",
    "boots",
    "keyboard",
    "phone screen",
    "cup",
    "letter",
    "knife",
    "vehicle",
    "car",
    "truck",
    "wheel",
    "ground",
    "floor",
    "pavement",
    "empty room",
    "empty street",
    "no one",
    "still life",
    "手",
    "手指",
    "拳头",
    "脚",
    "脚步",
    "鞋",
    "键盘",
    "车",
    "车轮",
    "地面",
    "空无一人",
    "静物",
];

/// Identity-defining hairstyle and feature terms scanned out of a
/// character's canonical description.
pub static IDENTITY_FEATURES: &[&str] = &[
    "ponytail",
    "braid",
    "braided",
    "bangs",
    "bun",
    "curly hair",
    "wavy hair",
    "straight hair",
    "short hair",
    "long hair",
    "bald",
    "dreadlocks",
    "afro",
    "glasses",
    "beard",
    "mustache",
    "freckles",
    "scar",
    "earring",
    "tattoo",
    "马尾",
    "辫子",
    "刘海",
    "卷发",
    "短发",
    "长发",
    "光头",
    "眼镜",
    "胡子",
    "雀斑",
    "疤痕",
    "耳环",
    "纹身",
];

/// Environment and color words stripped from character descriptions in
/// draft mode so they cannot pollute the monochrome output.
pub static DRAFT_BAN_LIST: &[&str] = &[
    // environment / style pollution
    "cyberpunk",
    "city",
    "neon",
    "future",
    "sci-fi",
    "urban",
    "street",
    "night",
    "lights",
    "building",
    "skyscraper",
    "modern",
    // color pollution
    "blue",
    "pink",
    "red",
    "green",
    "yellow",
    "purple",
    "orange",
    "colorful",
    "cyan",
    "teal",
    "magenta",
    "brown",
    "gold",
    "silver",
    "blonde",
    "dark",
    "light",
    "赛博朋克",
    "城市",
    "霓虹",
    "未来",
    "科幻",
    "街道",
    "夜晚",
    "灯光",
    "高楼",
    "蓝色",
    "粉色",
    "红色",
    "绿色",
    "黄色",
    "紫色",
    "橙色",
    "彩色",
    "青色",
    "棕色",
    "金色",
    "银色",
    "金发",
];

/// Filler words ignored when judging whether a user-edited prompt is
/// detailed enough to override the template.
pub static STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "has", "have", "had", "with", "in", "on", "at",
    "to", "for", "of", "by", "and", "or", "but", "so", "very", "really", "just", "wearing",
    "holding", "looks", "like", "feature", "features", "一个", "是", "在", "有", "和", "与", "的",
    "了", "着", "很", "非常", "穿着", "拿着", "长得", "像",
];

/// Returns the first keyword from `table` contained in `text`.
/// `text` must already be lowercased.
pub fn first_match<'a>(text: &str, table: &[&'a str]) -> Option<&'a str> {
    table.iter().copied().find(|kw| text.contains(kw))
}

/// True when any keyword from `table` is contained in `text`.
pub fn matches_any(text: &str, table: &[&str]) -> bool {
    first_match(text, table).is_some()
}

/// Collects every keyword from `table` contained in `text`, in table order.
pub fn all_matches<'a>(text: &str, table: &[&'a str]) -> Vec<&'a str> {
    table.iter().copied().filter(|kw| text.contains(kw)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_respects_table_order() {
        let text = "she turns away, her back to the camera";
        assert_eq!(first_match(text, BACK_VIEW), Some("turns away"));
    }

    #[test]
    fn test_bilingual_matching() {
        assert!(matches_any("镜头只拍她的背影", BACK_VIEW));
        assert!(matches_any("特写：手指敲击键盘", OBJECT_SCENE));
    }

    #[test]
    fn test_all_matches_collects_in_order() {
        let found = all_matches("long hair in a ponytail, round glasses", IDENTITY_FEATURES);
        assert_eq!(found, vec!["ponytail", "long hair", "glasses"]);
    }
}
