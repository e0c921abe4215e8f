//! Characters, per-view reference assets and the bounded per-shot cast list.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Unique character identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a character the camera sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterView {
    /// Default frontal view
    #[default]
    Front,
    /// Profile view
    Side,
    /// Seen from behind
    Back,
}

impl CharacterView {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterView::Front => "front",
            CharacterView::Side => "side",
            CharacterView::Back => "back",
        }
    }
}

impl fmt::Display for CharacterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reusable character with per-view reference assets.
///
/// `description` is the canonical (frontal) appearance. A view with an
/// asset in `view_assets` may also carry a matching description override in
/// `description_overrides`; when the asset is selected the override must be
/// used so image and text never describe different sides of the character.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Canonical appearance description
    pub description: String,
    /// Per-view description overrides (e.g. back, side)
    #[serde(default)]
    pub description_overrides: HashMap<CharacterView, String>,
    /// Per-view reference image URLs
    #[serde(default)]
    pub view_assets: HashMap<CharacterView, String>,
    /// Default reference image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Vertical head-center fraction in the reference assets (0.0 = top),
    /// recorded when the asset was analyzed. Absent for unanalyzed assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_center: Option<f32>,
    /// Identity-specific exclusion terms appended to negative prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(id),
            name: name.into(),
            description: description.into(),
            description_overrides: HashMap::new(),
            view_assets: HashMap::new(),
            avatar_url: None,
            head_center: None,
            negative_prompt: None,
        }
    }

    /// Reference image for a view: the per-view asset if present, otherwise
    /// the avatar.
    pub fn asset_for(&self, view: CharacterView) -> Option<&str> {
        self.view_assets
            .get(&view)
            .map(String::as_str)
            .or(self.avatar_url.as_deref())
    }

    /// Description for a view. The override is mandatory whenever the view
    /// has both an asset and an override; otherwise the canonical
    /// description is used.
    pub fn description_for(&self, view: CharacterView) -> &str {
        if view != CharacterView::Front && self.view_assets.contains_key(&view) {
            if let Some(over) = self.description_overrides.get(&view) {
                return over;
            }
        }
        &self.description
    }
}

/// Fixed-capacity cast list for one shot: at most 2 characters, FIFO
/// eviction. Re-inserting a present id moves it to the most-recent slot
/// without duplicating it.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct CharacterSlots {
    ids: VecDeque<CharacterId>,
}

// Deserialization funnels through `insert` so external data cannot smuggle
// in duplicates or more than CAPACITY ids.
impl<'de> Deserialize<'de> for CharacterSlots {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ids = Vec::<CharacterId>::deserialize(deserializer)?;
        let mut slots = CharacterSlots::new();
        for id in ids {
            slots.insert(id);
        }
        Ok(slots)
    }
}

impl CharacterSlots {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character id. A third insertion evicts the oldest entry;
    /// returns the evicted id if any.
    pub fn insert(&mut self, id: CharacterId) -> Option<CharacterId> {
        if let Some(pos) = self.ids.iter().position(|c| *c == id) {
            self.ids.remove(pos);
            self.ids.push_back(id);
            return None;
        }
        self.ids.push_back(id);
        if self.ids.len() > Self::CAPACITY {
            self.ids.pop_front()
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: &CharacterId) -> bool {
        if let Some(pos) = self.ids.iter().position(|c| c == id) {
            self.ids.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &CharacterId) -> bool {
        self.ids.iter().any(|c| c == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Oldest-first iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterId> {
        self.ids.iter()
    }

    /// Most recently inserted character, if any.
    pub fn latest(&self) -> Option<&CharacterId> {
        self.ids.back()
    }
}
