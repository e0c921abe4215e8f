//! The character roster: the project's cast, keyed by id.

use std::collections::HashMap;

use cineboard_models::{Character, CharacterId, RenderSettings, ShotDescriptor};

/// Characters available to a generation batch.
#[derive(Debug, Clone, Default)]
pub struct CharacterRoster {
    characters: HashMap<CharacterId, Character>,
}

impl CharacterRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: Character) {
        self.characters.insert(character.id.clone(), character);
    }

    pub fn get(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// The character driving a shot: the most recently cast slot member,
    /// or the batch-wide fixed character when the shot has no cast.
    pub fn effective_for(&self, shot: &ShotDescriptor, settings: &RenderSettings) -> Option<&Character> {
        shot.characters
            .latest()
            .and_then(|id| self.get(id))
            .or_else(|| settings.fixed_character.as_ref().and_then(|id| self.get(id)))
    }
}

impl FromIterator<Character> for CharacterRoster {
    fn from_iter<I: IntoIterator<Item = Character>>(iter: I) -> Self {
        let mut roster = Self::new();
        for character in iter {
            roster.insert(character);
        }
        roster
    }
}
