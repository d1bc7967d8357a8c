//! In-memory content oracle.
//!
//! Backs scripted scenarios and tests, and is what loaders hand over once the
//! data files are parsed.

use std::collections::BTreeMap;

use super::content::{ContentOracle, ItemDefinition, SpellDefinition, StatusEffectDefinition};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentSnapshot {
    pub spells: BTreeMap<String, SpellDefinition>,
    pub status_effects: BTreeMap<String, StatusEffectDefinition>,
    pub items: BTreeMap<String, ItemDefinition>,
}

impl ContentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spell(mut self, id: impl Into<String>, spell: SpellDefinition) -> Self {
        self.spells.insert(id.into(), spell);
        self
    }

    pub fn with_status_effect(
        mut self,
        id: impl Into<String>,
        effect: StatusEffectDefinition,
    ) -> Self {
        self.status_effects.insert(id.into(), effect);
        self
    }

    pub fn with_item(mut self, id: impl Into<String>, item: ItemDefinition) -> Self {
        self.items.insert(id.into(), item);
        self
    }
}

impl ContentOracle for ContentSnapshot {
    fn spell(&self, id: &str) -> Option<SpellDefinition> {
        self.spells.get(id).cloned()
    }

    fn status_effect(&self, id: &str) -> Option<StatusEffectDefinition> {
        self.status_effects.get(id).cloned()
    }

    fn item(&self, id: &str) -> Option<ItemDefinition> {
        self.items.get(id).cloned()
    }
}
