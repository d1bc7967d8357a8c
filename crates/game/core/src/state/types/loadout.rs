//! What an entity can do and carries: spells, weapon, consumables, and the
//! small marker components used for bookkeeping.

use std::collections::BTreeMap;

/// Spells the entity knows, in preference order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellList {
    pub spells: Vec<String>,
}

impl SpellList {
    pub fn new<I, S>(spells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            spells: spells.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    pub durability: u32,
    pub max_durability: u32,
}

impl Weapon {
    pub fn new(name: impl Into<String>, durability: u32) -> Self {
        Self {
            name: name.into(),
            durability,
            max_durability: durability,
        }
    }
}

/// Equipped gear. Only the main hand matters to combat resolution.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub main_hand: Option<Weapon>,
}

/// Outcome of wearing down the main-hand weapon.
#[derive(Clone, Debug, PartialEq)]
pub enum Wear {
    Unarmed,
    Worn { name: String, remaining: u32 },
    Broken { name: String },
}

impl Equipment {
    pub fn with_main_hand(weapon: Weapon) -> Self {
        Self {
            main_hand: Some(weapon),
        }
    }

    /// Reduces main-hand durability, unequipping the weapon at zero.
    pub fn wear_main_hand(&mut self, amount: u32) -> Wear {
        let Some(weapon) = self.main_hand.as_mut() else {
            return Wear::Unarmed;
        };
        weapon.durability = weapon.durability.saturating_sub(amount);
        if weapon.durability > 0 {
            return Wear::Worn {
                name: weapon.name.clone(),
                remaining: weapon.durability,
            };
        }
        match self.main_hand.take() {
            Some(weapon) => Wear::Broken { name: weapon.name },
            None => Wear::Unarmed,
        }
    }
}

/// Consumable item charges keyed by item id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    pub items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn with_item(mut self, item_id: impl Into<String>, count: u32) -> Self {
        *self.items.entry(item_id.into()).or_default() += count;
        self
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    /// Takes one charge; false when none are left.
    pub fn consume(&mut self, item_id: &str) -> bool {
        match self.items.get_mut(item_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Who answers this entity's action requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Controller {
    #[default]
    Ai,
    Player,
}

/// Battlefield slot. Breaks speed ties in turn order (lower slot first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position(pub u32);

/// Marker: the entity is out of the fight.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dead;

/// Marker: the entity's health-threshold passive already fired.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThresholdPassiveSpent;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_breaks_and_unequips_at_zero() {
        let mut gear = Equipment::with_main_hand(Weapon::new("Rusty Sword", 3));
        assert_eq!(
            gear.wear_main_hand(2),
            Wear::Worn {
                name: "Rusty Sword".into(),
                remaining: 1
            }
        );
        assert_eq!(
            gear.wear_main_hand(5),
            Wear::Broken {
                name: "Rusty Sword".into()
            }
        );
        assert!(gear.main_hand.is_none());
        assert_eq!(gear.wear_main_hand(1), Wear::Unarmed);
    }

    #[test]
    fn inventory_consumes_until_empty() {
        let mut bag = Inventory::default().with_item("potion", 1);
        assert!(bag.consume("potion"));
        assert!(!bag.consume("potion"));
        assert!(!bag.consume("elixir"));
        assert_eq!(bag.count("potion"), 0);
    }
}
