//! Status effects: definitions, per-entity containers, and the system that
//! applies, stacks, ticks and removes them.
//!
//! An instance moves through applied, zero or more ticks, then removed. Poison
//! (ids starting with [`POISON_PREFIX`]) follows its own independent-instance
//! rules, see [`poison`].
mod container;
mod effect;
mod logic;
mod poison;
mod system;

pub use container::StatusEffects;
pub use effect::{
    DispelFilter, EffectCategory, POISON_PREFIX, StackingPolicy, StatusEffect, create_effect,
};
pub use logic::{EffectLogic, StackOutcome, StatModifier};
pub use system::{StatusEffectSystem, is_action_blocked, query_stat};
