//! Data-driven combat content.
//!
//! This crate is the match's DataManager. It reads RON catalogs of spells,
//! status effects, items, passives and character templates (plus a TOML
//! game configuration) and serves them to the engine through
//! [`game_core::ContentOracle`]. Versioned ids such as `fireball@v2` resolve
//! to the base record with the version's fields laid over it.
//!
//! Content is read-only once loaded and never appears in game state.

pub mod characters;
pub mod manager;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use characters::{
    CharacterTemplate, EnergyTemplate, PassiveDefinition, RosterEntry, WeaponTemplate,
};
pub use manager::{DataManager, SpawnPlan};

#[cfg(feature = "loaders")]
pub use loaders::{Catalog, ConfigLoader, ContentFactory, LoadResult, split_version};
