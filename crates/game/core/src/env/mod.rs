//! Read-only collaborators of the engine.
//!
//! The [`Env`] aggregate bundles the configuration table, the component
//! registry, the content oracle and the RNG oracle so handlers can reach
//! everything they need without global state.
mod content;
mod rng;
mod snapshot;

pub use content::{
    ContentOracle, Interaction, InteractionAction, InteractionTrigger, ItemDefinition, SpellCost,
    SpellDefinition, SpellEffect, StatusEffectDefinition, TargetKind,
};
pub use rng::{FixedRoll, PcgRng, RngOracle, RollContext, compute_seed};
pub use snapshot::ContentSnapshot;

use crate::config::GameConfig;
use crate::error::CombatError;
use crate::state::{ComponentRegistry, EntityId, World};

/// Borrowed view of the engine's read-only collaborators.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    config: &'a GameConfig,
    registry: &'a ComponentRegistry,
    content: Option<&'a dyn ContentOracle>,
    rng: &'a dyn RngOracle,
}

impl<'a> Env<'a> {
    pub fn new(
        config: &'a GameConfig,
        registry: &'a ComponentRegistry,
        content: Option<&'a dyn ContentOracle>,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            config,
            registry,
            content,
            rng,
        }
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Returns the content oracle, or an error if none was wired in.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::ContentUnavailable` if no content oracle was provided.
    pub fn content(&self) -> Result<&'a dyn ContentOracle, CombatError> {
        self.content.ok_or(CombatError::ContentUnavailable)
    }

    /// Draws a uniform value in `[0, 1)` for `actor`, advancing the world nonce.
    pub fn roll(&self, world: &mut World, actor: EntityId, context: RollContext) -> f64 {
        let seed = compute_seed(
            self.config.rng_seed,
            world.next_roll_nonce(),
            actor.0,
            context,
        );
        self.rng.unit(seed)
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env")
            .field("config", self.config)
            .field("registry", self.registry)
            .field("content", &self.content.is_some())
            .finish_non_exhaustive()
    }
}
