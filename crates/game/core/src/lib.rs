//! Turn-based combat rules shared by every front end.
//!
//! `game-core` holds the whole match: the entity/component store, the typed
//! [`event::EventBus`] every system talks through, the damage and heal
//! pipelines, status effects, the turn scheduler and the [`engine::Engine`]
//! that ties them together. It performs no I/O; content arrives through the
//! [`env::ContentOracle`] trait and randomness through [`env::RngOracle`].
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod passive;
pub mod resources;
pub mod spell;
pub mod state;
pub mod status;

pub use ai::{Decision, SimpleAi};
pub use config::{GameConfig, SchedulerMode};
pub use engine::{Engine, MatchOutcome, RunReport, System, TurnScheduler};
pub use env::{
    ContentOracle, ContentSnapshot, Env, FixedRoll, ItemDefinition, PcgRng, RngOracle,
    SpellDefinition, SpellEffect, StatusEffectDefinition, TargetKind,
};
pub use error::{CombatError, DataKind, ErrorSeverity, GameError};
pub use event::{
    DamageRequest, Dispatcher, EffectResolution, EventBus, EventKind, GameEvent, HealRequest,
    LogTag, Provenance,
};
pub use state::{Component, ComponentRegistry, DamageType, Entity, EntityId, Team, World};
pub use status::{StatusEffect, StatusEffects};
