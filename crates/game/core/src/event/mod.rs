//! Typed events exchanged over the [`EventBus`].
//!
//! Every interaction between systems is a [`GameEvent`]. Handlers subscribe per
//! [`EventKind`] and may mutate the event in place (stat queries, cost checks),
//! which is why [`Dispatcher::dispatch`] hands the event back to the caller.
mod bus;
mod payloads;

pub use bus::{Dispatcher, EventBus, HandlerResult};
pub use payloads::{
    ChangeMode, DamageRequest, EffectResolution, HealRequest, LogTag, Provenance,
    ResolutionFlags, ResourceChange, StatQuery,
};

use crate::state::{EntityId, ResourceKind, Team};
use crate::status::{DispelFilter, StatusEffect};

#[derive(Clone, Debug, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, PartialOrd, Ord, strum::Display))]
pub enum GameEvent {
    RoundStart {
        round: u32,
    },
    /// The scheduler asks `actor` to act. Answered by a cast, an item use, or a pass.
    ActionRequest {
        actor: EntityId,
    },
    /// Ends the actor's turn.
    ActionTaken {
        actor: EntityId,
    },
    /// The actor tried something it could not do and keeps the turn.
    ActionRejected {
        actor: EntityId,
        reason: String,
    },
    CastSpellRequest {
        caster: EntityId,
        target: EntityId,
        spell_id: String,
    },
    UseItemRequest {
        user: EntityId,
        target: EntityId,
        item_id: String,
    },
    /// Handlers deduct the cost when possible and report back through `affordable`.
    ResourceCostRequest {
        entity: EntityId,
        resource: ResourceKind,
        cost: f64,
        affordable: bool,
    },
    ResourceChangeRequest {
        target: EntityId,
        resource: ResourceKind,
        amount: f64,
        mode: ChangeMode,
    },
    DamageRequest(DamageRequest),
    HealRequest(HealRequest),
    GainShieldRequest {
        target: EntityId,
        source: String,
        amount: f64,
    },
    HealthChanged {
        entity: EntityId,
        old_hp: f64,
        new_hp: f64,
        max_hp: f64,
    },
    ApplyStatusEffectRequest {
        target: EntityId,
        effect: StatusEffect,
        /// Poison instances requested by this cast.
        applications: u32,
    },
    RemoveStatusEffectRequest {
        target: EntityId,
        effect_id: String,
    },
    DispelRequest {
        target: EntityId,
        filter: DispelFilter,
        count: usize,
    },
    UpdateStatusEffectDurationRequest {
        target: EntityId,
        effect_id: String,
        delta: i32,
    },
    AmplifyPoisonRequest {
        target: EntityId,
        caster: Option<EntityId>,
        stacks: u32,
    },
    DetonatePoisonRequest {
        target: EntityId,
        caster: Option<EntityId>,
        multiplier: f64,
        source_name: String,
    },
    ReduceDebuffsRequest {
        target: EntityId,
        stacks: u32,
        rounds: i32,
    },
    StatQuery(StatQuery),
    StatusEffectsResolved {
        round: u32,
    },
    EffectResolutionComplete(EffectResolution),
    EntityDied {
        entity: EntityId,
    },
    MatchEnded {
        winner: Option<Team>,
        round: u32,
    },
    LogRequest {
        tag: LogTag,
        message: String,
    },
    UiMessage {
        message: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        self.into()
    }

    /// Apply request carrying the effect's own `poison_number` as application count.
    pub fn apply_status(target: EntityId, effect: StatusEffect) -> Self {
        let applications = effect.poison_number.max(1);
        Self::ApplyStatusEffectRequest {
            target,
            effect,
            applications,
        }
    }

    pub fn log(tag: LogTag, message: impl Into<String>) -> Self {
        Self::LogRequest {
            tag,
            message: message.into(),
        }
    }

    pub fn ui(message: impl Into<String>) -> Self {
        Self::UiMessage {
            message: message.into(),
        }
    }
}
