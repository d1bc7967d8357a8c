//! Damage and heal resolution.
//!
//! Requests arriving on the bus are turned into an [`EffectContext`] and run
//! through fixed processor chains:
//!
//! - **Damage**: crit, shield, resistance, then health is written, then
//!   lifesteal, thorns, counter-strike and attack-triggered passives.
//! - **Heal**: heal reduction, then health is written, then overheal
//!   conversion (status effect, skill, passive; first one wins).
//!
//! Follow-up requests dispatched by post stages carry a [`Provenance`] other
//! than `Direct`, which keeps reflection and passive cascades one level deep.
//!
//! [`Provenance`]: crate::event::Provenance

mod context;
mod damage;
mod heal;
mod pipeline;
mod resolution;

pub use context::{EffectContext, EffectKind, EffectMeta, EffectOutcome};
pub use damage::{
    AttackPassiveProcessor, CounterStrikeProcessor, CritProcessor, LifestealProcessor,
    ResistanceProcessor, ShieldProcessor, ThornsProcessor, post_damage_pipeline,
    pre_damage_pipeline,
};
pub use heal::{
    GrievousWoundsProcessor, PassiveOverhealProcessor, SkillOverhealProcessor,
    StatusEffectOverhealProcessor, post_heal_pipeline, pre_heal_pipeline,
};
pub use pipeline::{Pipeline, Processor};
pub use resolution::{CombatResolution, set_health};
