//! Component and value types stored on entities.
mod combat;
mod common;
mod component;
mod loadout;
mod vitals;

pub use combat::{
    AttackTriggerPassive, CounterStrike, Crit, GrievousWounds, HealthThresholdPassive, Magnitude,
    OverhealToShield, PassiveEffect, Resistance, Thorns, TriggerCondition,
};
pub use common::{DamageType, EntityId, ResourceKind, StatKind, Team};
pub use component::{Component, ComponentKind, ComponentType};
pub use loadout::{
    Controller, Dead, Equipment, Inventory, Position, SpellList, ThresholdPassiveSpent, Weapon,
    Wear,
};
pub use vitals::{
    ActionGauge, Energy, Health, HealthChange, Mana, Shield, Speed, UltimateCharge,
};
