//! The closed set of component types an entity can carry.
//!
//! Every component struct is wrapped by a [`Component`] variant and identified by
//! a [`ComponentKind`]. [`ComponentType`] gives typed access so callers write
//! `entity.get_component::<Health>()` instead of matching on the enum.

use super::combat::{
    AttackTriggerPassive, CounterStrike, Crit, GrievousWounds, HealthThresholdPassive,
    OverhealToShield, Resistance, Thorns,
};
use super::common::Team;
use super::loadout::{
    Controller, Dead, Equipment, Inventory, Position, SpellList, ThresholdPassiveSpent,
};
use super::vitals::{ActionGauge, Energy, Health, Mana, Shield, Speed, UltimateCharge};
use crate::status::StatusEffects;

/// Typed view over one [`Component`] variant.
pub trait ComponentType: Sized {
    const KIND: ComponentKind;

    fn into_component(self) -> Component;
    fn from_component(component: Component) -> Option<Self>;
    fn from_ref(component: &Component) -> Option<&Self>;
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! components {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Any component value, tagged by its kind.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Component {
            $($variant($ty),)*
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
        #[strum(serialize_all = "snake_case")]
        pub enum ComponentKind {
            $($variant,)*
        }

        impl Component {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Self::$variant(_) => ComponentKind::$variant,)*
                }
            }
        }

        $(
            impl ComponentType for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn into_component(self) -> Component {
                    Component::$variant(self)
                }

                fn from_component(component: Component) -> Option<Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_ref(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$variant(value)
                }
            }
        )*
    };
}

components! {
    Health(Health),
    Shield(Shield),
    Mana(Mana),
    Energy(Energy),
    UltimateCharge(UltimateCharge),
    Speed(Speed),
    ActionGauge(ActionGauge),
    Crit(Crit),
    Resistance(Resistance),
    Thorns(Thorns),
    CounterStrike(CounterStrike),
    GrievousWounds(GrievousWounds),
    OverhealToShield(OverhealToShield),
    AttackTriggerPassive(AttackTriggerPassive),
    HealthThresholdPassive(HealthThresholdPassive),
    ThresholdPassiveSpent(ThresholdPassiveSpent),
    StatusEffects(StatusEffects),
    SpellList(SpellList),
    Equipment(Equipment),
    Inventory(Inventory),
    Controller(Controller),
    Team(Team),
    Position(Position),
    Dead(Dead),
}
