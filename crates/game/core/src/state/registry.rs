use std::collections::BTreeSet;

use super::types::ComponentKind;

/// Which component kinds an entity may hold several instances of.
///
/// Built once at startup and passed by reference to every insertion, so the
/// single-versus-multi decision never depends on global state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentRegistry {
    multi_instance: BTreeSet<ComponentKind>,
}

impl ComponentRegistry {
    /// A registry where every kind is single-instance.
    pub fn empty() -> Self {
        Self {
            multi_instance: BTreeSet::new(),
        }
    }

    pub fn with_multi_instance(mut self, kind: ComponentKind) -> Self {
        self.multi_instance.insert(kind);
        self
    }

    pub fn allows_multiple(&self, kind: ComponentKind) -> bool {
        self.multi_instance.contains(&kind)
    }

    pub fn multi_instance_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.multi_instance.iter().copied()
    }
}

impl Default for ComponentRegistry {
    /// Resistances and attack-triggered passives stack as separate instances.
    fn default() -> Self {
        Self::empty()
            .with_multi_instance(ComponentKind::Resistance)
            .with_multi_instance(ComponentKind::AttackTriggerPassive)
    }
}
