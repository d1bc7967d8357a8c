use std::collections::BTreeMap;

use super::registry::ComponentRegistry;
use super::types::{Component, ComponentKind, ComponentType, EntityId};
use crate::error::CombatError;

/// An identity plus its components.
///
/// Components live in one of two stores: a single slot per kind, or an ordered
/// list for the kinds the [`ComponentRegistry`] marks as multi-instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    name: String,
    single: BTreeMap<ComponentKind, Component>,
    multi: BTreeMap<ComponentKind, Vec<Component>>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            single: BTreeMap::new(),
            multi: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends to the kind's list when it is multi-instance, otherwise replaces
    /// the current single instance.
    pub fn add_component<T: ComponentType>(&mut self, registry: &ComponentRegistry, component: T) {
        self.insert(registry, component.into_component());
    }

    /// Untyped form of [`Entity::add_component`], used by factories.
    pub fn insert(&mut self, registry: &ComponentRegistry, component: Component) {
        let kind = component.kind();
        if registry.allows_multiple(kind) {
            self.multi.entry(kind).or_default().push(component);
        } else {
            self.single.insert(kind, component);
        }
    }

    /// The single instance, or the first of the multi-instance list.
    pub fn get_component<T: ComponentType>(&self) -> Option<&T> {
        match self.single.get(&T::KIND) {
            Some(component) => T::from_ref(component),
            None => self
                .multi
                .get(&T::KIND)
                .and_then(|list| list.first())
                .and_then(T::from_ref),
        }
    }

    pub fn get_component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        if let Some(component) = self.single.get_mut(&T::KIND) {
            return T::from_mut(component);
        }
        self.multi
            .get_mut(&T::KIND)
            .and_then(|list| list.first_mut())
            .and_then(T::from_mut)
    }

    /// Every instance of the kind: empty, the single instance, or the full list.
    pub fn get_components<T: ComponentType>(&self) -> Vec<&T> {
        self.single
            .get(&T::KIND)
            .into_iter()
            .chain(self.multi.get(&T::KIND).into_iter().flatten())
            .filter_map(T::from_ref)
            .collect()
    }

    pub fn has_component<T: ComponentType>(&self) -> bool {
        self.has_kind(T::KIND)
    }

    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.single.contains_key(&kind) || self.multi.get(&kind).is_some_and(|list| !list.is_empty())
    }

    /// Returns the existing instance or inserts the one built by `make`.
    pub fn get_or_insert_with<T, F>(&mut self, registry: &ComponentRegistry, make: F) -> &mut T
    where
        T: ComponentType,
        F: FnOnce() -> T,
    {
        let slot = if registry.allows_multiple(T::KIND) {
            let list = self.multi.entry(T::KIND).or_default();
            if list.is_empty() {
                list.push(make().into_component());
            }
            &mut list[0]
        } else {
            self.single
                .entry(T::KIND)
                .or_insert_with(|| make().into_component())
        };
        match T::from_mut(slot) {
            Some(value) => value,
            None => unreachable!("{} slot holds a component of another kind", T::KIND),
        }
    }

    /// Removes the single instance of a slot-style component.
    ///
    /// Multi-instance kinds have no removal API.
    pub fn remove_component<T: ComponentType>(
        &mut self,
        registry: &ComponentRegistry,
    ) -> Result<Option<T>, CombatError> {
        if registry.allows_multiple(T::KIND) {
            return Err(CombatError::NotSingleton(T::KIND));
        }
        Ok(self.single.remove(&T::KIND).and_then(T::from_component))
    }
}
