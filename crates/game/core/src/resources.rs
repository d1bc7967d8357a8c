//! Spendable pools: mana, energy, ultimate charge (plus health and shield for
//! generic restore/consume requests).
//!
//! Cost checks are all-or-nothing. A request that cannot be paid leaves the pool
//! untouched and reports `affordable = false`; it is up to the requester to tell
//! the player.

use crate::combat::set_health;
use crate::error::CombatError;
use crate::event::{ChangeMode, Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag};
use crate::state::{
    ComponentKind, Energy, EntityId, Health, Mana, ResourceKind, Shield, UltimateCharge, World,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceSystem;

impl ResourceSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::ResourceCostRequest, "resources.cost", on_cost);
        bus.subscribe_named(EventKind::ResourceChangeRequest, "resources.change", on_change);
    }
}

/// Asks the bus whether `entity` can pay `cost`, deducting it if so.
pub fn try_pay(
    d: &Dispatcher<'_>,
    world: &mut World,
    entity: EntityId,
    resource: ResourceKind,
    cost: f64,
) -> bool {
    let request = GameEvent::ResourceCostRequest {
        entity,
        resource,
        cost,
        affordable: false,
    };
    matches!(
        d.dispatch(world, request),
        GameEvent::ResourceCostRequest {
            affordable: true,
            ..
        }
    )
}

/// Current value and cap of a pool. Shields have no cap.
pub fn pool(world: &World, entity: EntityId, resource: ResourceKind) -> Option<(f64, Option<f64>)> {
    let entity = world.entity(entity)?;
    match resource {
        ResourceKind::Health => entity
            .get_component::<Health>()
            .map(|health| (health.hp(), Some(health.max_hp()))),
        ResourceKind::Shield => entity
            .get_component::<Shield>()
            .map(|shield| (shield.value, None)),
        ResourceKind::Mana => entity
            .get_component::<Mana>()
            .map(|mana| (mana.current, Some(mana.max))),
        ResourceKind::Energy => entity
            .get_component::<Energy>()
            .map(|energy| (energy.current, Some(energy.max))),
        ResourceKind::UltimateCharge => entity
            .get_component::<UltimateCharge>()
            .map(|charge| (charge.current, Some(charge.max))),
    }
}

fn component_kind(resource: ResourceKind) -> ComponentKind {
    match resource {
        ResourceKind::Health => ComponentKind::Health,
        ResourceKind::Shield => ComponentKind::Shield,
        ResourceKind::Mana => ComponentKind::Mana,
        ResourceKind::Energy => ComponentKind::Energy,
        ResourceKind::UltimateCharge => ComponentKind::UltimateCharge,
    }
}

fn write_pool(world: &mut World, entity: EntityId, resource: ResourceKind, value: f64) {
    let Some(entity) = world.entity_mut(entity) else {
        return;
    };
    match resource {
        // Health goes through `set_health` so the change is announced.
        ResourceKind::Health => {}
        ResourceKind::Shield => {
            if let Some(shield) = entity.get_component_mut::<Shield>() {
                shield.value = value;
            }
        }
        ResourceKind::Mana => {
            if let Some(mana) = entity.get_component_mut::<Mana>() {
                mana.current = value;
            }
        }
        ResourceKind::Energy => {
            if let Some(energy) = entity.get_component_mut::<Energy>() {
                energy.current = value;
            }
        }
        ResourceKind::UltimateCharge => {
            if let Some(charge) = entity.get_component_mut::<UltimateCharge>() {
                charge.current = value;
            }
        }
    }
}

/// Adds `delta` to the pool, clamped to `[0, max]`. Logs only real changes.
fn apply_delta(
    d: &Dispatcher<'_>,
    world: &mut World,
    entity: EntityId,
    resource: ResourceKind,
    delta: f64,
) -> HandlerResult {
    let (current, max) = pool(world, entity, resource).ok_or(CombatError::MissingComponent {
        entity,
        component: component_kind(resource),
    })?;
    let next = (current + delta).clamp(0.0, max.unwrap_or(f64::INFINITY));
    if next == current {
        return Ok(());
    }
    if resource == ResourceKind::Health {
        set_health(d, world, entity, next)?;
    } else {
        write_pool(world, entity, resource, next);
    }

    let name = world.name_of(entity);
    let verb = if next > current { "recovers" } else { "spends" };
    let amount = (next - current).abs();
    let message = match max {
        Some(max) => format!("{name} {verb} {amount:.1} {resource} ({next:.1}/{max:.1})"),
        None => format!("{name} {verb} {amount:.1} {resource} ({next:.1})"),
    };
    d.log(world, LogTag::Resource, message);
    Ok(())
}

fn on_cost(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ResourceCostRequest {
        entity,
        resource,
        cost,
        affordable,
    } = event
    else {
        return Ok(());
    };
    let (entity, resource, cost) = (*entity, *resource, *cost);
    if cost <= 0.0 {
        *affordable = true;
        return Ok(());
    }

    let available = pool(world, entity, resource).map_or(0.0, |(current, _)| current);
    if available < cost {
        *affordable = false;
        let shortfall = CombatError::InsufficientResource {
            entity,
            resource,
            required: cost,
            available,
        };
        tracing::debug!(entity = %entity, "cost check failed: {shortfall}");
        return Ok(());
    }
    *affordable = true;
    apply_delta(d, world, entity, resource, -cost)
}

fn on_change(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ResourceChangeRequest {
        target,
        resource,
        amount,
        mode,
    } = event
    else {
        return Ok(());
    };
    let delta = match mode {
        ChangeMode::Restore => amount.abs(),
        ChangeMode::Consume => -amount.abs(),
    };
    apply_delta(d, world, *target, *resource, delta)
}
