//! Reactive passives that listen to health changes.
//!
//! Attack-triggered passives live in the damage pipeline instead
//! (see [`AttackPassiveProcessor`](crate::combat::AttackPassiveProcessor)).

use crate::event::{Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag};
use crate::state::{HealthThresholdPassive, ThresholdPassiveSpent, World};

#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveSystem;

impl PassiveSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::HealthChanged, "passive.threshold", on_health_changed);
    }
}

/// Grants the threshold shield the first time health drops to the ratio.
fn on_health_changed(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::HealthChanged {
        entity,
        new_hp,
        max_hp,
        ..
    } = event
    else {
        return Ok(());
    };
    let (entity, new_hp, max_hp) = (*entity, *new_hp, *max_hp);
    if max_hp <= 0.0 || new_hp <= 0.0 {
        return Ok(());
    }
    let Some(passive) = world
        .entity(entity)
        .filter(|owner| !owner.has_component::<ThresholdPassiveSpent>())
        .and_then(|owner| owner.get_component::<HealthThresholdPassive>())
        .cloned()
    else {
        return Ok(());
    };
    let ratio = new_hp / max_hp;
    if ratio > passive.threshold_ratio {
        return Ok(());
    }

    world
        .try_entity_mut(entity)?
        .add_component(d.registry(), ThresholdPassiveSpent);
    let name = world.name_of(entity);
    tracing::debug!(entity = %entity, ratio, passive = %passive.name, "threshold passive fired");
    d.log(
        world,
        LogTag::Passive,
        format!(
            "{name}'s [{}] triggers at {:.0}% health",
            passive.name,
            ratio * 100.0
        ),
    );
    d.emit(
        world,
        GameEvent::GainShieldRequest {
            target: entity,
            source: passive.name.clone(),
            amount: passive.shield_amount,
        },
    );
    world.push_passive_trigger(format!(
        "{} (+{:.0} shield)",
        passive.name, passive.shield_amount
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::{Env, FixedRoll};
    use crate::state::{ComponentRegistry, EntityId, Health};

    fn health_changed(entity: EntityId, new_hp: f64) -> GameEvent {
        GameEvent::HealthChanged {
            entity,
            old_hp: 100.0,
            new_hp,
            max_hp: 100.0,
        }
    }

    #[test]
    fn threshold_fires_once() {
        let mut bus = EventBus::new();
        PassiveSystem::subscribe(&mut bus);
        let shields = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = shields.clone();
        bus.subscribe(EventKind::GainShieldRequest, move |_, _, event| {
            if let GameEvent::GainShieldRequest { amount, .. } = event {
                sink.borrow_mut().push(*amount);
            }
            Ok(())
        });
        let config = GameConfig::default();
        let registry = ComponentRegistry::default();
        let rng = FixedRoll(0.5);
        let d = Dispatcher::new(&bus, Env::new(&config, &registry, None, &rng));

        let mut world = World::new();
        let golem = world.spawn("golem");
        let entity = world.entity_mut(golem).unwrap();
        entity.add_component(&registry, Health::new(100.0));
        entity.add_component(
            &registry,
            HealthThresholdPassive {
                name: "Stone Skin".into(),
                threshold_ratio: 0.3,
                shield_amount: 25.0,
            },
        );

        d.emit(&mut world, health_changed(golem, 50.0));
        assert!(shields.borrow().is_empty());

        d.emit(&mut world, health_changed(golem, 30.0));
        d.emit(&mut world, health_changed(golem, 10.0));
        assert_eq!(*shields.borrow(), vec![25.0]);
        assert_eq!(
            world.take_passive_triggers(),
            vec!["Stone Skin (+25 shield)".to_string()]
        );
    }
}
