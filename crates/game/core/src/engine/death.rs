//! Death flagging and battle end.

use std::collections::BTreeSet;

use crate::event::{Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag};
use crate::state::{Dead, Team, World};

use super::system::System;

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    /// `None` for a draw, a timeout, or a lone survivor without a team.
    pub winner: Option<Team>,
    pub round: u32,
}

/// Flags entities at zero health as dead and stops the match once one side is left.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeathSystem;

impl DeathSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::HealthChanged, "death.health_changed", on_health_changed);
    }
}

impl System for DeathSystem {
    fn name(&self) -> &'static str {
        "death"
    }

    fn update(&self, d: &Dispatcher<'_>, world: &mut World) -> HandlerResult {
        if world.is_running() {
            check_battle_end(d, world);
        }
        Ok(())
    }
}

fn on_health_changed(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::HealthChanged { entity, new_hp, .. } = event else {
        return Ok(());
    };
    let (entity, new_hp) = (*entity, *new_hp);
    if new_hp > 0.0 {
        return Ok(());
    }
    let target = world.try_entity_mut(entity)?;
    if target.has_component::<Dead>() {
        return Ok(());
    }
    target.add_component(d.registry(), Dead);

    let name = world.name_of(entity);
    tracing::info!(entity = %entity, "entity died");
    d.log(world, LogTag::Combat, format!("{name} has been defeated"));
    d.ui(world, format!("{name} falls!"));
    d.emit(world, GameEvent::EntityDied { entity });
    Ok(())
}

/// Ends the match when fewer than two sides (or two entities) are alive.
///
/// Entities without a [`Team`] count as a side of their own. Returns true if the
/// match ended.
pub fn check_battle_end(d: &Dispatcher<'_>, world: &mut World) -> bool {
    let living = world.living_ids();
    let teams: BTreeSet<Team> = living.iter().filter_map(|id| world.team_of(*id)).collect();
    let loners = living
        .iter()
        .filter(|id| world.team_of(**id).is_none())
        .count();
    if living.len() >= 2 && teams.len() + loners >= 2 {
        return false;
    }

    let winner = if loners == 0 {
        teams.first().copied()
    } else {
        None
    };
    end_match(d, world, winner);
    true
}

/// Stops the world and announces the result. Does nothing if already stopped.
pub fn end_match(d: &Dispatcher<'_>, world: &mut World, winner: Option<Team>) {
    if !world.is_running() {
        return;
    }
    world.stop();
    let round = world.turn.round;
    world.turn.outcome = Some(MatchOutcome { winner, round });
    tracing::info!(round, winner = ?winner, "match ended");

    let message = match winner {
        Some(team) => format!("match over after round {round}: {team} win"),
        None => format!("match over after round {round}: no winner"),
    };
    d.log(world, LogTag::System, message.clone());
    d.ui(world, message);
    d.emit(world, GameEvent::MatchEnded { winner, round });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::{Env, FixedRoll};
    use crate::state::{ComponentRegistry, EntityId, Health};

    fn spawn(world: &mut World, registry: &ComponentRegistry, name: &str, team: Team) -> EntityId {
        let id = world.spawn(name);
        let entity = world.entity_mut(id).unwrap();
        entity.add_component(registry, Health::new(10.0));
        entity.add_component(registry, team);
        id
    }

    #[test]
    fn zero_health_marks_dead_once_and_ends_the_match() {
        let mut bus = EventBus::new();
        DeathSystem::subscribe(&mut bus);
        let deaths = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = deaths.clone();
        bus.subscribe(EventKind::EntityDied, move |_, _, _| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let config = GameConfig::default();
        let registry = ComponentRegistry::default();
        let rng = FixedRoll(0.5);
        let d = Dispatcher::new(&bus, Env::new(&config, &registry, None, &rng));

        let mut world = World::new();
        let hero = spawn(&mut world, &registry, "hero", Team::Heroes);
        let slime = spawn(&mut world, &registry, "slime", Team::Monsters);
        world.start();

        let died = GameEvent::HealthChanged {
            entity: slime,
            old_hp: 10.0,
            new_hp: 0.0,
            max_hp: 10.0,
        };
        d.dispatch(&mut world, died.clone());
        d.dispatch(&mut world, died);
        assert_eq!(deaths.get(), 1);
        assert!(world.entity(slime).unwrap().has_component::<Dead>());

        assert!(check_battle_end(&d, &mut world));
        assert!(!world.is_running());
        assert_eq!(world.turn.outcome.unwrap().winner, Some(Team::Heroes));
        assert!(world.is_alive(hero));
    }

    #[test]
    fn two_sides_alive_keeps_running() {
        let bus = EventBus::new();
        let config = GameConfig::default();
        let registry = ComponentRegistry::default();
        let rng = FixedRoll(0.5);
        let d = Dispatcher::new(&bus, Env::new(&config, &registry, None, &rng));

        let mut world = World::new();
        spawn(&mut world, &registry, "hero", Team::Heroes);
        spawn(&mut world, &registry, "slime", Team::Monsters);
        world.start();
        assert!(!check_battle_end(&d, &mut world));
        assert!(world.is_running());
    }
}
