//! Match loop and system wiring.
//!
//! The [`Engine`] owns the [`World`], the [`EventBus`] and the read-only
//! collaborators (configuration, component registry, content and RNG oracles).
//! Each tick it lends them out as a [`Dispatcher`] and runs the polling
//! [`System`]s in priority order; everything else happens inside bus handlers.

mod death;
mod system;
mod turns;

pub use death::{DeathSystem, MatchOutcome, check_battle_end, end_match};
pub use system::System;
pub use turns::{TurnScheduler, TurnState, round_robin_order};

use std::rc::Rc;
use std::time::Duration;

use crate::ai::SimpleAi;
use crate::combat::CombatResolution;
use crate::config::GameConfig;
use crate::env::{ContentOracle, Env, PcgRng, RngOracle};
use crate::event::{Dispatcher, EventBus, GameEvent, LogTag};
use crate::passive::PassiveSystem;
use crate::resources::ResourceSystem;
use crate::spell::{InteractionSystem, ItemSystem, SpellCastSystem};
use crate::state::{Component, ComponentRegistry, EntityId, World};
use crate::status::StatusEffectSystem;

/// Summary returned by [`Engine::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    pub outcome: Option<MatchOutcome>,
    pub rounds: u32,
    pub ticks: u64,
}

/// Owns the match and drives it tick by tick.
pub struct Engine {
    world: World,
    bus: EventBus,
    config: GameConfig,
    registry: ComponentRegistry,
    content: Option<Box<dyn ContentOracle>>,
    rng: Box<dyn RngOracle>,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    /// Creates an engine with an empty world, no handlers and the PCG roll oracle.
    pub fn new(config: GameConfig) -> Self {
        Self {
            world: World::new(),
            bus: EventBus::new(),
            config,
            registry: ComponentRegistry::default(),
            content: None,
            rng: Box::new(PcgRng),
            systems: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl ContentOracle + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    pub fn with_rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Creates an entity and attaches `components` through the registry.
    pub fn spawn<I>(&mut self, name: impl Into<String>, components: I) -> EntityId
    where
        I: IntoIterator<Item = Component>,
    {
        let id = self.world.spawn(name);
        if let Some(entity) = self.world.entity_mut(id) {
            for component in components {
                entity.insert(&self.registry, component);
            }
        }
        id
    }

    /// Registers a polling system, keeping the list in priority order.
    pub fn add_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
        system::sort_by_priority(&mut self.systems);
    }

    /// Subscribes every built-in handler and registers the polling systems.
    ///
    /// Registration order matters: interactions see a damage request before
    /// combat resolution does, and the scheduler hears `ActionTaken` before the
    /// AI hears the next `ActionRequest`.
    pub fn install_default_systems(&mut self) {
        let bus = &mut self.bus;
        ResourceSystem::subscribe(bus);
        InteractionSystem::subscribe(bus);
        SpellCastSystem::subscribe(bus);
        ItemSystem::subscribe(bus);
        Rc::new(CombatResolution::new()).subscribe(bus);
        StatusEffectSystem::subscribe(bus);
        PassiveSystem::subscribe(bus);
        DeathSystem::subscribe(bus);
        let scheduler = TurnScheduler::new(self.config.scheduler);
        scheduler.subscribe(bus);
        SimpleAi::subscribe(bus);

        self.add_system(DeathSystem);
        self.add_system(scheduler);
        tracing::debug!(bus = ?self.bus, "default systems installed");
    }

    /// Dispatches one event against the world and returns it as the handlers left it.
    pub fn dispatch(&mut self, event: GameEvent) -> GameEvent {
        let Self {
            world,
            bus,
            config,
            registry,
            content,
            rng,
            ..
        } = self;
        let env = Env::new(config, registry, content.as_deref(), &**rng);
        Dispatcher::new(bus, env).dispatch(world, event)
    }

    /// Runs every system once. Returns false once the match is over.
    pub fn tick(&mut self) -> bool {
        let Self {
            world,
            bus,
            config,
            registry,
            content,
            rng,
            systems,
        } = self;
        if !world.is_running() {
            return false;
        }
        world.turn.ticks += 1;
        let env = Env::new(config, registry, content.as_deref(), &**rng);
        let d = Dispatcher::new(bus, env);
        for system in systems.iter() {
            if let Err(error) = system.update(&d, world) {
                tracing::error!(system = system.name(), "system update failed: {error}");
            }
            if !world.is_running() {
                break;
            }
        }
        world.is_running()
    }

    /// Starts the match and ticks until it ends or a safety limit is hit.
    pub fn run(&mut self) -> RunReport {
        self.world.start();
        let names: Vec<_> = self
            .world
            .living_ids()
            .into_iter()
            .map(|id| self.world.name_of(id))
            .collect();
        tracing::info!(
            scheduler = %self.config.scheduler,
            seed = self.config.rng_seed,
            "match start"
        );
        self.dispatch(GameEvent::log(
            LogTag::System,
            format!("match start: {}", names.join(", ")),
        ));

        let pause = Duration::from_millis(self.config.tick_interval_ms);
        while self.tick() {
            if self.world.turn.ticks >= self.config.max_ticks {
                tracing::warn!(ticks = self.world.turn.ticks, "tick limit reached");
                self.stop_without_winner();
                break;
            }
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }

        RunReport {
            outcome: self.world.turn.outcome,
            rounds: self.world.turn.round,
            ticks: self.world.turn.ticks,
        }
    }

    fn stop_without_winner(&mut self) {
        let Self {
            world,
            bus,
            config,
            registry,
            content,
            rng,
            ..
        } = self;
        let env = Env::new(config, registry, content.as_deref(), &**rng);
        end_match(&Dispatcher::new(bus, env), world, None);
    }
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world)
            .field("config", &self.config)
            .field("systems", &self.systems.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedRoll;
    use crate::state::{Health, Speed, Team};

    #[test]
    fn run_stops_at_the_round_limit_without_a_winner() {
        let mut config = GameConfig::default();
        config.max_rounds = 3;
        let mut engine = Engine::new(config).with_rng(FixedRoll(0.99));
        engine.install_default_systems();
        // No spell lists: the AI passes every turn.
        engine.spawn(
            "knight",
            [
                Component::from(Health::new(30.0)),
                Component::from(Speed::new(10.0)),
                Component::from(Team::Heroes),
            ],
        );
        engine.spawn(
            "slime",
            [
                Component::from(Health::new(30.0)),
                Component::from(Speed::new(5.0)),
                Component::from(Team::Monsters),
            ],
        );

        let report = engine.run();
        assert_eq!(report.rounds, 3);
        assert_eq!(report.outcome.unwrap().winner, None);
        assert!(!engine.world().is_running());
    }

    #[test]
    fn run_ends_immediately_with_a_single_side() {
        let mut engine = Engine::new(GameConfig::default());
        engine.install_default_systems();
        engine.spawn("a", [Component::from(Health::new(10.0)), Component::from(Team::Heroes)]);
        engine.spawn("b", [Component::from(Health::new(10.0)), Component::from(Team::Heroes)]);

        let report = engine.run();
        assert_eq!(report.rounds, 0);
        assert_eq!(report.outcome.unwrap().winner, Some(Team::Heroes));
    }
}
