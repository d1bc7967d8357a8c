//! Turn scheduling.
//!
//! Two schedulers share one [`TurnState`]:
//!
//! - **Round-robin**: each round, living entities with speed are queued by final
//!   speed (descending), then position, then id, and popped one at a time.
//! - **Action points**: every tick each gauge gains `final speed * rate`; the
//!   fullest gauge at or above the threshold acts and pays exactly the threshold.
//!
//! Either way only one entity acts at a time: once an [`ActionRequest`] is out,
//! the scheduler idles until the matching `ActionTaken` arrives.
//!
//! [`ActionRequest`]: crate::event::GameEvent::ActionRequest

use std::collections::VecDeque;

use crate::config::{GameConfig, SchedulerMode};
use crate::event::{ChangeMode, Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag};
use crate::state::{ActionGauge, Energy, EntityId, Position, ResourceKind, Speed, StatKind, World};
use crate::status::{is_action_blocked, query_stat};

use super::death::{MatchOutcome, check_battle_end, end_match};
use super::system::System;

/// Scheduler bookkeeping, stored on the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnState {
    /// Current round, starting at 1 once the first round begins.
    pub round: u32,
    /// Remaining actors of the current round (round-robin only).
    pub queue: VecDeque<EntityId>,
    /// Entity whose action the scheduler is waiting for.
    pub awaiting: Option<EntityId>,
    /// Set when the awaited action was rejected; the request goes out again next tick.
    pub reissue: bool,
    pub actions_this_round: u32,
    /// Living entities when the round began. Action-point mode counts a round as
    /// this many actions.
    pub round_size: u32,
    pub ticks: u64,
    pub outcome: Option<MatchOutcome>,
}

impl TurnState {
    pub fn is_waiting(&self) -> bool {
        self.awaiting.is_some()
    }
}

/// Decides who acts next. Runs as a [`System`] and listens for turn completion.
#[derive(Clone, Copy, Debug)]
pub struct TurnScheduler {
    mode: SchedulerMode,
}

impl TurnScheduler {
    pub fn new(mode: SchedulerMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SchedulerMode {
        self.mode
    }

    pub fn subscribe(&self, bus: &mut EventBus) {
        let mode = self.mode;
        bus.subscribe_named(EventKind::ActionTaken, "turns.action_taken", move |d, world, event| {
            on_action_taken(mode, d, world, event)
        });
        bus.subscribe_named(EventKind::ActionRejected, "turns.action_rejected", on_action_rejected);
    }
}

impl System for TurnScheduler {
    fn name(&self) -> &'static str {
        "turns"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn update(&self, d: &Dispatcher<'_>, world: &mut World) -> HandlerResult {
        if !world.is_running() {
            return Ok(());
        }
        if world.living_ids().len() < 2 {
            check_battle_end(d, world);
            return Ok(());
        }
        if wait_for_action(d, world) {
            return Ok(());
        }
        match self.mode {
            SchedulerMode::RoundRobin => round_robin_tick(d, world),
            SchedulerMode::ActionPoints => action_point_tick(d, world),
        }
        Ok(())
    }
}

/// Returns true while the current actor still owes an action.
fn wait_for_action(d: &Dispatcher<'_>, world: &mut World) -> bool {
    let Some(actor) = world.turn.awaiting else {
        return false;
    };
    if !world.is_alive(actor) {
        tracing::debug!(entity = %actor, "awaited actor is dead, moving on");
        world.turn.awaiting = None;
        world.turn.reissue = false;
        world.turn.actions_this_round += 1;
        return false;
    }
    if std::mem::take(&mut world.turn.reissue) {
        d.emit(world, GameEvent::ActionRequest { actor });
    }
    true
}

fn round_robin_tick(d: &Dispatcher<'_>, world: &mut World) {
    let exhausted = world
        .turn
        .queue
        .iter()
        .all(|id| !world.is_alive(*id));
    if exhausted {
        world.turn.queue.clear();
        if !start_round(d, world) {
            return;
        }
        let order = round_robin_order(d, world);
        world.turn.queue = order.into();
    }

    while let Some(actor) = world.turn.queue.pop_front() {
        if world.is_alive(actor) {
            begin_turn(d, world, actor);
            return;
        }
    }
}

fn action_point_tick(d: &Dispatcher<'_>, world: &mut World) {
    let round_over =
        world.turn.round == 0 || world.turn.actions_this_round >= world.turn.round_size;
    if round_over && !start_round(d, world) {
        return;
    }

    let rate = d.config().ap_recovery_rate;
    let registry = d.registry();
    let mut ready = Vec::new();
    for id in world.living_ids() {
        let Some(base) = base_speed(world, id) else {
            continue;
        };
        let speed = query_stat(d, world, id, StatKind::Speed, base);
        let Some(entity) = world.entity_mut(id) else {
            continue;
        };
        let gauge = entity.get_or_insert_with(registry, ActionGauge::default);
        gauge.value += speed.max(0.0) * rate;
        let value = gauge.value;
        if value >= GameConfig::ACTION_POINT_THRESHOLD {
            ready.push((value, position_key(world, id), id));
        }
    }

    let next = ready.into_iter().min_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    if let Some((gauge, _, actor)) = next {
        tracing::debug!(entity = %actor, gauge, "action gauge full");
        begin_turn(d, world, actor);
    }
}

/// Opens a new round: bumps the counter and ticks status effects.
///
/// Returns false if the match ended instead.
fn start_round(d: &Dispatcher<'_>, world: &mut World) -> bool {
    let limit = d.config().max_rounds;
    if world.turn.round >= limit {
        tracing::info!(round = world.turn.round, "round limit reached");
        d.log(world, LogTag::Turn, format!("round limit of {limit} reached"));
        end_match(d, world, None);
        return false;
    }

    world.turn.round += 1;
    world.turn.actions_this_round = 0;
    world.turn.round_size = u32::try_from(world.living_ids().len()).unwrap_or(u32::MAX);
    let round = world.turn.round;
    tracing::info!(round, "round start");
    d.log(world, LogTag::Turn, format!("=== Round {round} ==="));
    d.emit(world, GameEvent::RoundStart { round });

    world.is_running() && !check_battle_end(d, world)
}

/// Acting order for one round-robin round.
pub fn round_robin_order(d: &Dispatcher<'_>, world: &mut World) -> Vec<EntityId> {
    let mut entries = Vec::new();
    for id in world.living_ids() {
        let Some(base) = base_speed(world, id) else {
            continue;
        };
        let speed = query_stat(d, world, id, StatKind::Speed, base);
        entries.push((speed, position_key(world, id), id));
    }
    entries.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    entries.into_iter().map(|(_, _, id)| id).collect()
}

fn begin_turn(d: &Dispatcher<'_>, world: &mut World, actor: EntityId) {
    world.turn.awaiting = Some(actor);
    world.turn.reissue = false;
    let name = world.name_of(actor);

    if is_action_blocked(world, actor) {
        tracing::debug!(entity = %actor, "turn skipped, action blocked");
        d.log(world, LogTag::Turn, format!("{name} is stunned and loses the turn"));
        d.ui(world, format!("{name} cannot act!"));
        d.emit(world, GameEvent::ActionTaken { actor });
        return;
    }
    tracing::debug!(entity = %actor, "turn begins");
    d.log(world, LogTag::Turn, format!("{name}'s turn"));
    d.emit(world, GameEvent::ActionRequest { actor });
}

fn on_action_taken(
    mode: SchedulerMode,
    d: &Dispatcher<'_>,
    world: &mut World,
    event: &mut GameEvent,
) -> HandlerResult {
    let GameEvent::ActionTaken { actor } = event else {
        return Ok(());
    };
    let actor = *actor;
    if world.turn.awaiting != Some(actor) {
        tracing::trace!(entity = %actor, "out-of-turn action ignored by scheduler");
        return Ok(());
    }
    world.turn.awaiting = None;
    world.turn.reissue = false;
    world.turn.actions_this_round += 1;

    if mode == SchedulerMode::ActionPoints {
        if let Some(gauge) = world
            .entity_mut(actor)
            .and_then(|entity| entity.get_component_mut::<ActionGauge>())
        {
            gauge.value -= GameConfig::ACTION_POINT_THRESHOLD;
        }
    }

    let recovery = world
        .entity(actor)
        .and_then(|entity| entity.get_component::<Energy>())
        .map_or(0.0, |energy| energy.recovery_per_turn);
    if recovery > 0.0 {
        d.emit(
            world,
            GameEvent::ResourceChangeRequest {
                target: actor,
                resource: ResourceKind::Energy,
                amount: recovery,
                mode: ChangeMode::Restore,
            },
        );
    }
    Ok(())
}

fn on_action_rejected(_: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ActionRejected { actor, reason } = event else {
        return Ok(());
    };
    if world.turn.awaiting == Some(*actor) {
        tracing::debug!(entity = %actor, reason = %reason, "action rejected, turn kept");
        world.turn.reissue = true;
    }
    Ok(())
}

fn base_speed(world: &World, id: EntityId) -> Option<f64> {
    world
        .entity(id)
        .and_then(|entity| entity.get_component::<Speed>())
        .map(|speed| speed.base)
}

fn position_key(world: &World, id: EntityId) -> u32 {
    world
        .entity(id)
        .and_then(|entity| entity.get_component::<Position>())
        .map_or(id.0, |position| position.0)
}
