use crate::error::CombatError;
use crate::event::{Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, LogTag, StatQuery};
use crate::state::{EntityId, StatKind, World};

use super::container::StatusEffects;
use super::effect::{DispelFilter, StatusEffect};
use super::logic::StackOutcome;
use super::poison;

/// Owns every status-effect decision: stacking, ticking, expiry, dispels and
/// stat-query answers.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusEffectSystem;

impl StatusEffectSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::RoundStart, "status.round_start", on_round_start);
        bus.subscribe_named(EventKind::ApplyStatusEffectRequest, "status.apply", on_apply);
        bus.subscribe_named(EventKind::RemoveStatusEffectRequest, "status.remove", on_remove);
        bus.subscribe_named(EventKind::DispelRequest, "status.dispel", on_dispel);
        bus.subscribe_named(
            EventKind::UpdateStatusEffectDurationRequest,
            "status.update_duration",
            on_update_duration,
        );
        bus.subscribe_named(EventKind::AmplifyPoisonRequest, "status.amplify", on_amplify);
        bus.subscribe_named(EventKind::DetonatePoisonRequest, "status.detonate", on_detonate);
        bus.subscribe_named(EventKind::ReduceDebuffsRequest, "status.reduce", on_reduce_debuffs);
        bus.subscribe_named(EventKind::StatQuery, "status.stat_query", on_stat_query);
    }
}

/// Runs a stat query through every effect on `entity` and returns the final value.
pub fn query_stat(
    d: &Dispatcher<'_>,
    world: &mut World,
    entity: EntityId,
    stat: StatKind,
    base: f64,
) -> f64 {
    match d.dispatch(world, GameEvent::StatQuery(StatQuery::new(entity, stat, base))) {
        GameEvent::StatQuery(query) => query.value,
        _ => base,
    }
}

/// True if any effect on the entity stops it from acting this turn.
pub fn is_action_blocked(world: &World, entity: EntityId) -> bool {
    world
        .entity(entity)
        .and_then(|e| e.get_component::<StatusEffects>())
        .is_some_and(StatusEffects::blocks_action)
}

enum Placement {
    Merged(StackOutcome),
    Appended,
}

fn on_apply(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::ApplyStatusEffectRequest {
        target,
        effect,
        applications,
    } = event
    else {
        return Ok(());
    };
    let (target, applications) = (*target, *applications);
    if !world.is_alive(target) {
        return Ok(());
    }
    if effect.is_poison() {
        return poison::apply(d, world, target, effect.clone(), applications);
    }

    let mut incoming = effect.clone();
    incoming.instance = world.next_effect_instance();
    let container = world
        .try_entity_mut(target)?
        .get_or_insert_with(d.registry(), StatusEffects::new);

    let merged = match container.find_stackable_mut(&incoming) {
        Some(existing) => {
            let logic = existing.logic.clone();
            match logic.handle_stacking(existing, &incoming) {
                StackOutcome::Rejected => None,
                outcome => Some(Placement::Merged(outcome)),
            }
        }
        None => None,
    };
    let placement = match merged {
        Some(placement) => placement,
        None => {
            container.push(incoming.clone());
            Placement::Appended
        }
    };

    let name = world.name_of(target);
    match placement {
        Placement::Merged(StackOutcome::Refreshed { duration }) => d.ui(
            world,
            format!("{name}'s {} refreshed to {}", incoming.name, rounds(duration)),
        ),
        Placement::Merged(StackOutcome::Intensified { stacks, duration }) => d.ui(
            world,
            format!(
                "{name}'s {} stacks to {stacks}, {}",
                incoming.name,
                rounds(duration)
            ),
        ),
        Placement::Merged(StackOutcome::Rejected) | Placement::Appended => {
            incoming.logic.on_apply(&incoming, target, d, world);
            d.ui(world, format!("{name} gains {}", incoming.name));
        }
    }
    Ok(())
}

fn rounds(duration: Option<i32>) -> String {
    duration.map_or_else(|| "permanent".to_owned(), |n| format!("{n} round(s)"))
}

fn on_remove(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::RemoveStatusEffectRequest { target, effect_id } = event else {
        return Ok(());
    };
    let target = *target;
    let instances = match world
        .try_entity(target)?
        .get_component::<StatusEffects>()
    {
        Some(container) => container.instances_of(effect_id),
        None => return Ok(()),
    };
    let removed = remove_instances(d, world, target, instances)?;
    if !removed.is_empty() {
        let name = world.name_of(target);
        d.log(world, LogTag::Status, format!("[{name}] {effect_id} removed"));
    }
    Ok(())
}

fn on_dispel(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::DispelRequest {
        target,
        filter,
        count,
    } = event
    else {
        return Ok(());
    };
    let (target, filter, count) = (*target, *filter, *count);
    let mut candidates = match world
        .try_entity(target)?
        .get_component::<StatusEffects>()
    {
        Some(container) => container.dispel_candidates(filter),
        None => return Ok(()),
    };
    if filter != DispelFilter::All {
        candidates.truncate(count);
    }
    let name = world.name_of(target);
    for effect in remove_instances(d, world, target, candidates)? {
        d.ui(world, format!("{name}'s {} was dispelled", effect.name));
    }
    Ok(())
}

fn on_update_duration(
    d: &Dispatcher<'_>,
    world: &mut World,
    event: &mut GameEvent,
) -> HandlerResult {
    let GameEvent::UpdateStatusEffectDurationRequest {
        target,
        effect_id,
        delta,
    } = event
    else {
        return Ok(());
    };
    let target = *target;
    let Some(effect) = world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
        .and_then(|container| container.find_mut(effect_id))
    else {
        return Ok(());
    };
    // Permanent effects have nothing to extend.
    let Some(duration) = effect.duration.as_mut() else {
        tracing::trace!(%effect_id, "duration update ignored on permanent effect");
        return Ok(());
    };
    *duration += *delta;
    let updated = *duration;

    let name = world.name_of(target);
    d.log(
        world,
        LogTag::Status,
        format!("[{name}] {effect_id} now lasts {updated} round(s)"),
    );
    Ok(())
}

fn on_amplify(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::AmplifyPoisonRequest { target, stacks, .. } = event else {
        return Ok(());
    };
    poison::amplify(d, world, *target, *stacks)
}

fn on_detonate(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::DetonatePoisonRequest {
        target,
        caster,
        multiplier,
        source_name,
    } = event
    else {
        return Ok(());
    };
    poison::detonate(d, world, *target, *caster, *multiplier, source_name)
}

fn on_reduce_debuffs(
    d: &Dispatcher<'_>,
    world: &mut World,
    event: &mut GameEvent,
) -> HandlerResult {
    let GameEvent::ReduceDebuffsRequest {
        target,
        stacks,
        rounds,
    } = event
    else {
        return Ok(());
    };
    let (target, stacks, rounds) = (*target, *stacks, *rounds);
    let Some(container) = world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
    else {
        return Ok(());
    };

    let mut spent = Vec::new();
    let mut reduced = 0;
    for effect in container.iter_mut().filter(|effect| effect.is_debuff()) {
        reduced += 1;
        effect.stack_count = effect.stack_count.saturating_sub(stacks);
        if let Some(duration) = effect.duration.as_mut() {
            *duration -= rounds;
        }
        if effect.stack_count == 0 || effect.is_expired() {
            spent.push(effect.instance);
        }
    }

    let removed = remove_instances(d, world, target, spent)?;
    if reduced > 0 {
        let name = world.name_of(target);
        d.log(
            world,
            LogTag::Status,
            format!(
                "[{name}] {reduced} debuff(s) weakened, {} cleansed",
                removed.len()
            ),
        );
    }
    Ok(())
}

fn on_stat_query(_: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::StatQuery(query) = event else {
        return Ok(());
    };
    if let Some(container) = world
        .entity(query.entity)
        .and_then(|entity| entity.get_component::<StatusEffects>())
    {
        for effect in container.iter() {
            effect.logic.on_stat_query(query);
        }
    }
    Ok(())
}

fn on_round_start(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::RoundStart { round } = event else {
        return Ok(());
    };
    let round = *round;
    d.log(world, LogTag::Status, format!("--- round {round}: status effects ---"));

    for entity in world.living_ids() {
        if let Err(error) = tick_entity(d, world, entity) {
            tracing::warn!(entity = %entity, "status tick failed: {error}");
        }
    }

    d.emit(world, GameEvent::StatusEffectsResolved { round });
    Ok(())
}

fn tick_entity(d: &Dispatcher<'_>, world: &mut World, entity: EntityId) -> HandlerResult {
    poison::tick(d, world, entity)?;

    let ticking: Vec<StatusEffect> = match world
        .try_entity(entity)?
        .get_component::<StatusEffects>()
    {
        Some(container) => container.iter().filter(|e| !e.is_poison()).cloned().collect(),
        None => return Ok(()),
    };

    for effect in &ticking {
        effect.logic.on_tick(effect, entity, d, world);
        let duration = world
            .entity_mut(entity)
            .and_then(|e| e.get_component_mut::<StatusEffects>())
            .and_then(|container| container.find_instance_mut(effect.instance))
            .and_then(|current| current.duration.as_mut());
        if let Some(duration) = duration {
            *duration -= 1;
        }
    }

    let expired: Vec<u64> = match world
        .entity(entity)
        .and_then(|e| e.get_component::<StatusEffects>())
    {
        Some(container) => container
            .iter()
            .filter(|e| !e.is_poison() && e.is_expired())
            .map(|e| e.instance)
            .collect(),
        None => Vec::new(),
    };
    let name = world.name_of(entity);
    for effect in remove_instances(d, world, entity, expired)? {
        d.log(world, LogTag::Status, format!("[{name}] {} expired", effect.name));
        d.ui(world, format!("{name}'s {} wore off", effect.name));
    }
    Ok(())
}

/// Removes the given instances, running `on_remove` for each, and returns them.
fn remove_instances(
    d: &Dispatcher<'_>,
    world: &mut World,
    target: EntityId,
    instances: Vec<u64>,
) -> Result<Vec<StatusEffect>, CombatError> {
    let removed: Vec<StatusEffect> = match world
        .try_entity_mut(target)?
        .get_component_mut::<StatusEffects>()
    {
        Some(container) => instances
            .into_iter()
            .filter_map(|instance| container.remove_instance(instance))
            .collect(),
        None => Vec::new(),
    };
    for effect in &removed {
        effect.logic.on_remove(effect, target, d, world);
    }
    Ok(removed)
}
