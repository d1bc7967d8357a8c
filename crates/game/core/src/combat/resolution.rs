use std::rc::Rc;

use crate::error::CombatError;
use crate::event::{
    Dispatcher, EffectResolution, EventBus, EventKind, GameEvent, HandlerResult, LogTag,
    ResolutionFlags,
};
use crate::state::{ComponentKind, EntityId, Health, HealthChange, ResourceKind, Shield, World};

use super::context::EffectContext;
use super::damage::{post_damage_pipeline, pre_damage_pipeline};
use super::heal::{post_heal_pipeline, pre_heal_pipeline};
use super::pipeline::Pipeline;

/// Turns damage, heal and shield requests into health and shield changes.
///
/// Each damage or heal request runs the pre-application pipeline, writes the
/// result to health, runs the post-application pipeline, and finally emits an
/// [`EffectResolution`] summary.
#[derive(Debug)]
pub struct CombatResolution {
    pre_damage: Pipeline,
    post_damage: Pipeline,
    pre_heal: Pipeline,
    post_heal: Pipeline,
}

impl Default for CombatResolution {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatResolution {
    pub fn new() -> Self {
        Self {
            pre_damage: pre_damage_pipeline(),
            post_damage: post_damage_pipeline(),
            pre_heal: pre_heal_pipeline(),
            post_heal: post_heal_pipeline(),
        }
    }

    pub fn subscribe(self: Rc<Self>, bus: &mut EventBus) {
        let this = Rc::clone(&self);
        bus.subscribe_named(EventKind::DamageRequest, "combat.damage", move |d, world, event| {
            this.on_damage(d, world, event)
        });
        let this = Rc::clone(&self);
        bus.subscribe_named(EventKind::HealRequest, "combat.heal", move |d, world, event| {
            this.on_heal(d, world, event)
        });
        bus.subscribe_named(EventKind::GainShieldRequest, "combat.shield", on_gain_shield);
    }

    fn on_damage(
        &self,
        d: &Dispatcher<'_>,
        world: &mut World,
        event: &mut GameEvent,
    ) -> HandlerResult {
        let GameEvent::DamageRequest(request) = event else {
            return Ok(());
        };
        let target = request.target;
        current_hp(world, target)?;
        if !world.is_alive(target) {
            tracing::trace!(target_id = %target, "damage on dead target ignored");
            return Ok(());
        }

        let mut ctx = EffectContext::from_damage(request);
        let opening = format!(
            "{} -> {}: {} base {:.1} {}",
            source_name(world, ctx.source),
            world.name_of(target),
            ctx.meta.source_name,
            ctx.initial_value,
            ctx.meta.damage_type
        );
        d.log(world, LogTag::Combat, opening);
        self.pre_damage.execute(&mut ctx, d, world);

        ctx.current_value = ctx.current_value.max(0.0);
        let hp = current_hp(world, target)?;
        let change = set_health(d, world, target, hp - ctx.current_value)?;
        ctx.outcome.applied = change.map_or(0.0, |change| -change.delta());
        d.log(
            world,
            LogTag::Combat,
            format!("final damage {:.1}", ctx.current_value),
        );

        ctx.resume();
        self.post_damage.execute(&mut ctx, d, world);

        let mut summary = summarize(world, &ctx);
        if let Some(change) = change {
            summary.record(
                ResourceKind::Health,
                change.delta(),
                change.new_hp,
                Some(change.max_hp),
            );
        }
        if ctx.outcome.shield_absorbed > 0.0 {
            let remaining = shield_of(world, target);
            summary.record(ResourceKind::Shield, -ctx.outcome.shield_absorbed, remaining, None);
        }
        summary.finalize();
        d.emit(world, GameEvent::EffectResolutionComplete(summary));
        Ok(())
    }

    fn on_heal(
        &self,
        d: &Dispatcher<'_>,
        world: &mut World,
        event: &mut GameEvent,
    ) -> HandlerResult {
        let GameEvent::HealRequest(request) = event else {
            return Ok(());
        };
        let target = request.target;
        current_hp(world, target)?;
        if !world.is_alive(target) {
            return Ok(());
        }

        let mut ctx = EffectContext::from_heal(request);
        // Unmodifiable heals (lifesteal) skip heal reduction entirely.
        if ctx.meta.modifiable {
            self.pre_heal.execute(&mut ctx, d, world);
        }

        let heal = ctx.current_value.max(0.0);
        let (hp, missing) = world
            .try_entity(target)?
            .get_component::<Health>()
            .map(|health| (health.hp(), health.missing()))
            .ok_or(CombatError::MissingComponent {
                entity: target,
                component: ComponentKind::Health,
            })?;
        let actual = heal.min(missing);
        ctx.overheal = heal - actual;
        let change = set_health(d, world, target, hp + actual)?;
        ctx.outcome.applied = actual;

        let shield_before = shield_of(world, target);
        let overheal = ctx.overheal;
        ctx.resume();
        self.post_heal.execute(&mut ctx, d, world);

        let mut summary = summarize(world, &ctx);
        if let Some(change) = change {
            summary.record(
                ResourceKind::Health,
                change.delta(),
                change.new_hp,
                Some(change.max_hp),
            );
        }
        if overheal > 0.0 {
            summary.flags |= ResolutionFlags::OVERHEAL;
            let shield_after = shield_of(world, target);
            if shield_after > shield_before {
                summary.record(
                    ResourceKind::Shield,
                    shield_after - shield_before,
                    shield_after,
                    None,
                );
            }
        }
        summary.finalize();
        d.emit(world, GameEvent::EffectResolutionComplete(summary));
        Ok(())
    }
}

fn on_gain_shield(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::GainShieldRequest {
        target,
        source,
        amount,
    } = event
    else {
        return Ok(());
    };
    let (target, amount) = (*target, *amount);
    if amount <= 0.0 || !world.is_alive(target) {
        return Ok(());
    }
    let shield = world
        .try_entity_mut(target)?
        .get_or_insert_with(d.registry(), || Shield::new(0.0));
    shield.add(amount);
    let total = shield.value;

    let name = world.name_of(target);
    d.log(
        world,
        LogTag::Combat,
        format!("{name} gains {amount:.1} shield from {source} ({total:.1} total)"),
    );
    Ok(())
}

fn summarize(world: &mut World, ctx: &EffectContext) -> EffectResolution {
    let mut summary = EffectResolution::new(ctx.source, ctx.target, ctx.meta.source_name.clone());
    summary.source_spell = ctx.meta.source_spell.clone();
    summary.shield_blocked = ctx.outcome.shield_absorbed;
    summary.passive_triggers = world.take_passive_triggers();
    if ctx.outcome.crit {
        summary.flags |= ResolutionFlags::CRIT;
    }
    if ctx.outcome.shield_absorbed > 0.0 {
        summary.mark_produced();
    }
    summary
}

fn current_hp(world: &World, target: EntityId) -> Result<f64, CombatError> {
    world
        .try_entity(target)?
        .get_component::<Health>()
        .map(Health::hp)
        .ok_or(CombatError::MissingComponent {
            entity: target,
            component: ComponentKind::Health,
        })
}

fn shield_of(world: &World, target: EntityId) -> f64 {
    world
        .entity(target)
        .and_then(|entity| entity.get_component::<Shield>())
        .map_or(0.0, |shield| shield.value)
}

fn source_name(world: &World, source: Option<EntityId>) -> String {
    source.map_or_else(|| "environment".to_owned(), |id| world.name_of(id))
}

/// Writes health through the clamp and announces the change.
///
/// Returns the change when the value actually moved.
///
/// # Errors
///
/// Returns `CombatError::MissingComponent` if the entity has no health.
pub fn set_health(
    d: &Dispatcher<'_>,
    world: &mut World,
    entity: EntityId,
    value: f64,
) -> Result<Option<HealthChange>, CombatError> {
    let change = world
        .try_entity_mut(entity)?
        .get_component_mut::<Health>()
        .ok_or(CombatError::MissingComponent {
            entity,
            component: ComponentKind::Health,
        })?
        .set(value);
    let Some(change) = change else {
        return Ok(None);
    };
    d.emit(
        world,
        GameEvent::HealthChanged {
            entity,
            old_hp: change.old_hp,
            new_hp: change.new_hp,
            max_hp: change.max_hp,
        },
    );
    Ok(Some(change))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::combat::{Processor, ShieldProcessor};
    use crate::config::GameConfig;
    use crate::engine::Engine;
    use crate::event::DamageRequest;
    use crate::state::{Component, Thorns};

    struct Cancel;

    impl Processor for Cancel {
        fn name(&self) -> &'static str {
            "cancel"
        }

        fn process(&self, ctx: &mut EffectContext, _: &Dispatcher<'_>, _: &mut World) {
            ctx.cancel();
        }
    }

    fn hp(engine: &Engine, id: EntityId) -> f64 {
        engine
            .world()
            .entity(id)
            .and_then(|entity| entity.get_component::<Health>())
            .map(Health::hp)
            .unwrap()
    }

    fn resolutions(engine: &mut Engine) -> Rc<RefCell<Vec<EffectResolution>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine
            .bus_mut()
            .subscribe(EventKind::EffectResolutionComplete, move |_, _, event| {
                if let GameEvent::EffectResolutionComplete(resolution) = event {
                    sink.borrow_mut().push(resolution.clone());
                }
                Ok(())
            });
        seen
    }

    #[test]
    fn cancelled_mitigation_still_runs_the_post_stages() {
        let mut engine = Engine::new(GameConfig::default());
        let resolution = CombatResolution {
            pre_damage: Pipeline::new("damage").with(Cancel).with(ShieldProcessor),
            ..CombatResolution::new()
        };
        Rc::new(resolution).subscribe(engine.bus_mut());
        let mage = engine.spawn("mage", [Component::from(Health::new(100.0))]);
        let golem = engine.spawn(
            "golem",
            [
                Component::from(Health::new(100.0)),
                Component::from(Shield::new(30.0)),
                Component::from(Thorns { percentage: 0.5 }),
            ],
        );

        engine.dispatch(GameEvent::DamageRequest(DamageRequest::new(
            Some(mage),
            golem,
            "Fire Bolt",
            40.0,
        )));

        assert_eq!(shield_of(engine.world(), golem), 30.0);
        assert_eq!(hp(&engine, golem), 60.0);
        assert_eq!(hp(&engine, mage), 80.0);
    }

    #[test]
    fn damage_summary_records_health_and_shield() {
        let mut engine = Engine::new(GameConfig::default());
        Rc::new(CombatResolution::new()).subscribe(engine.bus_mut());
        let seen = resolutions(&mut engine);
        let golem = engine.spawn(
            "golem",
            [
                Component::from(Health::new(100.0)),
                Component::from(Shield::new(20.0)),
            ],
        );

        engine.dispatch(GameEvent::DamageRequest(DamageRequest::new(None, golem, "Axe", 50.0)));

        let seen = seen.borrow();
        let summary = &seen[0];
        assert_eq!(summary.shield_blocked, 20.0);
        let changes: Vec<(ResourceKind, f64, f64)> = summary
            .changes
            .iter()
            .map(|change| (change.resource, change.delta, change.current))
            .collect();
        assert_eq!(
            changes,
            vec![(ResourceKind::Health, -30.0, 70.0), (ResourceKind::Shield, -20.0, 0.0)]
        );
    }

    #[test]
    fn shield_gains_ignore_non_positive_amounts() {
        let mut engine = Engine::new(GameConfig::default());
        Rc::new(CombatResolution::new()).subscribe(engine.bus_mut());
        let paladin = engine.spawn("paladin", [Component::from(Health::new(100.0))]);
        let gain = |amount| GameEvent::GainShieldRequest {
            target: paladin,
            source: "Barrier".into(),
            amount,
        };

        engine.dispatch(gain(15.0));
        engine.dispatch(gain(-5.0));

        assert_eq!(shield_of(engine.world(), paladin), 15.0);
    }
}
