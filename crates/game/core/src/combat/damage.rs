//! Damage processors.
//!
//! Pre-application: crit, shield, resistance. Post-application: lifesteal,
//! thorns, counter-strike, attack-triggered passives. Post stages only ever
//! dispatch new requests; they never touch health directly.

use crate::config::GameConfig;
use crate::env::RollContext;
use crate::event::{DamageRequest, Dispatcher, GameEvent, HealRequest, LogTag, Provenance};
use crate::state::{
    AttackTriggerPassive, CounterStrike, DamageType, EntityId, Equipment, PassiveEffect,
    Resistance, Shield, Thorns, TriggerCondition, Wear, World,
};
use crate::status::create_effect;

use super::context::EffectContext;
use super::pipeline::{Pipeline, Processor};

pub fn pre_damage_pipeline() -> Pipeline {
    Pipeline::new("damage")
        .with(CritProcessor)
        .with(ShieldProcessor)
        .with(ResistanceProcessor)
}

pub fn post_damage_pipeline() -> Pipeline {
    Pipeline::new("post_damage")
        .with(LifestealProcessor)
        .with(ThornsProcessor)
        .with(CounterStrikeProcessor)
        .with(AttackPassiveProcessor)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CritProcessor;

impl Processor for CritProcessor {
    fn name(&self) -> &'static str {
        "crit"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if !ctx.meta.can_crit {
            return;
        }
        let roller = ctx.source.unwrap_or(ctx.target);
        let roll = d.env().roll(world, roller, RollContext::Crit);
        let threshold = ctx.meta.crit_chance;
        let hit = roll < threshold;
        tracing::debug!(roll, threshold, hit, "crit roll");
        d.log(
            world,
            LogTag::Combat,
            format!("crit roll {roll:.3} vs {threshold:.3}"),
        );
        if !hit {
            return;
        }

        let before = ctx.current_value;
        ctx.current_value *= ctx.meta.crit_multiplier;
        ctx.outcome.crit = true;
        let who = world.name_of(roller);
        d.log(
            world,
            LogTag::Combat,
            format!(
                "{who} lands a critical hit: {before:.1} -> {:.1} (x{:.2})",
                ctx.current_value, ctx.meta.crit_multiplier
            ),
        );
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShieldProcessor;

impl Processor for ShieldProcessor {
    fn name(&self) -> &'static str {
        "shield"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if ctx.current_value <= 0.0 {
            return;
        }
        let Some(shield) = world
            .entity_mut(ctx.target)
            .and_then(|entity| entity.get_component_mut::<Shield>())
        else {
            return;
        };
        if shield.value <= 0.0 {
            return;
        }

        let blocked = ctx.current_value.min(shield.value);
        shield.value -= blocked;
        let remaining = shield.value;
        ctx.current_value -= blocked;
        ctx.outcome.shield_absorbed += blocked;

        let name = world.name_of(ctx.target);
        d.log(
            world,
            LogTag::Combat,
            format!("{name}'s shield absorbs {blocked:.1}, {remaining:.1} left"),
        );
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ResistanceProcessor;

impl Processor for ResistanceProcessor {
    fn name(&self) -> &'static str {
        "resistance"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        let damage_type = ctx.meta.damage_type;
        if !damage_type.is_resistible() || ctx.current_value <= 0.0 {
            return;
        }
        let Some(target) = world.entity(ctx.target) else {
            return;
        };
        let factor: f64 = target
            .get_components::<Resistance>()
            .into_iter()
            .filter(|resistance| resistance.damage_type == damage_type)
            .map(Resistance::factor)
            .product();
        if factor >= 1.0 {
            return;
        }

        let before = ctx.current_value;
        ctx.current_value *= factor;
        let reduced = before - ctx.current_value;
        ctx.outcome.resisted += reduced;

        if reduced > GameConfig::RESISTANCE_REPORT_EPSILON {
            let name = world.name_of(ctx.target);
            d.log(
                world,
                LogTag::Combat,
                format!(
                    "{name} resists {reduced:.1} {damage_type} damage: {before:.1} -> {:.1}",
                    ctx.current_value
                ),
            );
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LifestealProcessor;

impl Processor for LifestealProcessor {
    fn name(&self) -> &'static str {
        "lifesteal"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        let ratio = ctx.meta.lifesteal_ratio;
        let Some(attacker) = ctx.source else {
            return;
        };
        if ratio <= 0.0 || ctx.current_value <= 0.0 {
            return;
        }
        let amount = ctx.current_value * ratio;
        let heal = HealRequest::new(Some(attacker), attacker, "Lifesteal", amount)
            .unmodifiable()
            .with_provenance(Provenance::Passive);
        d.emit(world, GameEvent::HealRequest(heal));

        let name = world.name_of(attacker);
        d.log(
            world,
            LogTag::Combat,
            format!("{name} drains {amount:.1} health"),
        );
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThornsProcessor;

impl Processor for ThornsProcessor {
    fn name(&self) -> &'static str {
        "thorns"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if !ctx.meta.provenance.can_provoke_reflection()
            || !ctx.meta.can_be_reflected
            || ctx.current_value <= 0.0
        {
            return;
        }
        let Some(attacker) = ctx.source.filter(|attacker| *attacker != ctx.target) else {
            return;
        };
        let Some(percentage) = world
            .entity(ctx.target)
            .and_then(|entity| entity.get_component::<Thorns>())
            .map(|thorns| thorns.percentage)
            .filter(|percentage| *percentage > 0.0)
        else {
            return;
        };

        let amount = ctx.current_value * percentage;
        let (owner, victim) = (world.name_of(ctx.target), world.name_of(attacker));
        d.log(
            world,
            LogTag::Passive,
            format!("{owner}'s thorns reflect {amount:.1} to {victim}"),
        );
        let reflected = DamageRequest::new(Some(ctx.target), attacker, "Thorns", amount)
            .with_type(DamageType::Pure)
            .with_provenance(Provenance::Reflected);
        d.emit(world, GameEvent::DamageRequest(reflected));
    }
}

/// Fixed retaliation on every non-reflected hit, even one the shield fully absorbed.
#[derive(Clone, Copy, Debug, Default)]
pub struct CounterStrikeProcessor;

impl Processor for CounterStrikeProcessor {
    fn name(&self) -> &'static str {
        "counter_strike"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if !ctx.meta.provenance.can_provoke_reflection() {
            return;
        }
        let Some(attacker) = ctx.source.filter(|attacker| *attacker != ctx.target) else {
            return;
        };
        let Some(counter) = world
            .entity(ctx.target)
            .and_then(|entity| entity.get_component::<CounterStrike>())
            .cloned()
        else {
            return;
        };

        if counter.damage > 0.0 {
            let owner = world.name_of(ctx.target);
            d.log(
                world,
                LogTag::Passive,
                format!("{owner} counter-strikes for {:.1}", counter.damage),
            );
            let strike =
                DamageRequest::new(Some(ctx.target), attacker, "Counter Strike", counter.damage)
                    .with_provenance(Provenance::Reflected);
            d.emit(world, GameEvent::DamageRequest(strike));
        }

        let wear = world
            .entity_mut(attacker)
            .and_then(|entity| entity.get_component_mut::<Equipment>())
            .map(|equipment| equipment.wear_main_hand(counter.durability_loss));
        match wear {
            Some(Wear::Broken { name }) => {
                let victim = world.name_of(attacker);
                d.log(world, LogTag::Combat, format!("{victim}'s {name} breaks"));
                d.ui(world, format!("{victim}'s {name} broke and was unequipped"));
            }
            Some(Wear::Worn { name, remaining }) => {
                tracing::debug!(weapon = %name, remaining, "weapon worn by counter-strike");
            }
            Some(Wear::Unarmed) | None => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AttackPassiveProcessor;

impl Processor for AttackPassiveProcessor {
    fn name(&self) -> &'static str {
        "attack_passives"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if !ctx.meta.provenance.can_trigger_passives() || !ctx.meta.trigger_on_attack {
            return;
        }
        let Some(attacker) = ctx.source else {
            return;
        };
        let passives: Vec<AttackTriggerPassive> = world
            .entity(attacker)
            .map(|entity| {
                entity
                    .get_components::<AttackTriggerPassive>()
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for passive in passives {
            let roll = d.env().roll(world, attacker, RollContext::PassiveTrigger);
            if roll >= passive.trigger_chance {
                continue;
            }
            let condition_met = match passive.condition {
                TriggerCondition::Always | TriggerCondition::OnHit => true,
                TriggerCondition::OnDamage => ctx.initial_value > 0.0,
            };
            if !condition_met {
                continue;
            }
            if fire(ctx, d, world, attacker, &passive) {
                let who = world.name_of(attacker);
                d.log(
                    world,
                    LogTag::Passive,
                    format!("{who}'s [{}] triggers", passive.name),
                );
                world.push_passive_trigger(passive.name.clone());
            }
        }
    }
}

/// Dispatches the passive's payload. Returns false if nothing was sent.
fn fire(
    ctx: &EffectContext,
    d: &Dispatcher<'_>,
    world: &mut World,
    attacker: EntityId,
    passive: &AttackTriggerPassive,
) -> bool {
    match &passive.effect {
        PassiveEffect::ExtraDamage {
            amount,
            damage_type,
        } => {
            let value = amount.resolve(ctx.current_value);
            if value <= 0.0 {
                return false;
            }
            let request =
                DamageRequest::new(Some(attacker), ctx.target, passive.name.clone(), value)
                    .with_type(*damage_type)
                    .with_provenance(Provenance::Passive);
            d.emit(world, GameEvent::DamageRequest(request));
            true
        }
        PassiveEffect::ExtraHeal { amount } => {
            let value = amount.resolve(ctx.current_value);
            if value <= 0.0 {
                return false;
            }
            let request = HealRequest::new(Some(attacker), attacker, passive.name.clone(), value)
                .with_provenance(Provenance::Passive);
            d.emit(world, GameEvent::HealRequest(request));
            true
        }
        PassiveEffect::ApplyStatus { effect_id } => {
            let effect = d
                .env()
                .content()
                .and_then(|content| create_effect(content, effect_id, Some(attacker)));
            match effect {
                Ok(effect) => {
                    d.emit(world, GameEvent::apply_status(ctx.target, effect));
                    true
                }
                Err(error) => {
                    tracing::warn!(passive = %passive.name, "passive effect skipped: {error}");
                    false
                }
            }
        }
    }
}
