use crate::config::GameConfig;
use crate::env::{ItemDefinition, SpellDefinition, SpellEffect};
use crate::event::{DamageRequest, Dispatcher, EffectResolution, GameEvent, HealRequest};
use crate::state::{Crit, EntityId, ResourceKind, Shield, StatKind, World};
use crate::status::{StatusEffects, create_effect, query_stat};

/// Where a batch of effects comes from, and which escalations its hits allow.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSource {
    pub name: String,
    /// Set for spells; interactions and hit summaries key on it.
    pub spell_id: Option<String>,
    pub can_crit: bool,
    pub can_be_reflected: bool,
    pub trigger_on_attack: bool,
}

impl EffectSource {
    pub fn spell(id: &str, spell: &SpellDefinition) -> Self {
        Self {
            name: spell.name.clone(),
            spell_id: Some(id.to_owned()),
            can_crit: spell.can_crit,
            can_be_reflected: spell.can_be_reflected,
            trigger_on_attack: spell.trigger_on_attack,
        }
    }

    /// Items never crit and never fire attack passives.
    pub fn item(item: &ItemDefinition) -> Self {
        Self {
            name: item.name.clone(),
            spell_id: None,
            can_crit: false,
            can_be_reflected: true,
            trigger_on_attack: false,
        }
    }
}

/// Applies `effects` in order from `caster` to `target`, recording what the
/// cast itself produced in `summary`.
///
/// Effects on a dead target are skipped. An effect whose data is missing is
/// logged and skipped; the rest still apply.
pub fn apply_effects(
    d: &Dispatcher<'_>,
    world: &mut World,
    source: &EffectSource,
    caster: EntityId,
    target: EntityId,
    effects: &[SpellEffect],
    summary: &mut EffectResolution,
) {
    for effect in effects {
        if !world.is_alive(target) {
            tracing::debug!(target_id = %target, "effect skipped, target is dead");
            continue;
        }
        apply_effect(d, world, source, caster, target, effect, summary);
    }
}

fn apply_effect(
    d: &Dispatcher<'_>,
    world: &mut World,
    source: &EffectSource,
    caster: EntityId,
    target: EntityId,
    effect: &SpellEffect,
    summary: &mut EffectResolution,
) {
    match effect {
        SpellEffect::Damage {
            amount,
            damage_type,
            lifesteal_ratio,
        } => {
            let base = query_stat(d, world, caster, StatKind::DamageDealt, *amount);
            let mut request = DamageRequest::new(Some(caster), target, source.name.clone(), base)
                .with_type(*damage_type)
                .with_lifesteal(*lifesteal_ratio);
            request.source_spell = source.spell_id.clone();
            request.trigger_on_attack = source.trigger_on_attack;
            if source.can_crit {
                let (chance, multiplier) = crit_profile(d, world, caster);
                request = request.with_crit(chance, multiplier);
            }
            if !source.can_be_reflected {
                request = request.unreflectable();
            }
            d.emit(world, GameEvent::DamageRequest(request));
            summary.mark_produced();
        }
        SpellEffect::Heal {
            amount,
            overheal_to_shield,
        } => {
            let base = query_stat(d, world, caster, StatKind::HealingDone, *amount);
            let mut request = HealRequest::new(Some(caster), target, source.name.clone(), base)
                .with_overheal_to_shield(*overheal_to_shield);
            request.source_spell = source.spell_id.clone();
            d.emit(world, GameEvent::HealRequest(request));
            summary.mark_produced();
        }
        SpellEffect::ApplyStatusEffect {
            effect_id,
            poison_number,
        } => {
            let created = d
                .env()
                .content()
                .and_then(|content| create_effect(content, effect_id, Some(caster)));
            match created {
                Ok(mut status) => {
                    if let Some(count) = poison_number {
                        status.poison_number = *count;
                    }
                    summary.applied_effects.push(status.name.clone());
                    d.emit(world, GameEvent::apply_status(target, status));
                }
                Err(error) => {
                    tracing::warn!(effect = %effect_id, "status effect skipped: {error}");
                }
            }
        }
        SpellEffect::AddShield { amount } => {
            let before = shield_of(world, target);
            d.emit(
                world,
                GameEvent::GainShieldRequest {
                    target,
                    source: source.name.clone(),
                    amount: *amount,
                },
            );
            let after = shield_of(world, target);
            if after > before {
                summary.record(ResourceKind::Shield, after - before, after, None);
            }
        }
        SpellEffect::Dispel { category, count } => {
            let before = effect_count(world, target);
            d.emit(
                world,
                GameEvent::DispelRequest {
                    target,
                    filter: *category,
                    count: *count,
                },
            );
            if effect_count(world, target) < before {
                summary.mark_produced();
            }
        }
        SpellEffect::AmplifyPoison { stacks } => {
            if poison_count(world, target) > 0 {
                summary.mark_produced();
            }
            d.emit(
                world,
                GameEvent::AmplifyPoisonRequest {
                    target,
                    caster: Some(caster),
                    stacks: *stacks,
                },
            );
        }
        SpellEffect::DetonatePoison { multiplier } => {
            if poison_count(world, target) > 0 {
                summary.mark_produced();
            }
            d.emit(
                world,
                GameEvent::DetonatePoisonRequest {
                    target,
                    caster: Some(caster),
                    multiplier: *multiplier,
                    source_name: source.name.clone(),
                },
            );
        }
        SpellEffect::ReduceDebuffs { stacks, rounds } => {
            if debuff_count(world, target) > 0 {
                summary.mark_produced();
            }
            d.emit(
                world,
                GameEvent::ReduceDebuffsRequest {
                    target,
                    stacks: *stacks,
                    rounds: *rounds,
                },
            );
        }
        SpellEffect::Multi(inner) => {
            apply_effects(d, world, source, caster, target, inner, summary);
        }
    }
}

/// Crit chance (after stat queries) and multiplier of the caster.
fn crit_profile(d: &Dispatcher<'_>, world: &mut World, caster: EntityId) -> (f64, f64) {
    let Some(crit) = world
        .entity(caster)
        .and_then(|entity| entity.get_component::<Crit>())
        .cloned()
    else {
        return (0.0, GameConfig::DEFAULT_CRIT_MULTIPLIER);
    };
    let chance = query_stat(d, world, caster, StatKind::CritChance, crit.chance);
    (chance.clamp(0.0, 1.0), crit.multiplier)
}

fn shield_of(world: &World, target: EntityId) -> f64 {
    world
        .entity(target)
        .and_then(|entity| entity.get_component::<Shield>())
        .map_or(0.0, |shield| shield.value)
}

fn effect_count(world: &World, target: EntityId) -> usize {
    world
        .entity(target)
        .and_then(|entity| entity.get_component::<StatusEffects>())
        .map_or(0, StatusEffects::len)
}

fn poison_count(world: &World, target: EntityId) -> usize {
    world
        .entity(target)
        .and_then(|entity| entity.get_component::<StatusEffects>())
        .map_or(0, StatusEffects::poison_count)
}

fn debuff_count(world: &World, target: EntityId) -> usize {
    world
        .entity(target)
        .and_then(|entity| entity.get_component::<StatusEffects>())
        .map_or(0, |effects| effects.iter().filter(|effect| effect.is_debuff()).count())
}
