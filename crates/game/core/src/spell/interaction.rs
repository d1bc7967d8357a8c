//! Spell rules keyed on a status effect the target already carries.

use crate::env::{Interaction, InteractionAction, InteractionTrigger, SpellDefinition};
use crate::event::{
    DamageRequest, Dispatcher, EventBus, EventKind, GameEvent, HandlerResult, Provenance,
};
use crate::state::{EntityId, World};
use crate::status::{StatusEffect, StatusEffects, create_effect};

/// Runs `on_damage_deal` rules against direct hits before they are resolved.
///
/// `on_cast` rules are run by the spell cast itself, after the cost is paid.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionSystem;

impl InteractionSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::DamageRequest, "interaction.damage", on_damage_deal);
    }
}

struct RuleScope<'s> {
    caster: EntityId,
    target: EntityId,
    spell_id: &'s str,
    spell_name: &'s str,
}

fn on_damage_deal(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::DamageRequest(request) = event else {
        return Ok(());
    };
    if request.provenance != Provenance::Direct {
        return Ok(());
    }
    let (Some(caster), Some(spell_id)) = (request.caster, request.source_spell.clone()) else {
        return Ok(());
    };
    let Some(spell) = d
        .env()
        .content()
        .ok()
        .and_then(|content| content.spell(&spell_id))
    else {
        return Ok(());
    };

    let scope = RuleScope {
        caster,
        target: request.target,
        spell_id: &spell_id,
        spell_name: &spell.name,
    };
    for rule in rules(&spell, InteractionTrigger::OnDamageDeal) {
        if let Some(matched) = find_effect(world, scope.target, &rule.target_has_effect) {
            execute(d, world, rule, &scope, &matched, Some(&mut *request));
        }
    }
    Ok(())
}

/// Runs the spell's `on_cast` rules against the target.
pub(super) fn run_on_cast(
    d: &Dispatcher<'_>,
    world: &mut World,
    caster: EntityId,
    target: EntityId,
    spell_id: &str,
    spell: &SpellDefinition,
) {
    let scope = RuleScope {
        caster,
        target,
        spell_id,
        spell_name: &spell.name,
    };
    for rule in rules(spell, InteractionTrigger::OnCast) {
        if let Some(matched) = find_effect(world, target, &rule.target_has_effect) {
            execute(d, world, rule, &scope, &matched, None);
        }
    }
}

fn rules(
    spell: &SpellDefinition,
    trigger: InteractionTrigger,
) -> impl Iterator<Item = &Interaction> {
    spell
        .interactions
        .iter()
        .filter(move |rule| rule.trigger == trigger)
}

fn find_effect(world: &World, target: EntityId, effect_id: &str) -> Option<StatusEffect> {
    world
        .entity(target)?
        .get_component::<StatusEffects>()?
        .find(effect_id)
        .cloned()
}

fn execute(
    d: &Dispatcher<'_>,
    world: &mut World,
    rule: &Interaction,
    scope: &RuleScope<'_>,
    matched: &StatusEffect,
    pending: Option<&mut DamageRequest>,
) {
    let mut damage = 0.0;
    match &rule.action {
        InteractionAction::ConsumeAndDamage { damage_type } => {
            let remaining = f64::from(matched.duration.unwrap_or(0).max(0));
            damage = matched.tick_damage() * remaining;
            if damage > 0.0 {
                let mut burst =
                    DamageRequest::new(Some(scope.caster), scope.target, scope.spell_name, damage)
                        .with_type(*damage_type)
                        .with_provenance(Provenance::Passive);
                burst.source_spell = Some(scope.spell_id.to_owned());
                d.emit(world, GameEvent::DamageRequest(burst));
            }
            d.emit(
                world,
                GameEvent::RemoveStatusEffectRequest {
                    target: scope.target,
                    effect_id: matched.id.clone(),
                },
            );
        }
        InteractionAction::Extinguish {
            damage_multiplier,
            remove_effect,
            apply_effect,
        } => {
            if let Some(request) = pending {
                request.base_damage *= damage_multiplier;
                damage = request.base_damage;
            }
            if let Some(effect_id) = remove_effect {
                d.emit(
                    world,
                    GameEvent::RemoveStatusEffectRequest {
                        target: scope.target,
                        effect_id: effect_id.clone(),
                    },
                );
            }
            if let Some(effect_id) = apply_effect {
                let created = d
                    .env()
                    .content()
                    .and_then(|content| create_effect(content, effect_id, Some(scope.caster)));
                match created {
                    Ok(effect) => d.emit(world, GameEvent::apply_status(scope.target, effect)),
                    Err(error) => {
                        tracing::warn!(effect = %effect_id, "interaction effect skipped: {error}");
                    }
                }
            }
        }
        InteractionAction::ExtendDuration { rounds } => {
            d.emit(
                world,
                GameEvent::UpdateStatusEffectDurationRequest {
                    target: scope.target,
                    effect_id: matched.id.clone(),
                    delta: *rounds,
                },
            );
        }
    }

    tracing::debug!(
        spell = scope.spell_id,
        effect = %matched.id,
        trigger = %rule.trigger,
        "interaction fired"
    );
    if let Some(template) = &rule.message {
        let caster = world.name_of(scope.caster);
        let target = world.name_of(scope.target);
        let message = render_message(template, &caster, &target, scope.spell_name, damage);
        d.ui(world, message);
    }
}

/// Fills `{caster}`, `{target}`, `{spell}` and `{damage}` in an interaction message.
pub fn render_message(template: &str, caster: &str, target: &str, spell: &str, damage: f64) -> String {
    template
        .replace("{caster}", caster)
        .replace("{target}", target)
        .replace("{spell}", spell)
        .replace("{damage}", &format!("{damage:.0}"))
}
