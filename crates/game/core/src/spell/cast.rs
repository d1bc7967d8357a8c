use crate::error::{CombatError, DataKind};
use crate::event::{
    ChangeMode, Dispatcher, EffectResolution, EventBus, EventKind, GameEvent, HandlerResult, LogTag,
};
use crate::resources::try_pay;
use crate::state::{ResourceKind, UltimateCharge, World};

use super::effects::{EffectSource, apply_effects};
use super::interaction::run_on_cast;
use super::reject;

/// Handles `CastSpellRequest`: cost, interactions, effects, summary, turn end.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpellCastSystem;

impl SpellCastSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::CastSpellRequest, "spell.cast", on_cast);
    }
}

fn on_cast(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::CastSpellRequest {
        caster,
        target,
        spell_id,
    } = event
    else {
        return Ok(());
    };
    let (caster, target, spell_id) = (*caster, *target, spell_id.clone());

    let lookup = d.env().content().and_then(|content| {
        content
            .spell(&spell_id)
            .ok_or_else(|| CombatError::missing(DataKind::Spell, spell_id.as_str()))
    });
    let spell = match lookup {
        Ok(spell) => spell,
        Err(error) => {
            reject(d, world, caster, error.to_string());
            return Err(error);
        }
    };
    if !world.is_alive(caster) {
        tracing::debug!(caster = %caster, spell = %spell_id, "dead caster cannot cast");
        return Ok(());
    }

    let (caster_name, target_name) = (world.name_of(caster), world.name_of(target));
    d.log(
        world,
        LogTag::Spell,
        format!("{caster_name} casts {} on {target_name}", spell.name),
    );

    let cost = &spell.cost;
    if !try_pay(d, world, caster, cost.resource, cost.amount) {
        reject(d, world, caster, format!("not enough {}", cost.resource));
        return Ok(());
    }
    tracing::debug!(caster = %caster, spell = %spell_id, "spell cast");

    run_on_cast(d, world, caster, target, &spell_id, &spell);

    let source = EffectSource::spell(&spell_id, &spell);
    let mut summary = EffectResolution::new(Some(caster), target, spell.name.clone());
    summary.source_spell = Some(spell_id.clone());
    apply_effects(d, world, &source, caster, target, &spell.effects, &mut summary);

    let charges_ultimate = world
        .entity(caster)
        .is_some_and(|entity| entity.has_component::<UltimateCharge>());
    if spell.ultimate_charge > 0.0 && charges_ultimate {
        d.emit(
            world,
            GameEvent::ResourceChangeRequest {
                target: caster,
                resource: ResourceKind::UltimateCharge,
                amount: spell.ultimate_charge,
                mode: ChangeMode::Restore,
            },
        );
    }

    summary.passive_triggers.extend(world.take_passive_triggers());
    summary.finalize();
    if summary.no_effect_produced() {
        d.log(
            world,
            LogTag::Spell,
            format!("{} produced no effect", spell.name),
        );
    }
    d.emit(world, GameEvent::EffectResolutionComplete(summary));
    d.emit(world, GameEvent::ActionTaken { actor: caster });
    Ok(())
}
