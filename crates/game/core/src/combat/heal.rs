//! Heal processors.
//!
//! The post-heal stages share one overheal pool: whichever stage converts it
//! first takes all of it, later stages see zero.

use crate::event::{Dispatcher, GameEvent, LogTag};
use crate::state::{EntityId, GrievousWounds, OverhealToShield, World};
use crate::status::StatusEffects;

use super::context::EffectContext;
use super::pipeline::{Pipeline, Processor};

pub fn pre_heal_pipeline() -> Pipeline {
    Pipeline::new("heal").with(GrievousWoundsProcessor)
}

pub fn post_heal_pipeline() -> Pipeline {
    Pipeline::new("post_heal")
        .with(StatusEffectOverhealProcessor)
        .with(SkillOverhealProcessor)
        .with(PassiveOverhealProcessor)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrievousWoundsProcessor;

impl Processor for GrievousWoundsProcessor {
    fn name(&self) -> &'static str {
        "grievous_wounds"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if !ctx.meta.modifiable {
            return;
        }
        let Some(reduction) = world
            .entity(ctx.target)
            .and_then(|entity| entity.get_component::<GrievousWounds>())
            .map(|wounds| wounds.reduction.clamp(0.0, 1.0))
            .filter(|reduction| *reduction > 0.0)
        else {
            return;
        };

        let before = ctx.current_value;
        ctx.current_value *= 1.0 - reduction;
        let name = world.name_of(ctx.target);
        d.log(
            world,
            LogTag::Combat,
            format!(
                "{name}'s wounds cut healing {before:.1} -> {:.1}",
                ctx.current_value
            ),
        );
    }
}

/// Converts the remaining overheal into shield on the healed entity.
fn grant_overheal_shield(
    ctx: &mut EffectContext,
    d: &Dispatcher<'_>,
    world: &mut World,
    source: String,
    ratio: f64,
) {
    let overheal = ctx.take_overheal();
    let shield = overheal * ratio.clamp(0.0, 1.0);
    if shield <= 0.0 {
        return;
    }
    ctx.outcome.shield_from_overheal += shield;
    let target: EntityId = ctx.target;
    let name = world.name_of(target);
    d.ui(
        world,
        format!("{name} turns {overheal:.1} overheal into {shield:.1} shield via [{source}]"),
    );
    d.emit(
        world,
        GameEvent::GainShieldRequest {
            target,
            source,
            amount: shield,
        },
    );
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StatusEffectOverhealProcessor;

impl Processor for StatusEffectOverhealProcessor {
    fn name(&self) -> &'static str {
        "status_overheal"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if ctx.overheal <= 0.0 {
            return;
        }
        let converter = world
            .entity(ctx.target)
            .and_then(|entity| entity.get_component::<StatusEffects>())
            .and_then(|effects| {
                effects.iter().find_map(|effect| {
                    effect
                        .logic
                        .on_heal(ctx.overheal)
                        .map(|shield| (effect.name.clone(), shield / ctx.overheal))
                })
            });
        if let Some((source, ratio)) = converter {
            grant_overheal_shield(ctx, d, world, source, ratio);
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SkillOverhealProcessor;

impl Processor for SkillOverhealProcessor {
    fn name(&self) -> &'static str {
        "skill_overheal"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        let Some(ratio) = ctx.meta.overheal_to_shield.filter(|ratio| *ratio > 0.0) else {
            return;
        };
        if ctx.overheal <= 0.0 {
            return;
        }
        let source = ctx.meta.source_name.clone();
        grant_overheal_shield(ctx, d, world, source, ratio);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveOverhealProcessor;

impl Processor for PassiveOverhealProcessor {
    fn name(&self) -> &'static str {
        "passive_overheal"
    }

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        if ctx.overheal <= 0.0 {
            return;
        }
        let Some(ratio) = world
            .entity(ctx.target)
            .and_then(|entity| entity.get_component::<OverhealToShield>())
            .map(|passive| passive.conversion_ratio)
            .filter(|ratio| *ratio > 0.0)
        else {
            return;
        };
        grant_overheal_shield(ctx, d, world, "Overheal Passive".to_owned(), ratio);
    }
}
