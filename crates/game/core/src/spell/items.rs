use crate::error::{CombatError, DataKind};
use crate::event::{
    Dispatcher, EffectResolution, EventBus, EventKind, GameEvent, HandlerResult, LogTag,
};
use crate::state::{Inventory, World};

use super::effects::{EffectSource, apply_effects};
use super::reject;

/// Handles `UseItemRequest`: one charge from the inventory, then the item's
/// effects exactly as a spell would apply them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemSystem;

impl ItemSystem {
    pub fn subscribe(bus: &mut EventBus) {
        bus.subscribe_named(EventKind::UseItemRequest, "spell.use_item", on_use_item);
    }
}

fn on_use_item(d: &Dispatcher<'_>, world: &mut World, event: &mut GameEvent) -> HandlerResult {
    let GameEvent::UseItemRequest {
        user,
        target,
        item_id,
    } = event
    else {
        return Ok(());
    };
    let (user, target, item_id) = (*user, *target, item_id.clone());

    let lookup = d.env().content().and_then(|content| {
        content
            .item(&item_id)
            .ok_or_else(|| CombatError::missing(DataKind::Item, item_id.as_str()))
    });
    let item = match lookup {
        Ok(item) => item,
        Err(error) => {
            reject(d, world, user, error.to_string());
            return Err(error);
        }
    };

    let consumed = world
        .try_entity_mut(user)?
        .get_component_mut::<Inventory>()
        .is_some_and(|inventory| inventory.consume(&item_id));
    if !consumed {
        reject(d, world, user, format!("no {} left", item.name));
        return Ok(());
    }

    let (user_name, target_name) = (world.name_of(user), world.name_of(target));
    d.log(
        world,
        LogTag::Item,
        format!("{user_name} uses {} on {target_name}", item.name),
    );

    let source = EffectSource::item(&item);
    let mut summary = EffectResolution::new(Some(user), target, item.name.clone());
    apply_effects(d, world, &source, user, target, &item.effects, &mut summary);
    summary.passive_triggers.extend(world.take_passive_triggers());
    summary.finalize();
    d.emit(world, GameEvent::EffectResolutionComplete(summary));
    d.emit(world, GameEvent::ActionTaken { actor: user });
    Ok(())
}
