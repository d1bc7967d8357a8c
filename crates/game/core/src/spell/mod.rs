//! Spell casting, item use, and the effect handlers they share.
//!
//! A cast pays its cost, runs its `on_cast` interactions, then applies each
//! [`SpellEffect`](crate::env::SpellEffect) in order by turning it into bus
//! requests. Damage and heals are resolved by
//! [`CombatResolution`](crate::combat::CombatResolution), which reports each hit
//! separately; the cast's own summary covers shields, applied effects and
//! passive triggers.

mod cast;
mod effects;
mod interaction;
mod items;

pub use cast::SpellCastSystem;
pub use effects::{EffectSource, apply_effects};
pub use interaction::{InteractionSystem, render_message};
pub use items::ItemSystem;

use crate::event::{Dispatcher, GameEvent, LogTag};
use crate::state::{EntityId, World};

/// Tells the actor (and the scheduler) the action did not go through.
fn reject(d: &Dispatcher<'_>, world: &mut World, actor: EntityId, reason: String) {
    let name = world.name_of(actor);
    d.log(world, LogTag::Spell, format!("{name}'s action failed: {reason}"));
    d.ui(world, format!("{name}: {reason}"));
    d.emit(world, GameEvent::ActionRejected { actor, reason });
}
