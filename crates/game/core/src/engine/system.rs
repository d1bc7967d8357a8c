//! Systems that run once per world tick.
//!
//! Most behavior is event-driven and lives in bus handlers. A [`System`] is the
//! small remainder that has to poll: the turn scheduler asking who acts next and
//! the battle-end check.

use crate::event::{Dispatcher, HandlerResult};
use crate::state::World;

/// A per-tick update step.
///
/// Systems are executed in priority order (lower priority values execute first).
pub trait System {
    fn name(&self) -> &'static str;

    /// Returns the priority of this system. Lower values execute first.
    /// Default priority is 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Advances the system by one tick.
    fn update(&self, d: &Dispatcher<'_>, world: &mut World) -> HandlerResult;
}

/// Sorts systems by priority, keeping insertion order for equal priorities.
pub(crate) fn sort_by_priority(systems: &mut [Box<dyn System>]) {
    systems.sort_by_key(|system| system.priority());
}
