//! Text feed of a running match.
//!
//! The feed listens on the bus like any other system and turns log requests,
//! UI messages, resolution summaries and the final result into lines for a sink.

use std::rc::Rc;

use game_core::event::ResolutionFlags;
use game_core::{EffectResolution, EventBus, EventKind, GameEvent, World};

/// Subscribes the feed handlers. Every rendered line goes to `sink`.
pub fn install(bus: &mut EventBus, sink: impl Fn(String) + 'static) {
    let sink: Rc<dyn Fn(String)> = Rc::new(sink);

    let out = Rc::clone(&sink);
    bus.subscribe_named(EventKind::LogRequest, "feed.log", move |_, _, event| {
        if let GameEvent::LogRequest { tag, message } = event {
            out(format!("[{tag}] {message}"));
        }
        Ok(())
    });

    let out = Rc::clone(&sink);
    bus.subscribe_named(EventKind::UiMessage, "feed.ui", move |_, _, event| {
        if let GameEvent::UiMessage { message } = event {
            out(format!(">> {message}"));
        }
        Ok(())
    });

    let out = Rc::clone(&sink);
    bus.subscribe_named(
        EventKind::EffectResolutionComplete,
        "feed.resolution",
        move |_, world, event| {
            if let GameEvent::EffectResolutionComplete(resolution) = event {
                out(format!("   {}", describe_resolution(world, resolution)));
            }
            Ok(())
        },
    );

    bus.subscribe_named(EventKind::MatchEnded, "feed.result", move |_, _, event| {
        if let GameEvent::MatchEnded { winner, round } = event {
            let line = match winner {
                Some(team) => format!("== {team} win in round {round} =="),
                None => format!("== no winner after round {round} =="),
            };
            sink(line);
        }
        Ok(())
    });
}

/// One-line summary of a resolved spell, item, hit or heal.
pub fn describe_resolution(world: &World, resolution: &EffectResolution) -> String {
    let target = world.name_of(resolution.target);
    if resolution.no_effect_produced() {
        return format!("{} on {target}: no effect", resolution.source_name);
    }

    let mut parts: Vec<String> = resolution
        .changes
        .iter()
        .map(|change| match change.max {
            Some(max) => format!(
                "{} {:+.0} ({:.0}/{:.0})",
                change.resource, change.delta, change.current, max
            ),
            None => format!("{} {:+.0} ({:.0})", change.resource, change.delta, change.current),
        })
        .collect();
    if resolution.shield_blocked > 0.0 {
        parts.push(format!("shield blocked {:.0}", resolution.shield_blocked));
    }
    if !resolution.applied_effects.is_empty() {
        parts.push(format!("applied {}", resolution.applied_effects.join(", ")));
    }
    if resolution.flags.contains(ResolutionFlags::CRIT) {
        parts.push("critical".to_owned());
    }
    if resolution.flags.contains(ResolutionFlags::OVERHEAL) {
        parts.push("overheal".to_owned());
    }
    parts.extend(resolution.passive_triggers.iter().map(|t| format!("passive: {t}")));

    if parts.is_empty() {
        format!("{} on {target}", resolution.source_name)
    } else {
        format!("{} on {target}: {}", resolution.source_name, parts.join(", "))
    }
}
