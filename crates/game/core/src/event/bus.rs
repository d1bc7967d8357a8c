use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{EventKind, GameEvent, LogTag};
use crate::config::GameConfig;
use crate::env::Env;
use crate::error::{CombatError, GameError};
use crate::state::{ComponentRegistry, World};

/// Outcome of one handler invocation. Errors are logged by the dispatcher and
/// never reach the code that dispatched the event.
pub type HandlerResult = Result<(), CombatError>;

type Handler = Box<dyn Fn(&Dispatcher<'_>, &mut World, &mut GameEvent) -> HandlerResult>;

struct Subscriber {
    name: &'static str,
    handler: Handler,
}

/// Synchronous publish/subscribe registry.
///
/// Handlers run in registration order, on the dispatching call stack. The bus
/// owns only the handlers; all domain state is passed in as `&mut World`.
#[derive(Default)]
pub struct EventBus {
    subscribers: BTreeMap<EventKind, Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&Dispatcher<'_>, &mut World, &mut GameEvent) -> HandlerResult + 'static,
    {
        self.subscribe_named(kind, "anonymous", handler);
    }

    /// Same as [`EventBus::subscribe`]; `name` shows up in failure logs.
    pub fn subscribe_named<F>(&mut self, kind: EventKind, name: &'static str, handler: F)
    where
        F: Fn(&Dispatcher<'_>, &mut World, &mut GameEvent) -> HandlerResult + 'static,
    {
        self.subscribers.entry(kind).or_default().push(Subscriber {
            name,
            handler: Box::new(handler),
        });
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    fn handlers(&self, kind: EventKind) -> &[Subscriber] {
        self.subscribers.get(&kind).map_or(&[], Vec::as_slice)
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (kind, subscribers) in &self.subscribers {
            let names: Vec<_> = subscribers.iter().map(|s| s.name).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}

/// A bus paired with the read-only environment, handed to every handler.
///
/// Handlers dispatch follow-up events through the same dispatcher, so
/// cascades (reflection, lifesteal, passive triggers) grow the call stack
/// instead of being queued.
#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    bus: &'a EventBus,
    env: Env<'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(bus: &'a EventBus, env: Env<'a>) -> Self {
        Self { bus, env }
    }

    pub fn env(&self) -> &Env<'a> {
        &self.env
    }

    pub fn config(&self) -> &'a GameConfig {
        self.env.config()
    }

    pub fn registry(&self) -> &'a ComponentRegistry {
        self.env.registry()
    }

    /// Runs every handler subscribed to the event's kind and returns the event
    /// as the handlers left it.
    ///
    /// A handler that fails or panics is logged and skipped; the remaining
    /// handlers still run.
    pub fn dispatch(&self, world: &mut World, mut event: GameEvent) -> GameEvent {
        let kind = event.kind();
        for subscriber in self.bus.handlers(kind) {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (subscriber.handler)(self, world, &mut event)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::error!(
                        event = %kind,
                        handler = subscriber.name,
                        error_code = error.error_code(),
                        severity = error.severity().as_str(),
                        "handler failed: {error}"
                    );
                }
                Err(panic) => {
                    tracing::error!(
                        event = %kind,
                        handler = subscriber.name,
                        "handler panicked: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
        event
    }

    /// Dispatches and drops the returned event.
    pub fn emit(&self, world: &mut World, event: GameEvent) {
        let _ = self.dispatch(world, event);
    }

    pub fn log(&self, world: &mut World, tag: LogTag, message: impl Into<String>) {
        self.emit(world, GameEvent::log(tag, message));
    }

    pub fn ui(&self, world: &mut World, message: impl Into<String>) {
        self.emit(world, GameEvent::ui(message));
    }
}

impl core::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bus", self.bus)
            .field("env", &self.env)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
