use crate::event::Dispatcher;
use crate::state::World;

use super::context::EffectContext;

/// One stage of a damage or heal pipeline.
///
/// Processors hold no state. They read and adjust the context and may dispatch
/// follow-up events through the dispatcher.
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World);
}

/// Fixed, ordered chain of processors.
pub struct Pipeline {
    label: &'static str,
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            processors: Vec::new(),
        }
    }

    pub fn with(mut self, processor: impl Processor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Runs processors in order until one cancels the context.
    pub fn execute(&self, ctx: &mut EffectContext, d: &Dispatcher<'_>, world: &mut World) {
        for processor in &self.processors {
            if ctx.is_cancelled() {
                tracing::debug!(
                    pipeline = self.label,
                    next = processor.name(),
                    "pipeline cancelled"
                );
                break;
            }
            processor.process(ctx, d, world);
        }
    }
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("label", &self.label)
            .field("stages", &self.stage_names())
            .finish()
    }
}
