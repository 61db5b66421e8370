//! Execution tracing hooks.
//!
//! The evaluator reports call and loop activity through an `EvalTracer`;
//! `NoopTracer` is the default, `RecordingTracer` collects events for tests
//! and tooling.

/// One observable evaluation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A function or builtin call is about to execute its body.
    CallEnter { name: String, depth: usize },
    /// The call named by the matching `CallEnter` finished (value or error).
    CallExit { name: String },
    /// A loop activation completed one iteration (0-based).
    LoopIteration { iteration: usize },
}

pub trait EvalTracer {
    fn record(&mut self, event: TraceEvent);
}

/// Tracer that ignores every event.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl EvalTracer for NoopTracer {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Tracer that keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl EvalTracer for RecordingTracer {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
