//! In-process backend that renders only when asked to.
//!
//! The host and every context it opens share one piece of state behind a
//! mutex; an [`OfflineRenderer`] obtained from the host pulls samples out of
//! whichever context is current and exposes node-count instrumentation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{
    error::EngineError,
    graph::{Graph, GraphCommand, NodeCounts, NodeId, NodeSpec},
    host::{AudioContext, AudioHost, ContextState},
    MAX_BLOCK_SIZE,
};

struct Shared {
    graph: Graph,
    state: ContextState,
    generation: u64,
    next_id: u32,
    counts: NodeCounts,
    fail_resume: bool,
}

impl Shared {
    fn apply(&mut self, command: GraphCommand) {
        self.graph.apply(command);
        self.graph.take_retired(usize::MAX).for_each(drop);
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct OfflineHost {
    shared: Arc<Mutex<Shared>>,
    available: bool,
    open_suspended: bool,
    opened: usize,
}

impl OfflineHost {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                graph: Graph::new(sample_rate),
                state: ContextState::Closed,
                generation: 0,
                next_id: 1,
                counts: NodeCounts::default(),
                fail_resume: false,
            })),
            available: true,
            open_suspended: false,
            opened: 0,
        }
    }

    /// A host with no output at all; `open` always fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(48_000.0)
        }
    }

    /// Contexts open suspended and need a `resume` before they render.
    pub fn start_suspended(mut self) -> Self {
        self.open_suspended = true;
        self
    }

    /// Every `resume` is rejected.
    pub fn failing_resume(self) -> Self {
        lock(&self.shared).fail_resume = true;
        self
    }

    pub fn renderer(&self) -> OfflineRenderer {
        OfflineRenderer {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn contexts_opened(&self) -> usize {
        self.opened
    }
}

impl AudioHost for OfflineHost {
    fn open(&mut self) -> Result<Box<dyn AudioContext>, EngineError> {
        if !self.available {
            return Err(EngineError::UnsupportedPlatform(
                "offline host has no output".into(),
            ));
        }

        let mut shared = lock(&self.shared);
        let sample_rate = shared.graph.sample_rate();
        shared.generation += 1;
        shared.graph = Graph::new(sample_rate);
        shared.next_id = 1;
        shared.state = if self.open_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        let generation = shared.generation;
        drop(shared);

        self.opened += 1;
        debug!(generation, sample_rate, "opened offline context");

        Ok(Box::new(OfflineContext {
            shared: Arc::clone(&self.shared),
            generation,
            sample_rate,
        }))
    }
}

/// A context opened by [`OfflineHost`]. Once a newer context is opened, or
/// this one is closed, every call on it is ignored.
pub struct OfflineContext {
    shared: Arc<Mutex<Shared>>,
    generation: u64,
    sample_rate: f32,
}

impl OfflineContext {
    fn current(&self) -> Option<MutexGuard<'_, Shared>> {
        let shared = lock(&self.shared);
        (shared.generation == self.generation && shared.state != ContextState::Closed)
            .then_some(shared)
    }
}

impl AudioContext for OfflineContext {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.current().map_or(0.0, |shared| shared.graph.time())
    }

    fn state(&self) -> ContextState {
        self.current()
            .map_or(ContextState::Closed, |shared| shared.state)
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let mut shared = self.current().ok_or(EngineError::ContextClosed)?;
        if shared.fail_resume {
            return Err(EngineError::ContextSuspended(
                "resume rejected by host".into(),
            ));
        }
        shared.state = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut shared) = self.current() {
            let sample_rate = shared.graph.sample_rate();
            shared.graph = Graph::new(sample_rate);
            shared.state = ContextState::Closed;
        }
    }

    fn create_node(&mut self, spec: NodeSpec) -> NodeId {
        let Some(mut shared) = self.current() else {
            return NodeId::DESTINATION;
        };
        let id = NodeId(shared.next_id);
        shared.next_id += 1;
        shared.counts.record(spec.kind());
        shared.apply(GraphCommand::Create { id, spec });
        id
    }

    fn submit(&mut self, command: GraphCommand) {
        if let Some(mut shared) = self.current() {
            shared.apply(command);
        }
    }
}

/// Pulls audio out of the host's current context.
#[derive(Clone)]
pub struct OfflineRenderer {
    shared: Arc<Mutex<Shared>>,
}

impl OfflineRenderer {
    /// Render `frames` samples of mono output. A context that is not running
    /// yields silence and its clock stands still.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        let mut shared = lock(&self.shared);
        if shared.state != ContextState::Running {
            return out;
        }
        shared.graph.render(&mut out);
        shared.graph.take_retired(usize::MAX).for_each(drop);
        out
    }

    /// Render until every scheduled source has ended, or `max_frames` have
    /// been produced.
    pub fn render_until_idle(&self, max_frames: usize) -> Vec<f32> {
        let mut out = Vec::new();
        while out.len() < max_frames && self.has_pending_sources() {
            let frames = MAX_BLOCK_SIZE.min(max_frames - out.len());
            let block = self.render(frames);
            if self.state() != ContextState::Running {
                break;
            }
            out.extend(block);
        }
        out
    }

    pub fn has_pending_sources(&self) -> bool {
        lock(&self.shared).graph.has_pending_sources()
    }

    pub fn live_nodes(&self) -> usize {
        lock(&self.shared).graph.live_nodes()
    }

    /// Nodes constructed since the host was created, across all contexts.
    pub fn counts(&self) -> NodeCounts {
        lock(&self.shared).counts
    }

    pub fn state(&self) -> ContextState {
        lock(&self.shared).state
    }

    pub fn current_time(&self) -> f64 {
        lock(&self.shared).graph.time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::WaveformKind,
        graph::{make_gain, make_oscillator, SourceHandle},
    };

    #[test]
    fn clock_advances_only_when_rendered() {
        let mut host = OfflineHost::new(1_000.0);
        let renderer = host.renderer();
        let ctx = host.open().unwrap();

        assert_eq!(ctx.current_time(), 0.0);
        renderer.render(500);
        assert_eq!(ctx.current_time(), 0.5);
    }

    #[test]
    fn suspended_context_renders_silence_until_resumed() {
        let mut host = OfflineHost::new(1_000.0).start_suspended();
        let renderer = host.renderer();
        let mut ctx = host.open().unwrap();
        assert_eq!(ctx.state(), ContextState::Suspended);

        let osc = make_oscillator(ctx.as_mut(), WaveformKind::Square, 1.0);
        ctx.connect(osc.node(), NodeId::DESTINATION);
        osc.start(ctx.as_mut(), 0.0);

        assert!(renderer.render(10).iter().all(|&s| s == 0.0));
        assert_eq!(renderer.current_time(), 0.0);

        ctx.resume().unwrap();
        assert!(renderer.render(10).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn failing_resume_reports_suspended() {
        let mut host = OfflineHost::new(1_000.0).start_suspended().failing_resume();
        let mut ctx = host.open().unwrap();
        assert!(matches!(
            ctx.resume(),
            Err(EngineError::ContextSuspended(_))
        ));
    }

    #[test]
    fn unavailable_host_fails_to_open() {
        let mut host = OfflineHost::unavailable();
        assert!(matches!(
            host.open(),
            Err(EngineError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn stale_context_is_inert() {
        let mut host = OfflineHost::new(1_000.0);
        let renderer = host.renderer();
        let mut first = host.open().unwrap();
        let mut second = host.open().unwrap();

        make_gain(first.as_mut(), 1.0);
        assert_eq!(renderer.live_nodes(), 0);
        assert_eq!(first.state(), ContextState::Closed);

        make_gain(second.as_mut(), 1.0);
        assert_eq!(renderer.live_nodes(), 1);
        assert_eq!(renderer.counts().gains, 1);
        assert_eq!(host.contexts_opened(), 2);
    }

    #[test]
    fn close_drops_every_node() {
        let mut host = OfflineHost::new(1_000.0);
        let renderer = host.renderer();
        let mut ctx = host.open().unwrap();
        make_gain(ctx.as_mut(), 1.0);

        ctx.close();
        assert_eq!(ctx.state(), ContextState::Closed);
        assert_eq!(renderer.live_nodes(), 0);
    }
}
