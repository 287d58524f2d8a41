//! The seam between the engine and whatever actually produces sound.
//!
//! An [`AudioHost`] hands out [`AudioContext`]s. A context is a declarative
//! node graph with its own clock: control code creates nodes, wires them,
//! schedules parameter changes and source start/stop times, and the context
//! renders them asynchronously. Nothing on this side ever touches samples.
//!
//! Two backends ship with the crate:
//!
//! - [`offline`]: renders in-process, on demand. Used by tests, benchmarks
//!   and anything that wants the audio as a buffer.
//! - `cpal` (feature `rtrb`): a realtime output stream fed through a
//!   lock-free command queue.

pub mod offline;

#[cfg(feature = "rtrb")]
pub mod cpal;

use crate::{
    error::EngineError,
    graph::{GraphCommand, NodeId, NodeParam, NodeSpec, ParamEvent},
};

pub use offline::{OfflineContext, OfflineHost, OfflineRenderer};

#[cfg(feature = "rtrb")]
pub use self::cpal::{CpalContext, CpalHost};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    /// Created but not producing output, typically until a user gesture.
    Suspended,
    Closed,
}

/// Creates output contexts. Opening is the expensive, fallible step.
pub trait AudioHost {
    fn open(&mut self) -> Result<Box<dyn AudioContext>, EngineError>;
}

/// A live output context.
///
/// Only [`create_node`](Self::create_node) and [`submit`](Self::submit) carry
/// backend logic; the wiring and scheduling calls are expressed as
/// [`GraphCommand`]s.
pub trait AudioContext {
    fn sample_rate(&self) -> f32;

    /// Seconds on the context clock. Monotonic, starts at zero.
    fn current_time(&self) -> f64;

    fn state(&self) -> ContextState;

    fn resume(&mut self) -> Result<(), EngineError>;

    /// Stop rendering and release everything the context owns.
    fn close(&mut self);

    /// Allocate a node. It stays silent until connected (and, for sources,
    /// started).
    fn create_node(&mut self, spec: NodeSpec) -> NodeId;

    /// Forward a command to the render side.
    fn submit(&mut self, command: GraphCommand);

    /// Whether `commands` more submissions will all be delivered. Backends
    /// with a bounded queue check their free space; the rest always accept.
    fn can_accept(&self, commands: usize) -> bool {
        let _ = commands;
        true
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        self.submit(GraphCommand::Connect { from, to });
    }

    fn set_param(&mut self, id: NodeId, param: NodeParam, value: f32) {
        self.submit(GraphCommand::SetParam { id, param, value });
    }

    fn automate(&mut self, id: NodeId, param: NodeParam, event: ParamEvent) {
        self.submit(GraphCommand::Automate { id, param, event });
    }

    fn start(&mut self, id: NodeId, at: f64) {
        self.submit(GraphCommand::Start { id, at });
    }

    fn stop(&mut self, id: NodeId, at: f64) {
        self.submit(GraphCommand::Stop { id, at });
    }

    /// Remove `nodes` from the graph once `source` has ended.
    fn release_on_end(&mut self, source: NodeId, nodes: &[NodeId]) {
        self.submit(GraphCommand::ReleaseOnEnd {
            source,
            nodes: nodes.to_vec(),
        });
    }
}
