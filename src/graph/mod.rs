//! Declarative audio graph shared by every host backend.
//!
//! Control code builds sounds out of typed node handles (see [`primitives`])
//! and schedules their parameters against the context clock. The render side
//! ([`render::Graph`]) turns the resulting commands into samples, one block at
//! a time, and cleans up sources once they have played out.

/// Node identifiers, specs and typed handles.
pub mod node;
/// Time-scheduled parameter values.
pub mod param;
/// Factories for oscillators, noise, filters and gains.
pub mod primitives;
/// Block renderer and the command set that drives it.
pub mod render;

pub use node::{
    FilterHandle, GainHandle, NodeCounts, NodeId, NodeKind, NodeParam, NodeSpec, NoiseHandle,
    OscillatorHandle, SourceHandle,
};
pub use param::{ParamEvent, ParamTimeline};
pub use primitives::{make_filter, make_gain, make_noise, make_oscillator};
pub use render::{Graph, GraphCommand, PreparedCommand, Retired, MAX_LIVE_NODES};
