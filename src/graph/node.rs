use std::sync::Arc;

use crate::{
    dsp::{FilterType, WaveformKind},
    graph::param::ParamEvent,
    host::AudioContext,
};

/// Identifies a node inside one audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The context output. Always present, never released.
    pub const DESTINATION: NodeId = NodeId(0);
}

/// Everything needed to construct a node on the render side.
#[derive(Debug, Clone)]
pub enum NodeSpec {
    Oscillator {
        waveform: WaveformKind,
        frequency: f32,
    },
    /// One-shot buffer source; the samples are generated on the control side.
    Noise { samples: Arc<[f32]> },
    Filter {
        kind: FilterType,
        frequency: f32,
        q: f32,
    },
    Gain { level: f32 },
}

impl NodeSpec {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeSpec::Oscillator { .. } => NodeKind::Oscillator,
            NodeSpec::Noise { .. } => NodeKind::Noise,
            NodeSpec::Filter { .. } => NodeKind::Filter,
            NodeSpec::Gain { .. } => NodeKind::Gain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Oscillator,
    Noise,
    Filter,
    Gain,
}

/// Automatable parameters. Nodes ignore parameters they do not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeParam {
    /// Oscillator pitch or filter cutoff, in Hz.
    Frequency,
    /// Filter Q.
    Q,
    /// Gain level.
    Gain,
}

/// Running tally of constructed nodes, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    pub oscillators: usize,
    pub noise: usize,
    pub filters: usize,
    pub gains: usize,
}

impl NodeCounts {
    pub fn record(&mut self, kind: NodeKind) {
        match kind {
            NodeKind::Oscillator => self.oscillators += 1,
            NodeKind::Noise => self.noise += 1,
            NodeKind::Filter => self.filters += 1,
            NodeKind::Gain => self.gains += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.oscillators + self.noise + self.filters + self.gains
    }
}

/// Nodes that produce sound on their own and must be started.
pub trait SourceHandle: Copy {
    fn node(&self) -> NodeId;

    fn start(&self, ctx: &mut dyn AudioContext, at: f64) {
        ctx.start(self.node(), at);
    }

    fn stop(&self, ctx: &mut dyn AudioContext, at: f64) {
        ctx.stop(self.node(), at);
    }

    /// Disconnect `nodes` together with this source once it has ended.
    fn release_on_end(&self, ctx: &mut dyn AudioContext, nodes: &[NodeId]) {
        ctx.release_on_end(self.node(), nodes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillatorHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainHandle(pub(crate) NodeId);

impl SourceHandle for OscillatorHandle {
    fn node(&self) -> NodeId {
        self.0
    }
}

impl SourceHandle for NoiseHandle {
    fn node(&self) -> NodeId {
        self.0
    }
}

impl FilterHandle {
    pub fn node(&self) -> NodeId {
        self.0
    }

    /// Move the center frequency from `from` to `to` exponentially over
    /// `[start, end]`.
    pub fn sweep(&self, ctx: &mut dyn AudioContext, from: f32, to: f32, start: f64, end: f64) {
        ctx.automate(
            self.0,
            NodeParam::Frequency,
            ParamEvent::SetValue {
                time: start,
                value: from,
            },
        );
        ctx.automate(
            self.0,
            NodeParam::Frequency,
            ParamEvent::ExponentialRamp { end, value: to },
        );
    }
}

impl GainHandle {
    pub fn node(&self) -> NodeId {
        self.0
    }

    /// Jump to `level` immediately, discarding any scheduled automation.
    pub fn set_level(&self, ctx: &mut dyn AudioContext, level: f32) {
        ctx.set_param(self.0, NodeParam::Gain, level);
    }

    pub fn automate(&self, ctx: &mut dyn AudioContext, event: ParamEvent) {
        ctx.automate(self.0, NodeParam::Gain, event);
    }
}
