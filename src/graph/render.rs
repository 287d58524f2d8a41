use std::{collections::HashMap, sync::Arc, vec::Drain};

use crate::{
    dsp::{filter::SVFilter, oscillator::OscillatorBlock},
    graph::{
        node::{NodeId, NodeParam, NodeSpec},
        param::{ParamEvent, ParamTimeline},
    },
    MAX_BLOCK_SIZE,
};

/*
Render Graph
============

The render side of an audio context. Control code never touches this
directly; it describes changes as `GraphCommand`s, which the owning context
either applies immediately (offline) or ships across a lock-free queue to the
audio thread (realtime).

Topology
--------

Every node has at most one output, so a sound is a chain ending in the
destination. Several chains may feed the same node (all voices feed the
master gain); inputs are summed.

  [osc] ──→ [gain] ──┐
  [osc] ──→ [gain] ──┼──→ [master gain] ──→ DESTINATION
  [noise] → [filter] → [gain] ──┘

Rendering a block walks nodes in decreasing distance from the destination.
Each node processes its accumulated input in place and adds the result into
its output's input buffer. Nodes that cannot reach the destination are not
rendered at all.

Lifetime
--------

Sources (oscillators, noise) are silent until `start` and after `stop`; a
noise source also runs dry when its buffer is exhausted. Once a source has
ended it is removed at the end of the block, together with every node it was
asked to release (`ReleaseOnEnd`). That is how per-play envelope gains and
filters disconnect themselves. Nodes nobody releases (the master gain) live
until the context is dropped.

Memory
------

`apply_prepared` and `render` never allocate or free. A `PreparedCommand`
carries a fully built node (block buffer, automation slots) from the control
thread, the node table and scratch lists are sized for `MAX_LIVE_NODES` up
front, and whatever the graph lets go of is parked as `Retired` until the
owner collects it with `take_retired` and drops it somewhere that may block.

  control thread                         audio thread
  GraphCommand → PreparedCommand ──→ apply_prepared
                                         render
       drop ←──────────── Retired ←──── take_retired

A `Create` beyond `MAX_LIVE_NODES` is retired unapplied; commands naming the
missing node are then ignored.
*/

/// Nodes one graph holds at once.
pub const MAX_LIVE_NODES: usize = 512;

/// Automation events a parameter takes before its timeline reallocates.
/// An envelope uses five, a sweep two.
const EVENTS_PER_PARAM: usize = 8;

#[derive(Debug, Clone)]
pub enum GraphCommand {
    Create { id: NodeId, spec: NodeSpec },
    Connect { from: NodeId, to: NodeId },
    SetParam { id: NodeId, param: NodeParam, value: f32 },
    Automate { id: NodeId, param: NodeParam, event: ParamEvent },
    Start { id: NodeId, at: f64 },
    Stop { id: NodeId, at: f64 },
    ReleaseOnEnd { source: NodeId, nodes: Vec<NodeId> },
}

/// A [`GraphCommand`] with its allocations already made.
pub struct PreparedCommand(Op);

enum Op {
    Insert { id: NodeId, node: Box<Node> },
    Command(GraphCommand),
}

impl From<GraphCommand> for PreparedCommand {
    fn from(command: GraphCommand) -> Self {
        match command {
            GraphCommand::Create { id, spec } => PreparedCommand(Op::Insert {
                id,
                node: Box::new(Node::new(spec)),
            }),
            other => PreparedCommand(Op::Command(other)),
        }
    }
}

/// Memory the graph no longer uses. Dropping it may free.
pub struct Retired(#[allow(dead_code)] Garbage);

#[allow(dead_code)] // only ever dropped
enum Garbage {
    Node(Box<Node>),
    Ids(Vec<NodeId>),
}

enum Processor {
    Oscillator {
        osc: OscillatorBlock,
        frequency: ParamTimeline,
    },
    Noise {
        samples: Arc<[f32]>,
        position: usize,
    },
    Filter {
        filter: SVFilter,
        frequency: ParamTimeline,
        q: ParamTimeline,
    },
    Gain {
        level: ParamTimeline,
    },
}

struct Node {
    processor: Processor,
    output: Option<NodeId>,
    start: Option<f64>,
    stop: Option<f64>,
    started: bool,
    exhausted: bool,
    release: Vec<NodeId>,
    buffer: Vec<f32>,
}

impl Node {
    fn new(spec: NodeSpec) -> Self {
        let timeline = |value| ParamTimeline::with_capacity(value, EVENTS_PER_PARAM);
        let processor = match spec {
            NodeSpec::Oscillator {
                waveform,
                frequency,
            } => Processor::Oscillator {
                osc: OscillatorBlock::new(waveform),
                frequency: timeline(frequency),
            },
            NodeSpec::Noise { samples } => Processor::Noise {
                samples,
                position: 0,
            },
            NodeSpec::Filter { kind, frequency, q } => Processor::Filter {
                filter: SVFilter::new(kind, frequency, q),
                frequency: timeline(frequency),
                q: timeline(q),
            },
            NodeSpec::Gain { level } => Processor::Gain {
                level: timeline(level),
            },
        };

        Self {
            processor,
            output: None,
            start: None,
            stop: None,
            started: false,
            exhausted: false,
            release: Vec::new(),
            buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
    fn is_source(&self) -> bool {
        matches!(
            self.processor,
            Processor::Oscillator { .. } | Processor::Noise { .. }
        )
    }

    fn has_ended(&self, now: f64) -> bool {
        self.is_source() && (self.exhausted || self.stop.is_some_and(|stop| now >= stop))
    }

    fn param_mut(&mut self, param: NodeParam) -> Option<&mut ParamTimeline> {
        match (&mut self.processor, param) {
            (Processor::Oscillator { frequency, .. }, NodeParam::Frequency) => Some(frequency),
            (Processor::Filter { frequency, .. }, NodeParam::Frequency) => Some(frequency),
            (Processor::Filter { q, .. }, NodeParam::Q) => Some(q),
            (Processor::Gain { level }, NodeParam::Gain) => Some(level),
            _ => None,
        }
    }

    /// Process `block` in place. Sources overwrite it, processors transform it.
    fn process(&mut self, block: &mut [f32], first_frame: u64, sample_rate: f32) {
        let rate = sample_rate as f64;
        let time_of = |i: usize| (first_frame + i as u64) as f64 / rate;
        let block_start = time_of(0);

        match &mut self.processor {
            Processor::Oscillator { osc, frequency } => {
                for (i, sample) in block.iter_mut().enumerate() {
                    let t = time_of(i);
                    let playing = self.start.is_some_and(|start| t >= start)
                        && self.stop.map_or(true, |stop| t < stop);
                    if !playing {
                        *sample = 0.0;
                        continue;
                    }
                    if !self.started {
                        osc.reset();
                        self.started = true;
                    }
                    *sample = osc.next_sample(frequency.value_at(t), sample_rate);
                }
            }
            Processor::Noise { samples, position } => {
                for (i, sample) in block.iter_mut().enumerate() {
                    let t = time_of(i);
                    let playing = self.start.is_some_and(|start| t >= start)
                        && self.stop.map_or(true, |stop| t < stop);
                    *sample = match samples.get(*position) {
                        Some(&value) if playing => {
                            *position += 1;
                            value
                        }
                        _ => 0.0,
                    };
                }
                if *position >= samples.len() {
                    self.exhausted = true;
                }
            }
            Processor::Filter {
                filter,
                frequency,
                q,
            } => {
                let automated = frequency.is_automated() || q.is_automated();
                if !automated {
                    filter.set_cutoff(frequency.value_at(block_start));
                    filter.set_q(q.value_at(block_start));
                    filter.render(block, sample_rate);
                    return;
                }
                for (i, sample) in block.iter_mut().enumerate() {
                    let t = time_of(i);
                    filter.set_q(q.value_at(t));
                    *sample = filter.process(*sample, frequency.value_at(t), sample_rate);
                }
            }
            Processor::Gain { level } => {
                if !level.is_automated() {
                    let gain = level.value_at(block_start);
                    block.iter_mut().for_each(|sample| *sample *= gain);
                    return;
                }
                for (i, sample) in block.iter_mut().enumerate() {
                    let t = time_of(i);
                    *sample *= level.value_at(t);
                }
                level.prune_before(block_start);
            }
        }
    }
}

pub struct Graph {
    sample_rate: f32,
    nodes: HashMap<NodeId, Box<Node>>,
    order: Vec<NodeId>,
    ranked: Vec<(usize, NodeId)>,
    ended: Vec<NodeId>,
    retired: Vec<Retired>,
    dirty: bool,
    frames: u64,
}

impl Graph {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            // twice the limit so deletions never force a resize
            nodes: HashMap::with_capacity(2 * MAX_LIVE_NODES),
            order: Vec::with_capacity(MAX_LIVE_NODES),
            ranked: Vec::with_capacity(MAX_LIVE_NODES),
            ended: Vec::with_capacity(MAX_LIVE_NODES),
            retired: Vec::with_capacity(2 * MAX_LIVE_NODES),
            dirty: false,
            frames: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Context time at the start of the next block.
    pub fn time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// True while any source is scheduled or sounding.
    pub fn has_pending_sources(&self) -> bool {
        self.nodes.values().any(|node| node.is_source())
    }

    /// Prepare and apply in one go, for owners that may allocate.
    pub fn apply(&mut self, command: GraphCommand) {
        self.apply_prepared(command.into());
    }

    pub fn apply_prepared(&mut self, command: PreparedCommand) {
        let command = match command.0 {
            Op::Insert { id, node } => {
                if self.nodes.len() >= MAX_LIVE_NODES && !self.nodes.contains_key(&id) {
                    self.retire(Garbage::Node(node));
                } else if let Some(replaced) = self.nodes.insert(id, node) {
                    self.retire(Garbage::Node(replaced));
                }
                self.dirty = true;
                return;
            }
            Op::Command(command) => command,
        };

        match command {
            GraphCommand::Create { id, spec } => {
                // `From` never wraps a create
                self.apply_prepared(PreparedCommand(Op::Insert {
                    id,
                    node: Box::new(Node::new(spec)),
                }));
            }
            GraphCommand::Connect { from, to } => {
                if let Some(node) = self.nodes.get_mut(&from) {
                    node.output = Some(to);
                    self.dirty = true;
                }
            }
            GraphCommand::SetParam { id, param, value } => {
                if let Some(timeline) = self.nodes.get_mut(&id).and_then(|n| n.param_mut(param)) {
                    timeline.set(value);
                }
            }
            GraphCommand::Automate { id, param, event } => {
                if let Some(timeline) = self.nodes.get_mut(&id).and_then(|n| n.param_mut(param)) {
                    timeline.schedule(event);
                }
            }
            GraphCommand::Start { id, at } => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.start = Some(at);
                }
            }
            GraphCommand::Stop { id, at } => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.stop = Some(at);
                }
            }
            GraphCommand::ReleaseOnEnd { source, nodes } => {
                let spent = match self.nodes.get_mut(&source) {
                    Some(node) if node.release.is_empty() => {
                        node.release = nodes;
                        None
                    }
                    Some(node) => {
                        node.release.extend_from_slice(&nodes);
                        Some(nodes)
                    }
                    None => Some(nodes),
                };
                if let Some(spent) = spent {
                    self.retire(Garbage::Ids(spent));
                }
            }
        }
    }

    /// Render the next `out.len()` frames (mono) and advance the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block);
        }
    }

    /// Hand over up to `limit` retired items, oldest first.
    pub fn take_retired(&mut self, limit: usize) -> Drain<'_, Retired> {
        let count = limit.min(self.retired.len());
        self.retired.drain(..count)
    }

    fn render_block(&mut self, out: &mut [f32]) {
        let frames = out.len();
        let sample_rate = self.sample_rate;
        let first_frame = self.frames;
        out.fill(0.0);

        if self.dirty {
            self.rebuild_order();
        }

        for node in self.nodes.values_mut() {
            node.buffer[..frames].fill(0.0);
        }

        for &id in &self.order {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let mut buffer = std::mem::take(&mut node.buffer);
            let block = &mut buffer[..frames];
            node.process(block, first_frame, sample_rate);

            match node.output {
                Some(NodeId::DESTINATION) => mix_into(out, block),
                Some(next) => {
                    if let Some(target) = self.nodes.get_mut(&next) {
                        mix_into(&mut target.buffer, block);
                    }
                }
                None => {}
            }

            if let Some(node) = self.nodes.get_mut(&id) {
                node.buffer = buffer;
            }
        }

        self.frames += frames as u64;
        self.collect_ended();
    }

    fn collect_ended(&mut self) {
        let now = self.time();
        self.ended.clear();
        self.ended.extend(
            self.nodes
                .iter()
                .filter(|(_, node)| node.has_ended(now))
                .map(|(&id, _)| id),
        );
        if self.ended.is_empty() {
            return;
        }

        for i in 0..self.ended.len() {
            let Some(node) = self.nodes.remove(&self.ended[i]) else {
                continue;
            };
            for released in &node.release {
                if let Some(released) = self.nodes.remove(released) {
                    self.retire(Garbage::Node(released));
                }
            }
            self.retire(Garbage::Node(node));
        }
        self.dirty = true;
    }

    fn retire(&mut self, garbage: Garbage) {
        self.retired.push(Retired(garbage));
    }

    fn rebuild_order(&mut self) {
        let nodes = &self.nodes;
        self.ranked.clear();
        self.ranked.extend(
            nodes
                .keys()
                .filter_map(|&id| depth(nodes, id).map(|depth| (depth, id))),
        );
        // furthest from the destination first
        self.ranked
            .sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        self.order.clear();
        self.order.extend(self.ranked.iter().map(|&(_, id)| id));
        self.dirty = false;
    }
}

/// Hops from `id` to the destination, or `None` if it never arrives.
fn depth(nodes: &HashMap<NodeId, Box<Node>>, id: NodeId) -> Option<usize> {
    let mut current = id;
    let mut hops = 0;
    loop {
        let node = nodes.get(&current)?;
        hops += 1;
        if hops > nodes.len() {
            return None; // cycle
        }
        match node.output? {
            NodeId::DESTINATION => return Some(hops),
            next => current = next,
        }
    }
}

#[inline]
fn mix_into(target: &mut [f32], source: &[f32]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t += s;
    }
}
