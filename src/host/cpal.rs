//! Realtime backend on top of a cpal output stream.
//!
//! The render graph lives inside the stream callback. The control side never
//! locks it; every call becomes a [`GraphCommand`], is prepared (node memory
//! allocated) on the calling thread and pushed through an `rtrb` queue to be
//! applied at the start of the next callback. Nodes the graph is done with
//! travel back on a second queue and are dropped by the control side, so the
//! callback never allocates or frees. The callback publishes its frame count
//! through an atomic, which is the context clock.
//!
//!   control thread                          audio thread
//!   ──────────────                          ────────────
//!   CpalContext ── PreparedCommand ──→ [rtrb] ──→ StreamRenderer ──→ device
//!        ↑  ↑                                         │  │
//!        │  └────────────── Retired ←── [rtrb] ───────┘  │
//!        └───────────────── AtomicU64 frames ────────────┘

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SizedSample,
};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info, warn};

use crate::{
    error::EngineError,
    graph::{Graph, GraphCommand, NodeId, NodeSpec, PreparedCommand, Retired, MAX_LIVE_NODES},
    host::{AudioContext, AudioHost, ContextState},
    MAX_BLOCK_SIZE,
};

/// Commands a burst of plays can queue before the callback drains them.
const COMMAND_QUEUE_CAPACITY: usize = 4096;

/// Retired nodes in flight back to the control thread.
const RETIRED_QUEUE_CAPACITY: usize = 2 * MAX_LIVE_NODES;

/// Opens the system's default output device.
#[derive(Default)]
pub struct CpalHost {
    scope: Option<Producer<f32>>,
}

impl CpalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every rendered (mono) sample into `tap`, dropping samples when it
    /// is full. Only the first context opened receives the tap.
    pub fn with_scope(mut self, tap: Producer<f32>) -> Self {
        self.scope = Some(tap);
        self
    }
}

impl AudioHost for CpalHost {
    fn open(&mut self) -> Result<Box<dyn AudioContext>, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::UnsupportedPlatform("no default output device".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::UnsupportedPlatform(e.to_string()))?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0 as f32;

        let (commands, command_rx) = RingBuffer::<PreparedCommand>::new(COMMAND_QUEUE_CAPACITY);
        let (retired_tx, retired) = RingBuffer::<Retired>::new(RETIRED_QUEUE_CAPACITY);
        let frames = Arc::new(AtomicU64::new(0));

        let renderer = StreamRenderer {
            graph: Graph::new(sample_rate),
            commands: command_rx,
            retired: retired_tx,
            frames: Arc::clone(&frames),
            scope: self.scope.take(),
            block: vec![0.0; MAX_BLOCK_SIZE],
        };

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, renderer),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, renderer),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, renderer),
            other => {
                return Err(EngineError::UnsupportedPlatform(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }
        .map_err(|e| EngineError::UnsupportedPlatform(e.to_string()))?;

        // A stream that refuses to start is treated like a suspended context;
        // the engine will try `resume` on the next play.
        let state = match stream.play() {
            Ok(()) => ContextState::Running,
            Err(e) => {
                warn!("output stream did not start: {e}");
                ContextState::Suspended
            }
        };

        info!(
            sample_rate,
            channels = config.channels,
            format = ?sample_format,
            "audio output opened"
        );

        Ok(Box::new(CpalContext {
            commands,
            retired,
            frames,
            stream: Some(stream),
            sample_rate,
            state,
            next_id: 1,
        }))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut renderer: StreamRenderer,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| renderer.fill(data, channels),
        |err| error!("audio stream error: {err}"),
        None,
    )
}

/// Audio-thread half: owns the graph.
struct StreamRenderer {
    graph: Graph,
    commands: Consumer<PreparedCommand>,
    retired: Producer<Retired>,
    frames: Arc<AtomicU64>,
    scope: Option<Producer<f32>>,
    block: Vec<f32>,
}

impl StreamRenderer {
    fn fill<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        while let Ok(command) = self.commands.pop() {
            self.graph.apply_prepared(command);
        }

        let channels = channels.max(1);
        for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let block = &mut self.block[..frames];
            self.graph.render(block);

            // mono to all channels
            for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                frame.fill(T::from_sample(sample));
            }

            if let Some(scope) = self.scope.as_mut() {
                for &sample in block.iter() {
                    if scope.push(sample).is_err() {
                        break;
                    }
                }
            }
        }

        // whatever does not fit waits in the graph for the next callback
        for retired in self.graph.take_retired(self.retired.slots()) {
            if self.retired.push(retired).is_err() {
                break;
            }
        }

        self.frames.store(self.graph.frames(), Ordering::Release);
    }
}

/// Control-thread half of a realtime context.
pub struct CpalContext {
    commands: Producer<PreparedCommand>,
    retired: Consumer<Retired>,
    frames: Arc<AtomicU64>,
    stream: Option<cpal::Stream>,
    sample_rate: f32,
    state: ContextState,
    next_id: u32,
}

impl AudioContext for CpalContext {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::ContextClosed)?;
        stream
            .play()
            .map_err(|e| EngineError::ContextSuspended(e.to_string()))?;
        self.state = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("audio output closed");
        }
        self.state = ContextState::Closed;
    }

    fn create_node(&mut self, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.submit(GraphCommand::Create { id, spec });
        id
    }

    fn submit(&mut self, command: GraphCommand) {
        if self.state == ContextState::Closed {
            return;
        }
        self.drop_retired();
        if self.commands.push(command.into()).is_err() {
            warn!("graph command queue full, dropping command");
        }
    }

    fn can_accept(&self, commands: usize) -> bool {
        self.commands.slots() >= commands
    }
}

impl CpalContext {
    fn drop_retired(&mut self) {
        while self.retired.pop().is_ok() {}
    }
}
