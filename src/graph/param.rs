/*
Parameter Automation
====================

A `ParamTimeline` is the value of one node parameter (gain level, filter
cutoff, oscillator frequency) as a function of context time. It follows the
familiar Web Audio model:

  SetValue { time, value }          jump to `value` at `time`
  LinearRamp { end, value }         straight line from the previous event
                                    to `value`, arriving at `end`
  ExponentialRamp { end, value }    constant-ratio curve, same endpoints

Before the first event the parameter sits at its intrinsic value. A ramp
always starts from the previous event's (time, value); a ramp with no
predecessor starts from the intrinsic value at time zero.

  value
    │        ●━━━━━━━━●                 ● = event
    │       ╱          ╲
    │  ●━━━╱            ╲━━●
    └──────────────────────────→ t

Events are kept sorted by time. Equal timestamps keep insertion order, which
is what lets the envelope shaper stack a `SetValue` and a ramp on the same
instant when a short sound collapses its hold.

Exponential ramps need both endpoints strictly positive and of the same sign;
anything else falls back to a linear ramp rather than producing NaN.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { time: f64, value: f32 },
    LinearRamp { end: f64, value: f32 },
    ExponentialRamp { end: f64, value: f32 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } => time,
            ParamEvent::LinearRamp { end, .. } => end,
            ParamEvent::ExponentialRamp { end, .. } => end,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            ParamEvent::SetValue { value, .. }
            | ParamEvent::LinearRamp { value, .. }
            | ParamEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    intrinsic: f32,
    events: Vec<ParamEvent>,
}

impl ParamTimeline {
    pub fn new(value: f32) -> Self {
        Self::with_capacity(value, 0)
    }

    /// Room for `events` scheduled events before the timeline reallocates.
    pub fn with_capacity(value: f32, events: usize) -> Self {
        Self {
            intrinsic: value,
            events: Vec::with_capacity(events),
        }
    }

    /// Drop all automation and hold `value` from now on.
    pub fn set(&mut self, value: f32) {
        self.intrinsic = value;
        self.events.clear();
    }

    pub fn schedule(&mut self, event: ParamEvent) {
        // insert after every event at or before this time
        let at = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(at, event);
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    pub fn is_automated(&self) -> bool {
        !self.events.is_empty()
    }

    /// Forget events that finished before `time`, keeping the last one as
    /// the starting point for whatever follows.
    pub fn prune_before(&mut self, time: f64) {
        let passed = self.events.partition_point(|e| e.time() < time);
        if passed > 1 {
            let keep_from = passed - 1;
            let anchor = self.events[keep_from];
            self.intrinsic = anchor.value();
            self.events.drain(..keep_from);
            self.events[0] = ParamEvent::SetValue {
                time: anchor.time(),
                value: anchor.value(),
            };
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        if self.events.is_empty() {
            return self.intrinsic;
        }

        // index of the first event strictly after `time`
        let next = self.events.partition_point(|e| e.time() <= time);

        let (prev_time, prev_value) = match next {
            0 => (0.0, self.intrinsic),
            n => {
                let prev = self.events[n - 1];
                (prev.time(), prev.value())
            }
        };

        match self.events.get(next) {
            Some(&ParamEvent::LinearRamp { end, value }) => {
                linear(prev_time, prev_value, end, value, time)
            }
            Some(&ParamEvent::ExponentialRamp { end, value }) => {
                exponential(prev_time, prev_value, end, value, time)
            }
            Some(ParamEvent::SetValue { .. }) | None => prev_value,
        }
    }
}

#[inline]
fn progress(start: f64, end: f64, time: f64) -> Option<f64> {
    if end <= start {
        None
    } else {
        Some(((time - start) / (end - start)).clamp(0.0, 1.0))
    }
}

#[inline]
fn linear(t0: f64, v0: f32, t1: f64, v1: f32, time: f64) -> f32 {
    match progress(t0, t1, time) {
        Some(p) => v0 + (v1 - v0) * p as f32,
        None => v1,
    }
}

#[inline]
fn exponential(t0: f64, v0: f32, t1: f64, v1: f32, time: f64) -> f32 {
    if v0 <= 0.0 || v1 <= 0.0 {
        return linear(t0, v0, t1, v1, time);
    }
    match progress(t0, t1, time) {
        Some(p) => v0 * (v1 / v0).powf(p as f32),
        None => v1,
    }
}
