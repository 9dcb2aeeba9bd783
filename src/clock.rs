use std::time::{Duration, Instant};

/// Supplies the elapsed time fed to the timeline, once per frame.
pub trait TimeSource {
    /// Seconds since the animation started. Never decreases and is always finite.
    fn elapsed(&mut self) -> f32;
}

/// Holds the last accepted sample so that stalled or broken host clocks
/// cannot move the timeline backwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicGuard {
    last: Option<f32>,
}

impl MonotonicGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, raw: f32) -> f32 {
        let floor = self.last.unwrap_or(0.0);
        let value = if raw.is_finite() { raw.max(floor) } else { floor };
        self.last = Some(value);
        value
    }
}

/// Wall-clock elapsed time since construction.
#[derive(Debug)]
pub struct ElapsedClock {
    start: Instant,
    guard: MonotonicGuard,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            guard: MonotonicGuard::new(),
        }
    }
}

impl Default for ElapsedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ElapsedClock {
    fn elapsed(&mut self) -> f32 {
        let raw = Instant::now().duration_since(self.start).as_secs_f32();
        self.guard.accept(raw)
    }
}

/// Deterministic clock advancing by a fixed step per sample, used by the
/// headless run and tests. The first sample is zero.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    frame: u64,
    guard: MonotonicGuard,
}

impl FixedStepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.as_secs_f32(),
            frame: 0,
            guard: MonotonicGuard::new(),
        }
    }

    pub fn per_second(rate: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(rate.max(1))))
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}

impl TimeSource for FixedStepClock {
    fn elapsed(&mut self) -> f32 {
        let raw = (self.frame as f64 * f64::from(self.step)) as f32;
        self.frame += 1;
        self.guard.accept(raw)
    }
}
