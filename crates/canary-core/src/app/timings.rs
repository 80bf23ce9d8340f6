use std::time::Duration;

/// Pause between create and read, letting the registry's eventual
/// consistency window close.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Pause after every cycle, bounding the request rate per worker.
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_millis(500);

/// The only deliberate suspension points of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimings {
    pub settle_delay: Duration,
    pub cycle_pause: Duration,
}

impl Default for ProbeTimings {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            cycle_pause: DEFAULT_CYCLE_PAUSE,
        }
    }
}
