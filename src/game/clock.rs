use log::trace;
use std::thread;
use std::time::{Duration, Instant};

/// Keeps the frame loop at a fixed cadence by sleeping out the rest of each frame.
#[derive(Debug)]
pub struct FrameClock {
    period: Duration,
    enabled: bool,
    last_tick: Option<Instant>,
}

impl FrameClock {
    pub fn new(frame_rate: f64, enabled: bool) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / frame_rate.max(1.0)),
            enabled,
            last_tick: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps until one period has passed since the previous call.
    ///
    /// Returns the time slept.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let slept = match self.last_tick {
            Some(last) if self.enabled => {
                let remaining = self.period.saturating_sub(now.duration_since(last));
                if !remaining.is_zero() {
                    trace!("Frame done early, sleeping {:?}", remaining);
                    thread::sleep(remaining);
                }
                remaining
            }
            _ => Duration::ZERO,
        };
        self.last_tick = Some(Instant::now());
        slept
    }
}
