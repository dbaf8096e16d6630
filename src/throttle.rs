use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    Idle,
    Processing,
}

/// Lets a frame through only when `interval` has passed since the last one that was.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    state: ThrottleState,
    last_processing: Option<Instant>,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: ThrottleState::Idle,
            last_processing: None,
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Idle -> Processing for a frame arriving at `now`. Returns false when the
    /// frame has to be dropped, either because one is still processing or
    /// because the last one started less than `interval` ago.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if self.state == ThrottleState::Processing {
            return false;
        }

        if let Some(last) = self.last_processing {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }

        self.state = ThrottleState::Processing;
        self.last_processing = Some(now);

        true
    }

    /// Processing -> Idle.
    pub fn finish(&mut self) {
        self.state = ThrottleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transitions(spacing: Duration) -> usize {
        let mut throttle = FrameThrottle::default();
        let start = Instant::now();

        [start, start + spacing]
            .into_iter()
            .filter(|now| {
                let processed = throttle.try_begin(*now);
                throttle.finish();
                processed
            })
            .count()
    }

    #[test]
    fn frames_100ms_apart_process_once() {
        assert_eq!(transitions(Duration::from_millis(100)), 1);
    }

    #[test]
    fn frames_600ms_apart_process_twice() {
        assert_eq!(transitions(Duration::from_millis(600)), 2);
    }

    #[test]
    fn interval_counts_from_last_processed_frame() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(500));
        let start = Instant::now();

        assert!(throttle.try_begin(start));
        throttle.finish();
        assert!(!throttle.try_begin(start + Duration::from_millis(300)));
        // the dropped frame does not reset the clock
        assert!(throttle.try_begin(start + Duration::from_millis(500)));
    }

    #[test]
    fn busy_throttle_drops_frames() {
        let mut throttle = FrameThrottle::new(Duration::ZERO);
        let start = Instant::now();

        assert!(throttle.try_begin(start));
        assert_eq!(throttle.state(), ThrottleState::Processing);
        assert!(!throttle.try_begin(start + Duration::from_secs(1)));

        throttle.finish();

        assert_eq!(throttle.state(), ThrottleState::Idle);
        assert!(throttle.try_begin(start + Duration::from_secs(1)));
    }
}
