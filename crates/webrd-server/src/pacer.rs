use std::time::{Duration, Instant};

/// Per-session frame-rate limiter (spec §4.6).
///
/// Tracks when the last frame was actually sent and reports how much
/// longer the producer loop should wait before servicing the next
/// pending request. This is a cooperative delay: the caller `sleep`s
/// on the returned duration itself, so other sessions are never
/// blocked by one session's pacing.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    last_sent_at: Option<Instant>,
}

impl FramePacer {
    #[must_use]
    pub fn new(max_fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(max_fps)),
            last_sent_at: None,
        }
    }

    /// How long to wait, from `now`, before the pacing budget allows
    /// the next frame to be sent. Zero if the budget already allows it
    /// (including the very first frame of the session).
    #[must_use]
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last_sent_at {
            None => Duration::ZERO,
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn record_sent(&mut self, now: Instant) {
        self.last_sent_at = Some(now);
    }
}

/// Token-bucket rate limiter for input dispatch (spec §4.4, §3
/// `last_input_dispatched_at`).
///
/// Tokens refill continuously at `max_ips` per second, up to a
/// capacity of one second's worth of events, which matches the spec's
/// framing of the cap as "events per second".
#[derive(Debug)]
pub struct InputBudget {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl InputBudget {
    #[must_use]
    pub fn new(max_ips: u32, now: Instant) -> Self {
        let capacity = f64::from(max_ips);
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Consume up to `requested` tokens, returning how many were
    /// actually available. Never blocks.
    pub fn take(&mut self, now: Instant, requested: usize) -> usize {
        self.refill(now);
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let available = self.tokens.floor().max(0.0) as usize;
        let taken = available.min(requested);
        #[allow(clippy::cast_precision_loss)]
        {
            self.tokens -= taken as f64;
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_wait() {
        let pacer = FramePacer::new(30);
        assert_eq!(pacer.wait_time(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn wait_time_shrinks_toward_zero() {
        let mut pacer = FramePacer::new(10); // 100ms interval
        let t0 = Instant::now();
        pacer.record_sent(t0);
        let soon = pacer.wait_time(t0 + Duration::from_millis(20));
        let later = pacer.wait_time(t0 + Duration::from_millis(90));
        assert!(soon > later);
        assert_eq!(pacer.wait_time(t0 + Duration::from_millis(150)), Duration::ZERO);
    }

    #[test]
    fn budget_starts_full_and_drains() {
        let t0 = Instant::now();
        let mut budget = InputBudget::new(5, t0);
        assert_eq!(budget.take(t0, 3), 3);
        assert_eq!(budget.take(t0, 10), 2);
        assert_eq!(budget.take(t0, 1), 0);
    }

    #[test]
    fn budget_refills_over_time() {
        let t0 = Instant::now();
        let mut budget = InputBudget::new(10, t0);
        assert_eq!(budget.take(t0, 10), 10);
        assert_eq!(budget.take(t0 + Duration::from_millis(500), 10), 5);
    }
}
