/// Tick timing decoupled from wall-clock timers. Deadlines advance against
/// caller-supplied millisecond timestamps, so hosts may poll at any rate and
/// tests can drive a synthetic clock one tick at a time.
///
/// There is never more than one schedule: `start` replaces any previous
/// deadline, and after `stop` returns no tick can fire.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval_ms: u64,
    next_due_ms: u64,
    running: bool,
}

impl TickScheduler {
    pub fn new(interval_ms: u64) -> Self {
        TickScheduler {
            interval_ms,
            next_due_ms: 0,
            running: false,
        }
    }

    /// Begins ticking; the first tick falls due one interval after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms + self.interval_ms;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Changes the interval for deadlines scheduled after the current one.
    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Consumes one due tick and advances the deadline. Callers loop until
    /// this returns false, which lets a stalled host catch up tick by tick.
    pub fn fire_due(&mut self, now_ms: u64) -> bool {
        if self.running && now_ms >= self.next_due_ms {
            self.next_due_ms += self.interval_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_start() {
        let mut scheduler = TickScheduler::new(100);
        assert!(!scheduler.is_running());
        assert!(!scheduler.fire_due(10_000));
    }

    #[test]
    fn ticks_fall_due_one_interval_apart() {
        let mut scheduler = TickScheduler::new(100);
        scheduler.start(0);
        assert!(!scheduler.fire_due(99));
        assert!(scheduler.fire_due(100));
        assert!(!scheduler.fire_due(150));
        assert!(scheduler.fire_due(200));
    }

    #[test]
    fn stalled_hosts_catch_up_one_tick_at_a_time() {
        let mut scheduler = TickScheduler::new(100);
        scheduler.start(0);
        let mut fired = 0;
        while scheduler.fire_due(350) {
            fired += 1;
        }
        assert_eq!(fired, 3);
    }

    #[test]
    fn stop_halts_synchronously() {
        let mut scheduler = TickScheduler::new(100);
        scheduler.start(0);
        scheduler.stop();
        assert!(!scheduler.fire_due(1_000_000));
    }

    #[test]
    fn interval_changes_apply_to_subsequent_deadlines() {
        let mut scheduler = TickScheduler::new(100);
        scheduler.start(0);
        assert!(scheduler.fire_due(100));
        scheduler.set_interval(50);
        // The already-scheduled deadline used the old interval.
        assert!(scheduler.fire_due(200));
        assert!(scheduler.fire_due(250));
    }

    #[test]
    fn restart_replaces_the_previous_schedule() {
        let mut scheduler = TickScheduler::new(100);
        scheduler.start(0);
        scheduler.start(1_000);
        assert!(!scheduler.fire_due(500));
        assert!(scheduler.fire_due(1_100));
    }
}
