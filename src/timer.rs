use std::time::{Duration, Instant};

/// Stopwatch for the running download.
#[derive(Debug, Clone)]
pub struct ElapsedTimer {
    started: Option<Instant>,
    frozen: Option<Duration>,
    running: bool,
    interval: Duration,
}

impl ElapsedTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            started: None,
            frozen: None,
            running: false,
            interval,
        }
    }

    /// Start from zero. A second call restarts the clock.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.frozen = None;
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            self.frozen = Some(self.elapsed());
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_started(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match (self.running, self.frozen, self.started) {
            (true, _, Some(start)) => start.elapsed(),
            (false, Some(frozen), _) => frozen,
            _ => Duration::ZERO,
        }
    }

    /// Elapsed time rounded down to the tick interval, e.g. `1m 2s 300ms`.
    pub fn display(&self) -> String {
        let step = self.interval.as_millis().max(1);
        let millis = self.elapsed().as_millis() / step * step;
        let shown = Duration::from_millis(millis as u64);
        if shown.is_zero() {
            "0s".into()
        } else {
            humantime::format_duration(shown).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn inert_until_started() {
        let t = ElapsedTimer::new(Duration::from_millis(100));
        assert!(!t.has_started());
        assert!(!t.is_running());
        assert_eq!(t.elapsed(), Duration::ZERO);
        assert_eq!(t.display(), "0s");
    }

    #[test]
    fn stop_freezes_value() {
        let mut t = ElapsedTimer::new(Duration::from_millis(1));
        t.start();
        sleep(Duration::from_millis(20));
        t.stop();
        let frozen = t.elapsed();
        assert!(frozen >= Duration::from_millis(20));
        sleep(Duration::from_millis(10));
        assert_eq!(t.elapsed(), frozen);
        assert!(!t.is_running());
    }

    #[test]
    fn restart_resets_clock() {
        let mut t = ElapsedTimer::new(Duration::from_millis(1));
        t.start();
        sleep(Duration::from_millis(30));
        t.stop();
        t.start();
        assert!(t.elapsed() < Duration::from_millis(30));
    }

    #[test]
    fn display_rounds_to_interval() {
        let mut t = ElapsedTimer::new(Duration::from_secs(3600));
        t.start();
        t.stop();
        assert_eq!(t.display(), "0s");
    }
}
