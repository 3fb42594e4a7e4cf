use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use human_repr::{HumanCount, HumanDuration};
use serde::Serialize;
use sysinfo::{get_current_pid, ProcessExt, System, SystemExt};

/// Throughput accounting of an attack.
/// The counters can be updated from several workers at once.
#[derive(Debug, Default)]
pub struct Statistics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    hashes_processed: AtomicU64,
    passwords_tried: AtomicU64,
    passwords_found: AtomicU64,
    peak_memory: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the clock.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    /// Stops the clock and samples the memory usage.
    pub fn stop(&mut self) {
        self.end_time = Some(Instant::now());
        self.sample_memory();
    }

    pub fn add_hashes(&self, count: u64) {
        self.hashes_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_passwords(&self, count: u64) {
        self.passwords_tried.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_found(&self, count: u64) {
        self.passwords_found.fetch_add(count, Ordering::Relaxed);
    }

    pub fn hashes_processed(&self) -> u64 {
        self.hashes_processed.load(Ordering::Relaxed)
    }

    pub fn passwords_tried(&self) -> u64 {
        self.passwords_tried.load(Ordering::Relaxed)
    }

    pub fn passwords_found(&self) -> u64 {
        self.passwords_found.load(Ordering::Relaxed)
    }

    /// The peak resident memory of the process seen so far, in bytes.
    pub fn peak_memory(&self) -> u64 {
        self.peak_memory.load(Ordering::Relaxed)
    }

    /// Records the current resident memory of the process if it is a new peak.
    pub fn sample_memory(&self) {
        let Ok(pid) = get_current_pid() else {
            return;
        };

        let mut sys = System::new();
        if !sys.refresh_process(pid) {
            return;
        }

        if let Some(process) = sys.process(pid) {
            self.peak_memory
                .fetch_max(process.memory(), Ordering::Relaxed);
        }
    }

    /// The time elapsed since the start, up to the stop if the clock is stopped.
    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// The number of candidates tried per second.
    pub fn speed(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();

        if elapsed > 0. {
            self.passwords_tried() as f64 / elapsed
        } else {
            0.
        }
    }

    /// The estimated time left to try `total` candidates, unknown before the first candidate.
    pub fn eta(&self, total: u64) -> Option<Duration> {
        let speed = self.speed();
        if speed <= 0. {
            return None;
        }

        let remaining = total.saturating_sub(self.passwords_tried());
        Some(Duration::from_secs((remaining as f64 / speed) as u64))
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            elapsed: self.elapsed(),
            hashes_processed: self.hashes_processed(),
            passwords_tried: self.passwords_tried(),
            passwords_found: self.passwords_found(),
            speed: self.speed(),
            peak_memory: self.peak_memory(),
        }
    }
}

/// Formats an ETA with its two most significant units, such as `3m 12s` or `2d 5h`.
pub fn format_eta(eta: Option<Duration>) -> String {
    let Some(eta) = eta else {
        return "N/A".to_owned();
    };

    let seconds = eta.as_secs();
    match seconds {
        0..=59 => format!("{seconds}s"),
        60..=3_599 => format!("{}m {}s", seconds / 60, seconds % 60),
        3_600..=86_399 => format!("{}h {}m", seconds / 3_600, seconds % 3_600 / 60),
        _ => format!("{}d {}h", seconds / 86_400, seconds % 86_400 / 3_600),
    }
}

/// A snapshot of the statistics of an attack.
#[derive(Clone, Debug, Serialize)]
pub struct StatsReport {
    pub elapsed: Duration,
    pub hashes_processed: u64,
    pub passwords_tried: u64,
    pub passwords_found: u64,
    /// Candidates per second.
    pub speed: f64,
    /// Bytes.
    pub peak_memory: u64,
}

impl Display for StatsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<20} {}",
            "Time elapsed",
            self.elapsed.as_secs_f64().human_duration()
        )?;
        writeln!(f, "{:<20} {}", "Hashes processed", self.hashes_processed)?;
        writeln!(f, "{:<20} {}", "Passwords tried", self.passwords_tried)?;
        writeln!(f, "{:<20} {}", "Passwords found", self.passwords_found)?;
        writeln!(f, "{:<20} {:.2} p/s", "Speed", self.speed)?;
        write!(
            f,
            "{:<20} {}",
            "Peak memory",
            self.peak_memory.human_count_bytes()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_format_eta() {
        assert_eq!("N/A", format_eta(None));
        assert_eq!("42s", format_eta(Some(Duration::from_secs(42))));
        assert_eq!("3m 12s", format_eta(Some(Duration::from_secs(192))));
        assert_eq!("2h 1m", format_eta(Some(Duration::from_secs(7_260))));
        assert_eq!("2d 5h", format_eta(Some(Duration::from_secs(190_800))));
    }

    #[test]
    fn test_peak_memory_keeps_maximum() {
        let stats = Statistics::new();
        stats.sample_memory();
        assert!(stats.peak_memory() > 0);

        stats.peak_memory.store(u64::MAX, Ordering::Relaxed);
        stats.sample_memory();
        assert_eq!(u64::MAX, stats.peak_memory());
    }

    #[test]
    fn test_counters_from_threads() {
        let stats = Statistics::new();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.add_passwords(10);
                    }
                    stats.add_hashes(1);
                });
            }
        });

        assert_eq!(4_000, stats.passwords_tried());
        assert_eq!(4, stats.hashes_processed());
        assert_eq!(0, stats.passwords_found());
    }

    #[test]
    fn test_speed_and_eta() {
        let mut stats = Statistics::new();
        assert_eq!(0., stats.speed());
        assert_eq!(None, stats.eta(100));

        stats.start();
        stats.add_passwords(1_000);
        thread::sleep(Duration::from_millis(20));
        stats.stop();

        assert!(stats.speed() > 0.);
        assert!(stats.elapsed() >= Duration::from_millis(20));
        assert_eq!(Some(Duration::ZERO), stats.eta(1_000));
        // the clock is stopped
        assert_eq!(stats.elapsed(), stats.elapsed());
    }

    #[test]
    fn test_report() {
        let mut stats = Statistics::new();
        stats.start();
        stats.add_found(2);
        stats.stop();

        let report = stats.report();
        assert_eq!(2, report.passwords_found);
        assert!(report.to_string().contains("Passwords found"));
    }
}
