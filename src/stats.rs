//! Run-level throughput statistics.

use std::fmt;
use std::time::Duration;

/// Timing collected over one run of the frame loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Wall time of each processed frame: acquisition, detection and persistence.
    pub frame_times: Vec<Duration>,
    /// Frames whose output could not be persisted.
    pub frames_skipped: usize,
    /// Wall time of the whole loop.
    pub wall_time: Duration,
    /// CPU time consumed by the process, when the platform reports it.
    pub cpu_time: Option<Duration>,
}

impl RunStats {
    /// Frames that were detected and persisted.
    pub fn frames_processed(&self) -> usize {
        self.frame_times.len()
    }

    /// Mean per-frame time, zero when nothing was processed.
    pub fn mean_frame_time(&self) -> Duration {
        match self.frames_processed() {
            0 => Duration::ZERO,
            n => self.frame_times.iter().sum::<Duration>() / n as u32,
        }
    }

    /// Processed frames per second of wall time, zero for an empty or instantaneous run.
    pub fn fps(&self) -> f64 {
        let secs = self.wall_time.as_secs_f64();
        if secs > 0.0 {
            self.frames_processed() as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Statistics:")?;
        writeln!(f, "========================")?;
        writeln!(f, "Total frames processed: {}", self.frames_processed())?;
        if self.frames_skipped > 0 {
            writeln!(f, "Frames skipped: {}", self.frames_skipped)?;
        }
        writeln!(
            f,
            "Wall time (total): {:.3} seconds",
            self.wall_time.as_secs_f64()
        )?;
        match self.cpu_time {
            Some(cpu) => writeln!(f, "CPU time: {:.3} seconds", cpu.as_secs_f64())?,
            None => writeln!(f, "CPU time: unavailable")?,
        }
        writeln!(
            f,
            "Average time per frame: {:.3} seconds",
            self.mean_frame_time().as_secs_f64()
        )?;
        write!(f, "Average FPS: {:.2}", self.fps())
    }
}

/// User plus system CPU time consumed so far by this process.
#[cfg(unix)]
pub fn process_cpu_time() -> Option<Duration> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage only writes into the provided struct
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: getrusage returned success, so the struct is initialized
    let usage = unsafe { usage.assume_init() };
    Some(timeval_to_duration(usage.ru_utime) + timeval_to_duration(usage.ru_stime))
}

/// User plus system CPU time consumed so far by this process.
#[cfg(not(unix))]
pub fn process_cpu_time() -> Option<Duration> {
    None
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_reports_zeros() {
        let stats = RunStats::default();
        assert_eq!(stats.frames_processed(), 0);
        assert_eq!(stats.mean_frame_time(), Duration::ZERO);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn averages_over_processed_frames() {
        let stats = RunStats {
            frame_times: vec![Duration::from_millis(10), Duration::from_millis(30)],
            frames_skipped: 1,
            wall_time: Duration::from_millis(50),
            cpu_time: Some(Duration::from_millis(45)),
        };
        assert_eq!(stats.mean_frame_time(), Duration::from_millis(20));
        assert!((stats.fps() - 40.0).abs() < 1e-9);

        let report = stats.to_string();
        assert!(report.contains("Total frames processed: 2"));
        assert!(report.contains("Frames skipped: 1"));
        assert!(report.contains("CPU time: 0.045 seconds"));
        assert!(report.ends_with("Average FPS: 40.00"));
    }

    #[cfg(unix)]
    #[test]
    fn cpu_time_is_reported_on_unix() {
        let mut acc = 0u64;
        for i in 0..200_000u64 {
            acc = acc.wrapping_mul(31).wrapping_add(i);
        }
        std::hint::black_box(acc);
        assert!(process_cpu_time().is_some());
    }
}
