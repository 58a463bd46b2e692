//! Wall-clock durations of pipeline steps

use std::time::{Duration, Instant};

use tracing::info;

/// Duration of one named step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Steps in the order they finished. A step run twice appears twice.
#[derive(Debug, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        self.steps.push(StepTiming { name, duration });
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// One `info` event per step with its share of the total, then the total.
    pub fn log_summary(&self) {
        let total = self.total_duration().as_secs_f64();
        for step in &self.steps {
            let secs = step.duration.as_secs_f64();
            let share = if total > 0.0 { secs / total * 100.0 } else { 0.0 };
            info!(step = step.name, ms = secs * 1000.0, share = %format!("{share:.1}%"), "Step timing");
        }
        info!(ms = total * 1000.0, "Pipeline total");
    }
}

/// Measures one step from `start` until `record`.
pub struct Timer {
    name: &'static str,
    started: Instant,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            started: Instant::now(),
        }
    }

    pub fn record(self, timings: &mut PipelineTimings) {
        timings.add_step(self.name, self.started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_keep_finish_order() {
        let mut timings = PipelineTimings::new();
        timings.add_step("decode", Duration::from_millis(3));
        timings.add_step("filter", Duration::from_millis(10));
        timings.add_step("decode", Duration::from_millis(2));

        let names: Vec<_> = timings.steps().iter().map(|s| s.name).collect();
        assert_eq!(names, ["decode", "filter", "decode"]);
        assert_eq!(timings.total_duration(), Duration::from_millis(15));
    }

    #[test]
    fn test_timer_records_elapsed_time() {
        let mut timings = PipelineTimings::new();
        let timer = Timer::start("filter");
        std::thread::sleep(Duration::from_millis(2));
        timer.record(&mut timings);

        assert_eq!(timings.steps().len(), 1);
        assert_eq!(timings.steps()[0].name, "filter");
        assert!(timings.steps()[0].duration >= Duration::from_millis(2));
        timings.log_summary();
    }

    #[test]
    fn test_empty_summary() {
        let timings = PipelineTimings::new();
        assert_eq!(timings.total_duration(), Duration::ZERO);
        timings.log_summary();
    }
}
