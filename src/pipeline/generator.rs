// Synthetic sample source: a seeded two-series random walk pushed into the
// queue on a fixed cadence until the shutdown token is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::pipeline::queue::QueueProducer;
use crate::pipeline::sample::Sample;

/// Two independent random walks reflected at `0` and `upper_limit`.
pub struct RandomWalk {
    rng: StdRng,
    series_a: f64,
    series_b: f64,
    upper_limit: f64,
    step_scale: f64,
}

impl RandomWalk {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            series_a: config.initial_a,
            series_b: config.initial_b,
            upper_limit: config.upper_limit,
            // Step size grows with the sampling interval.
            step_scale: (config.interval_ms as f64 * 0.1).sqrt(),
        }
    }

    /// Advance both series one step and return the new values.
    pub fn step(&mut self) -> (f64, f64) {
        self.series_a = self.advance(self.series_a);
        self.series_b = self.advance(self.series_b);
        (self.series_a, self.series_b)
    }

    fn advance(&mut self, value: f64) -> f64 {
        let delta = (self.rng.gen::<f64>() - 0.5) * self.step_scale;
        let next = (value + delta).abs();
        if next > self.upper_limit {
            self.upper_limit * 2.0 - next
        } else {
            next
        }
    }
}

/// Counters reported by the generator when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub produced: u64,
    pub dropped: u64,
}

/// Produce samples every `interval_ms` until `shutdown` is set.
///
/// Timestamps are seconds since this function started. Deadlines advance by
/// one interval per sample; if the loop falls behind, the schedule restarts
/// from now instead of bursting to catch up.
pub fn run_generator(
    producer: QueueProducer<Sample>,
    config: &GeneratorConfig,
    shutdown: Arc<AtomicBool>,
) -> GeneratorStats {
    let interval = Duration::from_millis(config.interval_ms);
    let mut walk = RandomWalk::new(config);
    let mut stats = GeneratorStats::default();

    let start = Instant::now();
    let mut next_deadline = start;

    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        let elapsed = now.duration_since(start).as_secs_f64();
        let (series_a, series_b) = walk.step();

        if producer.produce(Sample::new(elapsed, series_a, series_b)) {
            stats.produced += 1;
        } else {
            stats.dropped += 1;
            tracing::debug!("Queue full, dropped sample at {:.3}s", elapsed);
        }

        next_deadline += interval;
        if next_deadline <= now {
            next_deadline = now + interval;
        }
        std::thread::sleep(next_deadline - now);
    }

    tracing::info!(
        "Generator stopped: {} produced, {} dropped",
        stats.produced,
        stats.dropped
    );
    stats
}
