// Session orchestrator: spawns the generator thread and runs the consumer
// loop on the calling thread.
//
// - Generator thread: random walk -> queue producer.
// - Consumer (caller's thread): drain -> window -> render, every poll interval.
//
// Both stop when the shared shutdown token is set, either by the caller
// (Ctrl+C handler) or by the session itself when the run duration elapses.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::config::Config;
use crate::pipeline::driver::run_cycle;
use crate::pipeline::generator::{run_generator, GeneratorStats};
use crate::pipeline::queue::{double_buffered, QueueConsumer};
use crate::pipeline::sample::Sample;
use crate::pipeline::window::SlidingWindow;
use crate::render;

/// Granularity of the consumer's sleep, so shutdown is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Stop after this long. Runs until shutdown when `None`.
    pub duration: Option<Duration>,
    /// Emit JSON lines instead of a table.
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub cycles: u64,
    pub ingested: u64,
    pub generator: GeneratorStats,
    pub rejected: u64,
    pub truncated: u64,
    pub evicted: u64,
    pub window_len: usize,
}

pub fn run_session(
    config: &Config,
    options: &SessionOptions,
    shutdown: Arc<AtomicBool>,
    out: &mut impl Write,
) -> Result<SessionSummary> {
    config.validate()?;

    let (producer, mut consumer) = double_buffered::<Sample>(config.queue.capacity)?;
    let mut window = SlidingWindow::with_eviction_target(
        config.window.capacity,
        config.window.min_visible_range_secs,
        config.window.eviction_target_fraction,
    )?;

    // --- Generator thread ---
    let generator_config = config.generator.clone();
    let generator_shutdown = shutdown.clone();
    let generator_handle = std::thread::Builder::new()
        .name("generator".into())
        .spawn(move || run_generator(producer, &generator_config, generator_shutdown))?;

    tracing::info!(
        "Session started: queue capacity {}, window capacity {}, polling every {} ms",
        config.queue.capacity,
        config.window.capacity,
        config.display.poll_interval_ms
    );

    let mut summary = SessionSummary::default();
    let outcome = consume(
        config,
        options,
        &shutdown,
        &mut consumer,
        &mut window,
        out,
        &mut summary,
    );

    // Stop the generator whether the loop ended cleanly or not.
    shutdown.store(true, Ordering::Relaxed);
    summary.generator = generator_handle
        .join()
        .map_err(|_| anyhow!("generator thread panicked"))?;
    outcome?;

    // Pick up whatever the generator produced after the last cycle.
    summary.ingested += run_cycle(&mut consumer, &mut window) as u64;
    summary.rejected = consumer.rejected();
    summary.truncated = window.truncated();
    summary.evicted = window.evicted();
    summary.window_len = window.len();

    tracing::info!(
        "Session complete: {} cycles, {} samples ingested, {} dropped",
        summary.cycles,
        summary.ingested,
        summary.rejected
    );
    Ok(summary)
}

fn consume(
    config: &Config,
    options: &SessionOptions,
    shutdown: &AtomicBool,
    consumer: &mut QueueConsumer<Sample>,
    window: &mut SlidingWindow,
    out: &mut impl Write,
    summary: &mut SessionSummary,
) -> Result<()> {
    let started = Instant::now();
    // A duration too long to add to an Instant never elapses.
    let deadline = options.duration.and_then(|d| started.checked_add(d));
    if options.duration.is_some() && deadline.is_none() {
        tracing::warn!("Run duration too long, running until shutdown");
    }
    let poll_interval = Duration::from_millis(config.display.poll_interval_ms);
    let stats_interval = Duration::from_secs(config.display.stats_interval_secs);

    let mut last_stats = started;
    let mut last_rejected = 0;

    while !shutdown.load(Ordering::Relaxed) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::info!("Run duration elapsed");
            break;
        }

        summary.ingested += run_cycle(consumer, window) as u64;
        summary.cycles += 1;

        let rows = window.snapshot(config.display.rows, config.display.min_rows);
        render::write_frame(out, &rows, window.visible_range(), options.json)?;

        if !stats_interval.is_zero() && last_stats.elapsed() >= stats_interval {
            last_rejected = log_stats(consumer, window, last_rejected);
            last_stats = Instant::now();
        }

        sleep_interruptible(poll_interval, shutdown, deadline);
    }

    Ok(())
}

/// Log pipeline health. Returns the rejected count for the next report.
fn log_stats(consumer: &QueueConsumer<Sample>, window: &SlidingWindow, last_rejected: u64) -> u64 {
    let rejected = consumer.rejected();
    if rejected > last_rejected {
        tracing::warn!(
            "Queue full: {} samples dropped since last report",
            rejected - last_rejected
        );
    }

    let range = window.visible_range();
    tracing::info!(
        pending = consumer.pending(),
        occupancy = window.len(),
        capacity = window.capacity(),
        truncated = window.truncated(),
        evicted = window.evicted(),
        range_start = range.map(|r| r.start),
        range_end = range.map(|r| r.end),
        "Pipeline stats"
    );
    rejected
}

/// Sleep for `duration` in small slices, returning early on shutdown or once
/// `deadline` passes.
fn sleep_interruptible(duration: Duration, shutdown: &AtomicBool, deadline: Option<Instant>) {
    let wake = match (Instant::now().checked_add(duration), deadline) {
        (Some(w), Some(d)) => Some(w.min(d)),
        (w, d) => w.or(d),
    };
    loop {
        let now = Instant::now();
        if shutdown.load(Ordering::Relaxed) || wake.is_some_and(|w| now >= w) {
            return;
        }
        let remaining = wake.map_or(SLEEP_SLICE, |w| w - now);
        std::thread::sleep(remaining.min(SLEEP_SLICE));
    }
}
