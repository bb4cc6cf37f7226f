// Fixed-capacity rolling window backing the display.
//
// Samples live in three parallel arrays indexed identically, with
// `write_index` marking the end of the valid prefix. When a batch does not
// fit, the newest entries are compacted to the front down to a target
// occupancy below capacity, so eviction happens in bulk rather than on every
// ingest once the window is full.

use serde::Serialize;

use crate::error::{Result, TelemetryError};
use crate::pipeline::sample::Sample;

pub const DEFAULT_WINDOW_CAPACITY: usize = 10_000;
pub const DEFAULT_MIN_VISIBLE_RANGE_SECS: f64 = 60.0;
pub const DEFAULT_EVICTION_TARGET_FRACTION: f64 = 0.95;

/// One row of the window as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowEntry {
    pub timestamp: f64,
    pub series_a: f64,
    pub series_b: f64,
}

/// Time span the display should cover. `end` may lie past the newest sample
/// when the stored span is shorter than the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibleRange {
    pub start: f64,
    pub end: f64,
}

impl VisibleRange {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

pub struct SlidingWindow {
    timestamps: Vec<f64>,
    series_a: Vec<f64>,
    series_b: Vec<f64>,
    write_index: usize,
    capacity: usize,
    min_visible_range_secs: f64,
    eviction_target: usize,
    visible_range: Option<VisibleRange>,
    truncated: u64,
    evicted: u64,
}

impl SlidingWindow {
    pub fn new(capacity: usize, min_visible_range_secs: f64) -> Result<Self> {
        Self::with_eviction_target(
            capacity,
            min_visible_range_secs,
            DEFAULT_EVICTION_TARGET_FRACTION,
        )
    }

    /// Build a window whose compaction keeps `floor(capacity * fraction) - 1`
    /// entries (or fewer, if the incoming batch needs the room).
    pub fn with_eviction_target(
        capacity: usize,
        min_visible_range_secs: f64,
        fraction: f64,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(TelemetryError::invalid(
                "window.capacity",
                "capacity must be greater than zero",
            ));
        }
        if !min_visible_range_secs.is_finite() || min_visible_range_secs <= 0.0 {
            return Err(TelemetryError::invalid(
                "window.min_visible_range_secs",
                format!("expected a positive number of seconds, got {min_visible_range_secs}"),
            ));
        }
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(TelemetryError::invalid(
                "window.eviction_target_fraction",
                format!("expected a fraction in (0, 1], got {fraction}"),
            ));
        }

        let eviction_target = ((capacity as f64 * fraction).floor() as usize).saturating_sub(1);

        Ok(Self {
            timestamps: vec![0.0; capacity],
            series_a: vec![0.0; capacity],
            series_b: vec![0.0; capacity],
            write_index: 0,
            capacity,
            min_visible_range_secs,
            eviction_target,
            visible_range: None,
            truncated: 0,
            evicted: 0,
        })
    }

    /// Append a time-ordered batch, evicting the oldest entries first if the
    /// batch does not fit in the trailing free space.
    ///
    /// Returns the number of batch entries discarded because the batch alone
    /// exceeded the window capacity.
    pub fn ingest(&mut self, batch: &[Sample]) -> usize {
        if batch.is_empty() {
            return 0;
        }

        // Only the newest `capacity` entries of an oversized batch can ever be kept.
        let dropped = batch.len().saturating_sub(self.capacity);
        let batch = &batch[dropped..];
        self.truncated += dropped as u64;

        if self.write_index + batch.len() >= self.capacity {
            self.compact(self.eviction_target.min(self.capacity - batch.len()));
        }

        let end = self.write_index + batch.len();
        for (slot, sample) in (self.write_index..end).zip(batch) {
            self.timestamps[slot] = sample.elapsed_time;
            self.series_a[slot] = sample.series_a;
            self.series_b[slot] = sample.series_b;
        }
        self.write_index = end;

        self.update_visible_range();
        dropped
    }

    /// Keep the newest `occupancy` entries, moved down to the front.
    fn compact(&mut self, occupancy: usize) {
        let src = self.write_index - occupancy..self.write_index;
        self.timestamps.copy_within(src.clone(), 0);
        self.series_a.copy_within(src.clone(), 0);
        self.series_b.copy_within(src, 0);
        self.evicted += (self.write_index - occupancy) as u64;
        self.write_index = occupancy;
    }

    fn update_visible_range(&mut self) {
        if self.write_index == 0 {
            self.visible_range = None;
            return;
        }
        let start = self.timestamps[0];
        let mut end = self.timestamps[self.write_index - 1];
        if end - start < self.min_visible_range_secs {
            end = start + self.min_visible_range_secs;
        }
        self.visible_range = Some(VisibleRange { start, end });
    }

    /// The newest `min(n, len)` entries in chronological order, or nothing
    /// when fewer than `min_required` entries are stored.
    pub fn snapshot(&self, n: usize, min_required: usize) -> Vec<WindowEntry> {
        if self.write_index < min_required {
            return Vec::new();
        }
        let start = self.write_index.saturating_sub(n);
        (start..self.write_index).map(|i| self.entry(i)).collect()
    }

    pub fn latest(&self) -> Option<WindowEntry> {
        self.write_index.checked_sub(1).map(|i| self.entry(i))
    }

    fn entry(&self, i: usize) -> WindowEntry {
        WindowEntry {
            timestamp: self.timestamps[i],
            series_a: self.series_a[i],
            series_b: self.series_b[i],
        }
    }

    pub fn len(&self) -> usize {
        self.write_index
    }

    pub fn is_empty(&self) -> bool {
        self.write_index == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps[..self.write_index]
    }

    pub fn series_a(&self) -> &[f64] {
        &self.series_a[..self.write_index]
    }

    pub fn series_b(&self) -> &[f64] {
        &self.series_b[..self.write_index]
    }

    /// Range computed by the most recent non-empty ingest.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    /// Total batch entries discarded because a single batch exceeded capacity.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Total stored entries removed by compaction.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
