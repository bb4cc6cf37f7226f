// Double-buffered sample queue: the producer appends into the active buffer
// while the consumer owns the standby buffer. A drain swaps the two under the
// lock, so the consumer walks the drained batch without holding it.
//
// Both buffers are allocated once at construction and only their ownership
// moves afterwards; `produce` never grows a buffer past its capacity.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, TelemetryError};

/// Default number of samples each buffer can hold between drains.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

struct ActiveBuffer<T> {
    items: Vec<T>,
    rejected: u64,
    swaps: u64,
}

struct Shared<T> {
    active: Mutex<ActiveBuffer<T>>,
    capacity: usize,
}

impl<T> Shared<T> {
    fn pending(&self) -> usize {
        self.active.lock().items.len()
    }

    fn rejected(&self) -> u64 {
        self.active.lock().rejected
    }
}

/// Writing half of the queue, handed to the generator thread.
pub struct QueueProducer<T> {
    shared: Arc<Shared<T>>,
}

/// Reading half of the queue. Holds the standby buffer, which is the batch
/// returned by the most recent `drain`.
pub struct QueueConsumer<T> {
    shared: Arc<Shared<T>>,
    standby: Vec<T>,
}

/// Create a double-buffered queue with two buffers of `capacity` items each.
///
/// Returns the producer and consumer halves. Fails if `capacity` is zero.
pub fn double_buffered<T>(capacity: usize) -> Result<(QueueProducer<T>, QueueConsumer<T>)> {
    if capacity == 0 {
        return Err(TelemetryError::invalid(
            "queue.capacity",
            "capacity must be greater than zero",
        ));
    }

    let shared = Arc::new(Shared {
        active: Mutex::new(ActiveBuffer {
            items: Vec::with_capacity(capacity),
            rejected: 0,
            swaps: 0,
        }),
        capacity,
    });

    let producer = QueueProducer {
        shared: Arc::clone(&shared),
    };
    let consumer = QueueConsumer {
        shared,
        standby: Vec::with_capacity(capacity),
    };
    Ok((producer, consumer))
}

impl<T> QueueProducer<T> {
    /// Append `item` to the active buffer.
    ///
    /// Returns `false` when the buffer is already full; the item is dropped
    /// and counted in [`QueueProducer::rejected`].
    pub fn produce(&self, item: T) -> bool {
        let mut active = self.shared.active.lock();
        if active.items.len() < self.shared.capacity {
            active.items.push(item);
            true
        } else {
            active.rejected += 1;
            false
        }
    }

    pub fn pending(&self) -> usize {
        self.shared.pending()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Total samples dropped because the active buffer was full.
    pub fn rejected(&self) -> u64 {
        self.shared.rejected()
    }
}

impl<T> QueueConsumer<T> {
    /// Take everything produced since the previous drain.
    ///
    /// The returned batch borrows the consumer, so it must be released
    /// before the next call: that buffer becomes the write target again.
    pub fn drain(&mut self) -> &[T] {
        self.standby.clear();
        {
            let mut active = self.shared.active.lock();
            std::mem::swap(&mut active.items, &mut self.standby);
            active.swaps += 1;
        }
        &self.standby
    }

    pub fn pending(&self) -> usize {
        self.shared.pending()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn rejected(&self) -> u64 {
        self.shared.rejected()
    }

    /// Number of drains performed so far.
    pub fn swaps(&self) -> u64 {
        self.shared.active.lock().swaps
    }
}
