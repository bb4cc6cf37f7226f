use crate::pipeline::queue::QueueConsumer;
use crate::pipeline::sample::Sample;
use crate::pipeline::window::SlidingWindow;

/// Drain everything pending in the queue into the window.
///
/// Returns the number of samples drained. Must only be called from the
/// consumer thread; the `&mut` borrows keep both the consumer half and the
/// window single-writer.
pub fn run_cycle(consumer: &mut QueueConsumer<Sample>, window: &mut SlidingWindow) -> usize {
    let batch = consumer.drain();
    if batch.is_empty() {
        return 0;
    }

    let count = batch.len();
    let dropped = window.ingest(batch);
    if dropped > 0 {
        tracing::warn!(
            "Drained {} samples into a window of {}; discarded the oldest {}",
            count,
            window.capacity(),
            dropped
        );
    }
    tracing::trace!(count, occupancy = window.len(), "ingest cycle complete");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::queue::double_buffered;

    #[test]
    fn test_cycle_with_nothing_pending() {
        let (_producer, mut consumer) = double_buffered::<Sample>(8).unwrap();
        let mut window = SlidingWindow::new(8, 60.0).unwrap();

        assert_eq!(run_cycle(&mut consumer, &mut window), 0);
        assert!(window.is_empty());
        assert!(window.visible_range().is_none());
    }

    #[test]
    fn test_cycle_moves_pending_samples_into_window() {
        let (producer, mut consumer) = double_buffered::<Sample>(8).unwrap();
        let mut window = SlidingWindow::new(8, 60.0).unwrap();

        producer.produce(Sample::new(0.1, 32.0, 63.0));
        producer.produce(Sample::new(0.2, 33.0, 62.0));
        assert_eq!(run_cycle(&mut consumer, &mut window), 2);

        producer.produce(Sample::new(0.3, 34.0, 61.0));
        assert_eq!(run_cycle(&mut consumer, &mut window), 1);

        assert_eq!(window.timestamps(), &[0.1, 0.2, 0.3]);
        assert_eq!(window.series_b(), &[63.0, 62.0, 61.0]);
        assert_eq!(producer.pending(), 0);
    }

    #[test]
    fn test_cycle_with_queue_larger_than_window_truncates() {
        let (producer, mut consumer) = double_buffered::<Sample>(20).unwrap();
        let mut window = SlidingWindow::new(5, 60.0).unwrap();

        for i in 0..12 {
            producer.produce(Sample::new(i as f64, 0.0, 0.0));
        }
        assert_eq!(run_cycle(&mut consumer, &mut window), 12);

        assert_eq!(window.truncated(), 7);
        assert_eq!(window.timestamps(), &[7.0, 8.0, 9.0, 10.0, 11.0]);
    }
}
