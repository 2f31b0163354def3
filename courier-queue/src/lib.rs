use std::collections::VecDeque;

/// FIFO container over opaque handles.
///
/// Invalidated entries are never removed at invalidation time; they are
/// discarded lazily by the next `dequeue_next_valid` scan. The validity
/// predicate is supplied by the caller, keeping the queue free of any
/// domain semantics.
#[derive(Debug, Clone, Default)]
pub struct FifoQueue<T> {
    entries: VecDeque<T>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue exhausted without a valid entry")]
    Exhausted,
}

impl<T: Copy + PartialEq> FifoQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry at the tail.
    pub fn enqueue(&mut self, id: T) {
        self.entries.push_back(id);
    }

    /// Scan from the head, discarding entries that fail `is_valid`, and
    /// return the first entry that passes.
    ///
    /// Discarded entries stay discarded even when the scan fails with
    /// `Exhausted`; a rejected call leaves the queue drained of the invalid
    /// prefix it inspected.
    pub fn dequeue_next_valid<F>(&mut self, is_valid: F) -> Result<T, QueueError>
    where
        F: Fn(&T) -> bool,
    {
        while let Some(id) = self.entries.pop_front() {
            if is_valid(&id) {
                return Ok(id);
            }
        }
        Err(QueueError::Exhausted)
    }

    /// Number of entries in the live window, counting not-yet-discarded
    /// invalid entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Structural membership over the live window, without validity
    /// filtering.
    pub fn contains(&self, id: &T) -> bool {
        self.entries.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_enqueue_grows_size() {
        let mut queue = FifoQueue::new();
        assert_eq!(queue.size(), 0);

        queue.enqueue(Uuid::new_v4());
        assert_eq!(queue.size(), 1);
    }

    #[test]
    fn test_dequeue_returns_insertion_order() {
        let mut queue = FifoQueue::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        for id in &ids {
            queue.enqueue(*id);
        }

        for expected in &ids {
            let got = queue.dequeue_next_valid(|_| true).unwrap();
            assert_eq!(got, *expected);
        }
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn test_dequeue_skips_invalid_entries() {
        let mut queue = FifoQueue::new();
        let stale = Uuid::new_v4();
        let live = Uuid::new_v4();

        queue.enqueue(stale);
        queue.enqueue(live);

        let got = queue.dequeue_next_valid(|id| *id == live).unwrap();
        assert_eq!(got, live);
        // The skipped entry was discarded, not re-queued
        assert!(!queue.contains(&stale));
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn test_dequeue_empty_fails() {
        let mut queue: FifoQueue<Uuid> = FifoQueue::new();
        let result = queue.dequeue_next_valid(|_| true);
        assert_eq!(result, Err(QueueError::Exhausted));
    }

    #[test]
    fn test_failed_scan_still_discards() {
        let mut queue = FifoQueue::new();
        let stale = Uuid::new_v4();
        queue.enqueue(stale);

        let result = queue.dequeue_next_valid(|_| false);
        assert_eq!(result, Err(QueueError::Exhausted));
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn test_contains_ignores_validity() {
        let mut queue = FifoQueue::new();
        let id = Uuid::new_v4();
        queue.enqueue(id);

        // Membership is structural; the queue knows nothing about validity
        assert!(queue.contains(&id));
        assert!(!queue.contains(&Uuid::new_v4()));
    }
}
