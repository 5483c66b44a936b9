use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    priority: i64,
    seq: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then lower sequence number first
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ready tasks keyed by `(priority desc, submission order asc)`.
#[derive(Debug, Default)]
pub(crate) struct ReadyQueue {
    heap: BinaryHeap<Entry>,
}

impl ReadyQueue {
    pub fn push(&mut self, seq: usize, priority: i64) {
        self.heap.push(Entry { priority, seq });
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|e| e.seq)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_by_priority_then_submission_order() {
        let mut queue = ReadyQueue::default();
        queue.push(0, 1);
        queue.push(1, 5);
        queue.push(2, 1);
        queue.push(3, 5);
        queue.push(4, -2);
        assert_eq!(queue.len(), 5);

        let order: Vec<usize> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(order, vec![1, 3, 0, 2, 4]);
        assert!(queue.is_empty());
    }
}
