use std::collections::VecDeque;
use std::ops::Range;

/// Index range of the last `count` units out of `total`.
///
/// Never pads: a `count` larger than `total` yields the whole input.
pub fn window(total: usize, count: usize) -> Range<usize> {
    total.saturating_sub(count)..total
}

/// The trailing `count` items of `items`, in original order.
pub fn tail_slice<T>(items: &[T], count: usize) -> &[T] {
    &items[window(items.len(), count)]
}

/// Fixed-capacity window over a stream of units.
///
/// Keeps only the `capacity` most recently pushed units, so memory stays
/// bounded by the requested count instead of the stream length.
#[derive(Debug)]
pub struct TailRing<T> {
    items: VecDeque<T>,
    capacity: usize,
    seen: usize,
}

impl<T> TailRing<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // Don't trust huge counts for preallocation
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            seen: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        self.seen += 1;
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Total number of units pushed, including evicted ones
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_window_shorter_than_total() {
        assert_eq!(window(15, 10), 5..15);
    }

    #[test]
    fn test_window_boundaries() {
        assert_eq!(window(0, 10), 0..0);
        assert_eq!(window(0, 0), 0..0);
        assert_eq!(window(7, 0), 7..7);
        assert_eq!(window(7, 7), 0..7);
        assert_eq!(window(7, 100), 0..7);
        assert_eq!(window(1, 1), 0..1);
    }

    #[test]
    fn test_window_length_is_min_of_count_and_total() {
        for total in 0..20 {
            for count in 0..25 {
                let range = window(total, count);
                assert_eq!(range.len(), count.min(total));
                assert_eq!(range.end, total);
            }
        }
    }

    #[test]
    fn test_tail_slice_keeps_order() {
        let lines = numbered(5);
        assert_eq!(tail_slice(&lines, 3), &["3", "4", "5"]);
        assert_eq!(tail_slice(&lines, 100), lines.as_slice());
        assert!(tail_slice(&lines, 0).is_empty());
    }

    #[test]
    fn test_tail_slice_bytes() {
        let data = b"hello world";
        assert_eq!(tail_slice(data, 5), b"world");
        assert_eq!(tail_slice(data, 0), b"");
        assert_eq!(tail_slice(&data[..0], 3), b"");
    }

    #[test]
    fn test_tail_slice_is_repeatable() {
        let lines = numbered(12);
        assert_eq!(tail_slice(&lines, 4), tail_slice(&lines, 4));
    }

    #[test]
    fn test_ring_matches_slice() {
        for total in 0..15 {
            for count in 0..18 {
                let lines = numbered(total);
                let mut ring = TailRing::with_capacity(count);
                for line in lines.iter().cloned() {
                    ring.push(line);
                }
                assert_eq!(ring.seen(), total);
                assert_eq!(ring.into_vec(), tail_slice(&lines, count).to_vec());
            }
        }
    }

    #[test]
    fn test_ring_zero_capacity_retains_nothing() {
        let mut ring = TailRing::with_capacity(0);
        ring.push(1u8);
        ring.push(2u8);
        assert_eq!(ring.seen(), 2);
        assert!(ring.into_vec().is_empty());
    }

    #[test]
    fn test_ring_huge_capacity() {
        let mut ring = TailRing::with_capacity(usize::MAX);
        ring.push("only line");
        assert_eq!(ring.into_vec(), vec!["only line"]);
    }
}
