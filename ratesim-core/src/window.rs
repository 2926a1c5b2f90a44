//! Bounded first-in-first-out windows
//!
//! The server's timestamp window, the driver's sample retention and the
//! StatsLerp history all keep "the most recent N things" or "the things newer
//! than T". [`SlidingWindow`] covers both: a count capacity enforced on every
//! push, and [`SlidingWindow::evict_while`] for age-based trimming.

use std::collections::{vec_deque, VecDeque};

/// FIFO window that evicts its oldest entries first.
///
/// # Examples
///
/// ```
/// use ratesim_core::window::SlidingWindow;
///
/// let mut window = SlidingWindow::bounded(2);
/// window.push(1);
/// window.push(2);
/// assert_eq!(window.push(3), 1);
/// assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    /// Maximum retained entries, `None` for unbounded
    capacity: Option<usize>,
    total_pushed: u64,
    total_evicted: u64,
}

impl<T> Default for SlidingWindow<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            total_pushed: 0,
            total_evicted: 0,
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Appends `item` and trims to capacity. Returns how many entries were evicted.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push_back(item);
        self.total_pushed += 1;
        self.trim_to_capacity()
    }

    /// Changes the capacity, evicting the oldest entries if the window shrank.
    pub fn set_capacity(&mut self, capacity: Option<usize>) -> usize {
        self.capacity = capacity;
        self.trim_to_capacity()
    }

    /// Pops from the front while `predicate` holds for the oldest entry.
    pub fn evict_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut evicted = 0;
        while self.items.front().is_some_and(&mut predicate) {
            self.items.pop_front();
            evicted += 1;
        }
        self.total_evicted += evicted as u64;
        evicted
    }

    fn trim_to_capacity(&mut self) -> usize {
        let Some(capacity) = self.capacity else {
            return 0;
        };
        let excess = self.items.len().saturating_sub(capacity);
        self.items.drain(..excess);
        self.total_evicted += excess as u64;
        excess
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest retained entry.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest retained entry.
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }
}

impl<T: Clone> SlidingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a SlidingWindow<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_capacity_evicts_oldest() {
        let mut window = SlidingWindow::bounded(3);
        for i in 0..5 {
            window.push(i);
        }
        assert_eq!(window.to_vec(), vec![2, 3, 4]);
        assert_eq!(window.total_pushed(), 5);
        assert_eq!(window.total_evicted(), 2);
    }

    #[test]
    fn test_shrinking_capacity_trims() {
        let mut window = SlidingWindow::bounded(5);
        for i in 0..5 {
            window.push(i);
        }
        assert_eq!(window.set_capacity(Some(2)), 3);
        assert_eq!(window.to_vec(), vec![3, 4]);

        // Growing never resurrects anything
        assert_eq!(window.set_capacity(None), 0);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut window = SlidingWindow::bounded(0);
        assert_eq!(window.push("a"), 1);
        assert!(window.is_empty());
    }

    #[test]
    fn test_evict_while_stops_at_first_keeper() {
        let mut window = SlidingWindow::unbounded();
        for t in [1.0, 2.0, 10.0, 3.0] {
            window.push(t);
        }
        // Only a prefix is removed even though 3.0 would also match
        assert_eq!(window.evict_while(|t| *t < 5.0), 2);
        assert_eq!(window.to_vec(), vec![10.0, 3.0]);
        assert_eq!(window.front(), Some(&10.0));
        assert_eq!(window.back(), Some(&3.0));
    }
}
