//! Fixed-capacity FIFO windows and the numeric summaries computed over them.

use std::collections::VecDeque;

/// A bounded first-in-first-out window. Pushing past capacity evicts the
/// oldest element.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }
}

/// Median of a window of `f64`s, computed by sorting a local copy.
/// Empty window defaults to 0.
pub fn median(window: &SlidingWindow<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mut values: Vec<f64> = window.iter().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).expect("non-finite value in window"));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Arithmetic mean. Empty window defaults to 0.
pub fn mean(window: &SlidingWindow<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f64 = window.iter().sum();
    sum / window.len() as f64
}

/// Population standard deviation. Empty window defaults to 0.
pub fn stddev(window: &SlidingWindow<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let m = mean(window);
    let variance: f64 =
        window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / window.len() as f64;
    variance.sqrt()
}

/// Discrete derivative between two samples. Zero on non-positive `dt`.
pub fn acceleration(current: f64, previous: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else {
        (current - previous) / dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(values: &[f64], capacity: usize) -> SlidingWindow<f64> {
        let mut w = SlidingWindow::new(capacity);
        for v in values {
            w.push(*v);
        }
        w
    }

    #[test]
    fn push_past_capacity_evicts_oldest() {
        let mut w = SlidingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        w.push(3.0);
        w.push(4.0);
        let collected: Vec<f64> = w.iter().copied().collect();
        assert_eq!(collected, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn median_of_odd_length_window() {
        let w = window_of(&[5.0, 1.0, 3.0], 5);
        assert_eq!(median(&w), 3.0);
    }

    #[test]
    fn median_of_even_length_window_averages_middle_two() {
        let w = window_of(&[1.0, 2.0, 3.0, 4.0], 5);
        assert_eq!(median(&w), 2.5);
    }

    #[test]
    fn empty_window_defaults_to_zero() {
        let w: SlidingWindow<f64> = SlidingWindow::new(5);
        assert_eq!(median(&w), 0.0);
        assert_eq!(mean(&w), 0.0);
        assert_eq!(stddev(&w), 0.0);
    }

    #[test]
    fn stddev_of_constant_window_is_zero() {
        let w = window_of(&[4.0, 4.0, 4.0], 5);
        assert_eq!(stddev(&w), 0.0);
    }

    #[test]
    fn acceleration_is_zero_on_non_positive_dt() {
        assert_eq!(acceleration(10.0, 5.0, 0.0), 0.0);
        assert_eq!(acceleration(10.0, 5.0, -1.0), 0.0);
    }

    #[test]
    fn acceleration_computes_rate_of_change() {
        assert_eq!(acceleration(10.0, 5.0, 2.0), 2.5);
    }
}
