//! Canonical sets of half-open intervals with linear-time set algebra.

use std::fmt::{self, Debug, Formatter};

/// A sorted list of disjoint, non-touching `[start, end)` intervals.
///
/// Every set operation is one merge-sweep over the boundaries of both
/// operands.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IntervalSet<T> {
    intervals: Vec<(T, T)>,
}

impl<T> Default for IntervalSet<T> {
    fn default() -> Self {
        IntervalSet {
            intervals: Vec::new(),
        }
    }
}

impl<T: Ord + Copy> IntervalSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes arbitrary intervals: empty ones are dropped, overlapping or
    /// touching ones are joined.
    pub fn from_intervals<I: IntoIterator<Item = (T, T)>>(intervals: I) -> Self {
        let mut sorted: Vec<(T, T)> = intervals.into_iter().filter(|(s, e)| s < e).collect();
        sorted.sort();
        let mut joined: Vec<(T, T)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            match joined.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => joined.push((start, end)),
            }
        }
        IntervalSet { intervals: joined }
    }

    pub fn insert(&mut self, start: T, end: T) {
        *self = self.union(&Self::from_intervals(Some((start, end))));
    }

    pub fn intervals(&self) -> &[(T, T)] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of disjoint intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn contains(&self, point: T) -> bool {
        let after = self.intervals.partition_point(|&(start, _)| start <= point);
        after > 0 && point < self.intervals[after - 1].1
    }

    pub fn union(&self, other: &Self) -> Self {
        self.sweep(other, |a, b| a || b)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.sweep(other, |a, b| a && b)
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.sweep(other, |a, b| a && !b)
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.sweep(other, |a, b| a != b)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.difference(other).is_empty()
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }

    /// Walks the merged boundary points of both sets, tracking whether the
    /// sweep is inside each operand. `keep(false, false)` must be false.
    fn sweep<F: Fn(bool, bool) -> bool>(&self, other: &Self, keep: F) -> Self {
        let mut lhs = self.boundaries().peekable();
        let mut rhs = other.boundaries().peekable();
        let (mut in_lhs, mut in_rhs, mut inside) = (false, false, false);
        let mut start = None;
        let mut intervals = Vec::new();

        loop {
            let point = match (lhs.peek(), rhs.peek()) {
                (Some(&a), Some(&b)) => a.min(b),
                (Some(&a), None) => a,
                (None, Some(&b)) => b,
                (None, None) => break,
            };
            if lhs.peek() == Some(&point) {
                in_lhs = !in_lhs;
                lhs.next();
            }
            if rhs.peek() == Some(&point) {
                in_rhs = !in_rhs;
                rhs.next();
            }
            let now = keep(in_lhs, in_rhs);
            match (inside, now, start) {
                (false, true, _) => start = Some(point),
                (true, false, Some(from)) => intervals.push((from, point)),
                _ => {}
            }
            inside = now;
        }
        IntervalSet { intervals }
    }

    fn boundaries(&self) -> impl Iterator<Item = T> + '_ {
        self.intervals.iter().flat_map(|&(start, end)| [start, end])
    }
}

impl<T: Ord + Copy> FromIterator<(T, T)> for IntervalSet<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(iter: I) -> Self {
        Self::from_intervals(iter)
    }
}

impl<T: Debug> Debug for IntervalSet<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_set()
            .entries(self.intervals.iter().map(|(s, e)| s..e))
            .finish()
    }
}
