//! Sorted range sets with pruned overlap queries.
//!
//! Decorations are stored as `[from, to)` offset ranges carrying a value. A [`RangeSet`] keeps them
//! sorted by start offset (longer ranges first on ties, so enclosing ranges precede the ranges they
//! contain) and answers point/range queries in O(log n + k).

/// A value attached to a `[from, to)` offset range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranged<T> {
    /// Start offset (inclusive).
    pub from: usize,
    /// End offset (exclusive).
    pub to: usize,
    /// Attached value.
    pub value: T,
}

impl<T> Ranged<T> {
    /// Create a ranged value.
    pub fn new(from: usize, to: usize, value: T) -> Self {
        Self { from, to, value }
    }

    /// Check if the range contains a specific position (half-open).
    pub fn contains(&self, pos: usize) -> bool {
        self.from <= pos && pos < self.to
    }

    /// Whether this is a zero-width range.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Immutable, sorted collection of ranged values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet<T> {
    /// Ranges sorted by `(from, Reverse(to))`.
    ranges: Vec<Ranged<T>>,
    /// `prefix_max_to[i] = max(ranges[0..=i].to)`, used to prune backward scans.
    prefix_max_to: Vec<usize>,
}

impl<T> RangeSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            ranges: Vec::new(),
            prefix_max_to: Vec::new(),
        }
    }

    /// Build a set from ranges in any order.
    ///
    /// The sort is stable: ranges with equal bounds keep their input order.
    pub fn from_unsorted(mut ranges: Vec<Ranged<T>>) -> Self {
        ranges.sort_by(|a, b| a.from.cmp(&b.from).then(b.to.cmp(&a.to)));

        let mut prefix_max_to = Vec::with_capacity(ranges.len());
        let mut max_to = 0;
        for range in &ranges {
            max_to = max_to.max(range.to);
            prefix_max_to.push(max_to);
        }

        Self {
            ranges,
            prefix_max_to,
        }
    }

    /// Get number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// All ranges in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ranged<T>> {
        self.ranges.iter()
    }

    /// Index of the first range whose end may reach `pos` (all earlier ones end before it).
    fn first_reaching(&self, pos: usize) -> usize {
        self.prefix_max_to.partition_point(|&max_to| max_to < pos)
    }

    /// Ranges touching the closed interval `[from, to]`: `range.from <= to && range.to >= from`.
    ///
    /// This is the hover query: a range `[3, 5)` is reported for positions 3, 4 and 5.
    pub fn between(&self, from: usize, to: usize) -> impl Iterator<Item = &Ranged<T>> {
        let end = self.ranges.partition_point(|r| r.from <= to);
        let start = self.first_reaching(from).min(end);
        self.ranges[start..end]
            .iter()
            .filter(move |r| r.to >= from)
    }

    /// Ranges overlapping the half-open interval `[start, end)`.
    ///
    /// Zero-width ranges count when they sit inside `[start, end)`.
    pub fn overlapping(&self, start: usize, end: usize) -> impl Iterator<Item = &Ranged<T>> {
        let stop = self.ranges.partition_point(|r| r.from < end);
        let first = self.first_reaching(start.saturating_add(1)).min(stop);
        // Zero-width ranges at `start` end exactly at `start`, below the pruning bound.
        let zero_first = self.ranges[..first].partition_point(|r| r.from < start);
        self.ranges[zero_first..stop].iter().filter(move |r| {
            if r.is_empty() {
                r.from >= start && r.from < end
            } else {
                r.from < end && r.to > start
            }
        })
    }

    /// Ranges containing `pos` (half-open).
    pub fn at(&self, pos: usize) -> impl Iterator<Item = &Ranged<T>> {
        self.overlapping(pos, pos.saturating_add(1))
            .filter(move |r| r.contains(pos))
    }
}

impl<T> Default for RangeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Ranged<T>> for RangeSet<T> {
    fn from_iter<I: IntoIterator<Item = Ranged<T>>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a RangeSet<T> {
    type Item = &'a Ranged<T>;
    type IntoIter = std::slice::Iter<'a, Ranged<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(it: impl Iterator<Item = &'a Ranged<u32>>) -> Vec<u32> {
        it.map(|r| r.value).collect()
    }

    #[test]
    fn test_ranged_contains() {
        let range = Ranged::new(10, 20, 1);
        assert!(range.contains(10));
        assert!(range.contains(19));
        assert!(!range.contains(20));
        assert!(!range.contains(9));
    }

    #[test]
    fn test_sorted_by_start_then_longest_first() {
        let set = RangeSet::from_unsorted(vec![
            Ranged::new(5, 6, 1),
            Ranged::new(0, 10, 2),
            Ranged::new(5, 20, 3),
            Ranged::new(0, 2, 4),
        ]);
        assert_eq!(values(set.iter()), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_equal_bounds_keep_input_order() {
        let set = RangeSet::from_unsorted(vec![Ranged::new(1, 3, 7), Ranged::new(1, 3, 8)]);
        assert_eq!(values(set.iter()), vec![7, 8]);
    }

    #[test]
    fn test_between_touches_both_ends() {
        let set = RangeSet::from_unsorted(vec![Ranged::new(3, 5, 1), Ranged::new(8, 9, 2)]);
        assert_eq!(values(set.between(3, 3)), vec![1]);
        assert_eq!(values(set.between(5, 5)), vec![1]);
        assert!(set.between(6, 6).next().is_none());
        assert_eq!(values(set.between(0, 100)), vec![1, 2]);
    }

    #[test]
    fn test_between_zero_width() {
        let set = RangeSet::from_unsorted(vec![Ranged::new(4, 4, 1)]);
        assert_eq!(values(set.between(4, 4)), vec![1]);
        assert!(set.between(5, 5).next().is_none());
    }

    #[test]
    fn test_overlapping() {
        let set = RangeSet::from_unsorted(vec![
            Ranged::new(10, 20, 1),
            Ranged::new(25, 35, 2),
            Ranged::new(40, 50, 3),
            Ranged::new(20, 20, 4),
        ]);

        assert_eq!(values(set.overlapping(15, 30)), vec![1, 4, 2]);
        assert_eq!(values(set.overlapping(20, 25)), vec![4]);
        assert_eq!(values(set.overlapping(0, 60)), vec![1, 4, 2, 3]);
        assert!(set.overlapping(50, 60).next().is_none());
    }

    #[test]
    fn test_nested_point_query() {
        let set = RangeSet::from_unsorted(vec![
            Ranged::new(0, 100, 1),
            Ranged::new(20, 30, 2),
            Ranged::new(25, 35, 3),
        ]);
        assert_eq!(values(set.at(27)), vec![1, 2, 3]);
        assert_eq!(values(set.at(32)), vec![1, 3]);
    }

    #[test]
    fn test_query_prunes_disjoint_ranges() {
        let set: RangeSet<u32> = (0..10_000u32)
            .map(|i| Ranged::new(i as usize * 2, i as usize * 2 + 1, i))
            .collect();

        let pos = 2 * 10_000 - 2;
        assert_eq!(values(set.at(pos)), vec![9_999]);
        assert_eq!(set.first_reaching(pos + 1), 9_999);
    }
}
