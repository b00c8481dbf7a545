//! Contour tracker for sibling merging.
//!
//! While the children of one node are merged left to right, the tracker
//! records which already-placed sibling owns the right contour of the
//! merged block at each depth. Records are `(low_y, index)`: sibling
//! `index` is the rightmost sibling whose subtree reaches down to `low_y`.
//! From the most recent record toward the oldest, `low_y` strictly
//! increases.
//!
//! A shift found while comparing contours at some depth is anchored at
//! the sibling owning that depth, so only siblings to the right of it
//! share the spacing.

use crate::geometry::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Record {
    low_y: Coordinate,
    index: usize,
}

/// Stack of `(low_y, sibling index)` records. The top of the stack is the
/// most recently merged sibling.
#[derive(Debug, Clone, Default)]
pub(crate) struct ContourTracker {
    records: Vec<Record>,
}

impl ContourTracker {
    /// Start tracking with the first child.
    pub(crate) fn new(low_y: Coordinate, index: usize) -> Self {
        Self {
            records: vec![Record { low_y, index }],
        }
    }

    /// Record sibling `index`, whose subtree reaches down to `low_y`.
    ///
    /// Records no deeper than `low_y` are dropped first: the new subtree
    /// hides those siblings from every later comparison.
    pub(crate) fn push(&mut self, low_y: Coordinate, index: usize) {
        while self.records.last().is_some_and(|top| top.low_y <= low_y) {
            self.records.pop();
        }
        self.records.push(Record { low_y, index });
    }

    /// A read position at the most recent record.
    pub(crate) fn cursor(&self) -> TrackerCursor<'_> {
        TrackerCursor {
            records: &self.records,
            position: self.records.len().saturating_sub(1),
        }
    }

    #[cfg(test)]
    fn entries(&self) -> Vec<(Coordinate, usize)> {
        self.records.iter().rev().map(|r| (r.low_y, r.index)).collect()
    }
}

/// Read-only walk over a [`ContourTracker`], from the most recent record
/// toward deeper ones. Advancing a cursor never changes the tracker.
#[derive(Debug)]
pub(crate) struct TrackerCursor<'a> {
    records: &'a [Record],
    position: usize,
}

impl TrackerCursor<'_> {
    /// Move past every record that ends above `bottom`. Stops at the
    /// deepest record.
    pub(crate) fn advance_past(&mut self, bottom: Coordinate) {
        while self.position > 0 && bottom > self.records[self.position].low_y {
            self.position -= 1;
        }
    }

    /// Sibling index owning the contour at the current depth.
    pub(crate) fn index(&self) -> usize {
        self.records.get(self.position).map_or(0, |r| r.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_deeper_records() {
        let mut tracker = ContourTracker::new(10.0, 0);
        tracker.push(5.0, 1);
        tracker.push(3.0, 2);
        assert_eq!(tracker.entries(), vec![(3.0, 2), (5.0, 1), (10.0, 0)]);
    }

    #[test]
    fn test_push_discards_hidden_records() {
        let mut tracker = ContourTracker::new(10.0, 0);
        tracker.push(5.0, 1);
        tracker.push(3.0, 2);
        tracker.push(6.0, 3);
        assert_eq!(tracker.entries(), vec![(6.0, 3), (10.0, 0)]);

        // Equal depth hides the older sibling too.
        tracker.push(10.0, 4);
        assert_eq!(tracker.entries(), vec![(10.0, 4)]);
    }

    #[test]
    fn test_cursor_walks_toward_deeper_siblings() {
        let mut tracker = ContourTracker::new(10.0, 0);
        tracker.push(5.0, 1);
        tracker.push(3.0, 2);

        let mut cursor = tracker.cursor();
        assert_eq!(cursor.index(), 2);
        cursor.advance_past(3.0);
        assert_eq!(cursor.index(), 2);
        cursor.advance_past(4.0);
        assert_eq!(cursor.index(), 1);
        cursor.advance_past(7.0);
        assert_eq!(cursor.index(), 0);
        cursor.advance_past(100.0);
        assert_eq!(cursor.index(), 0);

        // The tracker itself is untouched.
        assert_eq!(tracker.entries().len(), 3);
    }
}
