use std::slice;

use crate::geometry::{Placement, Point};

/// The ordered set of candidate anchors where the next rectangle's top-left
/// corner may be tried.
///
/// Anchors are scanned oldest first. New anchors are only ever appended, and
/// anchors are only ever removed by being consumed by a placement. Nothing is
/// deduplicated, so the set can hold anchors that no rectangle will ever fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchors {
    points: Vec<Point>,
}

impl Anchors {
    /// A fresh set holding only the origin.
    pub fn new() -> Self {
        Self {
            points: vec![Point::origin()],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Consumes the anchor at `index` that a rectangle was just placed on, and
    /// appends the two anchors that placement opens up: one to the right of
    /// its padded footprint and one below it.
    pub fn consume(&mut self, index: usize, placed: &Placement) -> Point {
        let anchor = self.points.remove(index);

        self.points.push(Point::new(placed.padded_right, placed.y));
        self.points.push(Point::new(placed.x, placed.padded_bottom));

        anchor
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Anchors {
    type Item = &'a Point;
    type IntoIter = slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
