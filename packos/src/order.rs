use std::cmp::Reverse;

use crate::types::Rect;

/// Sorts rectangles into packing order: largest padded area first.
///
/// The sort is stable, so rectangles with equal area keep their input order
/// and the same input always packs the same way.
pub fn sort_by_padded_area<H>(rects: &mut [Rect<H>]) {
    rects.sort_by_key(|rect| Reverse(rect.padded_area()));
}
