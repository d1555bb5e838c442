use thiserror::Error;

use crate::{
    anchors::Anchors,
    geometry::{Canvas, Placement, Point},
    types::Rect,
};

/// Returned when packing stops because a rectangle couldn't be placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("could not fit {name} (size {size:?}, padded {padded_size:?}) into a canvas of size {canvas_size:?}")]
    UnplaceableRectangle {
        /// Position of the rectangle in the packing order.
        index: usize,
        name: String,
        size: (u32, u32),
        padded_size: (u32, u32),
        canvas_size: (u32, u32),
    },
}

impl PackError {
    /// Position, in packing order, of the first rectangle that wasn't placed.
    pub fn index(&self) -> usize {
        match self {
            PackError::UnplaceableRectangle { index, .. } => *index,
        }
    }
}

/// Statistics about a successful packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub placed: usize,

    /// Candidate anchors that were never consumed.
    pub unused_anchors: usize,
}

/// Tests whether `rect` can go at `anchor` without leaving the canvas or
/// overlapping any rectangle in `placed`.
///
/// The padded footprint has to fit inside the canvas, and padded extents of
/// the two rectangles must not intersect. On success the placement is
/// committed to `rect`. On failure `rect` is left as it was.
pub fn can_place<H>(rect: &mut Rect<H>, canvas: Canvas, anchor: Point, placed: &[Rect<H>]) -> bool {
    match fit_at(rect, canvas, anchor, placed) {
        Some(placement) => {
            rect.placement = Some(placement);
            true
        }
        None => false,
    }
}

fn fit_at<H>(rect: &Rect<H>, canvas: Canvas, anchor: Point, placed: &[Rect<H>]) -> Option<Placement> {
    // Empty images have nothing to composite and are treated as not fitting.
    if rect.size.0 == 0 || rect.size.1 == 0 {
        return None;
    }

    if !canvas.contains(anchor, rect.padded_size) {
        return None;
    }

    let candidate = Placement::new(anchor, rect.size, rect.padding)?;

    let clear = placed
        .iter()
        .filter_map(Rect::placement)
        .all(|other| !candidate.overlaps(&other));

    if clear {
        Some(candidate)
    } else {
        None
    }
}

/// Places rectangles one at a time, in the order they're given, at the first
/// candidate anchor that fits.
///
/// Callers usually sort with [`sort_by_padded_area`] first. The packer never
/// reorders, backtracks, or skips: the first rectangle that can't be placed
/// ends the run.
///
/// [`sort_by_padded_area`]: fn.sort_by_padded_area.html
#[derive(Debug, Clone, Copy)]
pub struct GreedyPacker {
    canvas: Canvas,
}

impl GreedyPacker {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn with_size(size: (u32, u32)) -> Self {
        Self::new(Canvas::new(size.0, size.1))
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Packs `rects` in order, writing each rectangle's placement.
    ///
    /// On error, every rectangle before the reported index keeps its
    /// placement, and the reported rectangle and everything after it are left
    /// unplaced.
    pub fn pack<H>(&self, rects: &mut [Rect<H>]) -> Result<PackSummary, PackError> {
        let mut anchors = Anchors::new();
        self.pack_with_anchors(rects, &mut anchors)
    }

    pub(crate) fn pack_with_anchors<H>(
        &self,
        rects: &mut [Rect<H>],
        anchors: &mut Anchors,
    ) -> Result<PackSummary, PackError> {
        log::trace!(
            "Packing {} items into a {}x{} canvas",
            rects.len(),
            self.canvas.width,
            self.canvas.height
        );

        for rect in rects.iter_mut() {
            rect.placement = None;
        }

        let total = rects.len();

        for index in 0..total {
            let (placed, rest) = rects.split_at_mut(index);
            let rect = &mut rest[0];

            log::trace!(
                "For item {} ({}x{} padded), evaluating these anchors: {:?}",
                rect.name(),
                rect.padded_size.0,
                rect.padded_size.1,
                anchors
            );

            let fit_anchor = anchors
                .iter()
                .position(|anchor| can_place(rect, self.canvas, *anchor, placed));

            match (fit_anchor, rect.placement) {
                (Some(anchor_index), Some(placement)) => {
                    let anchor = anchors.consume(anchor_index, &placement);
                    log::trace!("Fit at anchor {:?}", anchor);
                }
                _ => {
                    log::debug!(
                        "Stopped after {} of {} items: {} does not fit",
                        index,
                        total,
                        rect.name()
                    );

                    return Err(PackError::UnplaceableRectangle {
                        index,
                        name: rect.name().to_owned(),
                        size: rect.size,
                        padded_size: rect.padded_size,
                        canvas_size: self.canvas.size(),
                    });
                }
            }
        }

        log::debug!(
            "Finished packing {} items with {} anchors left over",
            rects.len(),
            anchors.len()
        );

        Ok(PackSummary {
            placed: rects.len(),
            unused_anchors: anchors.len(),
        })
    }
}
