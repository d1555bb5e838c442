//! Packos is a small library for packing rectangles into a single canvas of
//! fixed size. It's the layout engine behind `tpack`, a build-time tool that
//! composes a directory of images into one sprite atlas.
//!
//! The packer is greedy: rectangles are sorted largest first, then each one is
//! placed at the oldest candidate anchor that can hold it. There's no
//! rotation, no backtracking, and the canvas never grows. When a rectangle
//! can't be placed, packing stops and that rectangle is reported.
//!
//! ## Example
//! ```
//! use packos::{sort_by_padded_area, Canvas, GreedyPacker, Rect};
//!
//! // The last argument is an opaque handle. Packos carries it around so the
//! // caller can find the pixels again once packing is done.
//! let mut rects = vec![
//!     Rect::new((64, 64), 2, "small.png", 0usize),
//!     Rect::new((128, 64), 2, "wide.png", 1usize),
//!     Rect::new((1, 300), 2, "thin.png", 2usize),
//! ];
//!
//! sort_by_padded_area(&mut rects);
//!
//! let packer = GreedyPacker::new(Canvas::new(512, 512));
//! let summary = packer.pack(&mut rects).unwrap();
//!
//! assert_eq!(summary.placed, 3);
//! assert!(rects.iter().all(|rect| rect.placement().is_some()));
//! ```

mod anchors;
mod geometry;
mod order;
mod packer;
mod types;

pub use anchors::*;
pub use geometry::*;
pub use order::*;
pub use packer::*;
pub use types::*;
