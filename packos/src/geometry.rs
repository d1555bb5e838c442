/// A 2D integer coordinate, used as a candidate top-left anchor for the next
/// rectangle to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn origin() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// The fixed-size surface that rectangles are packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tells whether a footprint of the given size, with its top-left corner at
    /// `anchor`, lies wholly inside the canvas.
    pub fn contains(&self, anchor: Point, size: (u32, u32)) -> bool {
        let right = u64::from(anchor.x) + u64::from(size.0);
        let bottom = u64::from(anchor.y) + u64::from(size.1);

        right <= u64::from(self.width) && bottom <= u64::from(self.height)
    }
}

/// Where a rectangle ended up once it was packed.
///
/// All edges are derived from the top-left corner, the rectangle's size and
/// the padding it was created with:
///
/// * `right = x + width`, `bottom = y + height`
/// * `padded_right = right + padding`, `padded_bottom = bottom + padding`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub right: u32,
    pub bottom: u32,
    pub padded_right: u32,
    pub padded_bottom: u32,
}

impl Placement {
    /// Returns `None` when any edge would overflow a `u32`.
    pub(crate) fn new(anchor: Point, size: (u32, u32), padding: u32) -> Option<Self> {
        let right = anchor.x.checked_add(size.0)?;
        let bottom = anchor.y.checked_add(size.1)?;

        Some(Self {
            x: anchor.x,
            y: anchor.y,
            right,
            bottom,
            padded_right: right.checked_add(padding)?,
            padded_bottom: bottom.checked_add(padding)?,
        })
    }

    #[inline]
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Two placements overlap when their padded extents intersect on both
    /// axes. Placements that only touch don't overlap.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.padded_right
            && self.padded_right > other.x
            && self.y < other.padded_bottom
            && self.padded_bottom > other.y
    }
}
