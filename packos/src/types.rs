use crate::geometry::Placement;

/// One packable item: the size of an image, the padding margin it should keep
/// from its neighbors, and where it ended up once packed.
///
/// `H` is an opaque handle supplied by the caller, usually something that
/// points back at decoded pixel data. Packos never looks at it; it's carried
/// through so the caller can composite the image at its final position.
#[derive(Debug, Clone)]
pub struct Rect<H> {
    pub(crate) size: (u32, u32),
    pub(crate) padding: u32,
    pub(crate) padded_size: (u32, u32),
    pub(crate) placement: Option<Placement>,
    name: String,
    name_id: String,
    handle: H,
}

impl<H> Rect<H> {
    pub fn new<N: Into<String>>(size: (u32, u32), padding: u32, name: N, handle: H) -> Self {
        let name = name.into();
        let name_id = make_name_id(&name);

        Self {
            size,
            padding,
            padded_size: (
                size.0.saturating_add(padding),
                size.1.saturating_add(padding),
            ),
            placement: None,
            name,
            name_id,
            handle,
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    #[inline]
    pub fn padded_size(&self) -> (u32, u32) {
        self.padded_size
    }

    /// The area of the padded footprint, which is what packing order is
    /// based on.
    #[inline]
    pub fn padded_area(&self) -> u64 {
        u64::from(self.padded_size.0) * u64::from(self.padded_size.1)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with its extension removed and `-` and `.` replaced by `_`.
    /// Only meant for generated metadata.
    #[inline]
    pub fn name_id(&self) -> &str {
        &self.name_id
    }

    #[inline]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Where this rectangle was placed, or `None` if it hasn't been packed yet
    /// or couldn't be.
    #[inline]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    #[inline]
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}

/// Turns a file name into something that's usually a valid identifier.
///
/// The last extension is dropped, and any remaining `-` or `.` becomes `_`.
pub fn make_name_id(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(index) => &name[..index],
        None => name,
    };

    stem.replace('-', "_").replace('.', "_")
}
