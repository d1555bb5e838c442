use std::fmt;

use packos::{Canvas, Rect};

use crate::image::Image;

/// Handle to a decoded image held by a `SpriteSources`. This is what packos
/// carries around for each rectangle in place of the pixels themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(usize);

/// Owns every decoded input image for the duration of a run.
#[derive(Debug, Default)]
pub struct SpriteSources {
    images: Vec<Image>,
}

impl SpriteSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: Image) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    pub fn get(&self, id: ImageId) -> &Image {
        &self.images[id.0]
    }
}

/// Where one input image ended up in the spritesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSlice {
    pub name: String,
    pub name_id: String,
    pub min: (u32, u32),
    pub max: (u32, u32),
}

impl SpriteSlice {
    pub fn size(&self) -> (u32, u32) {
        (self.max.0 - self.min.0, self.max.1 - self.min.1)
    }
}

/// The packed canvas plus a description of every image drawn onto it.
pub struct Spritesheet {
    image: Image,
    slices: Vec<SpriteSlice>,
}

impl Spritesheet {
    /// Draws every placed rectangle onto a transparent canvas. Rectangles
    /// that weren't placed are left out.
    pub fn compose(canvas: Canvas, rects: &[Rect<ImageId>], sources: &SpriteSources) -> Self {
        let mut image = Image::new_empty_rgba8(canvas.size());
        let mut slices = Vec::with_capacity(rects.len());

        for rect in rects {
            let placement = match rect.placement() {
                Some(placement) => placement,
                None => continue,
            };

            image.blit(sources.get(*rect.handle()), placement.position());

            slices.push(SpriteSlice {
                name: rect.name().to_owned(),
                name_id: rect.name_id().to_owned(),
                min: (placement.x, placement.y),
                max: (placement.right, placement.bottom),
            });
        }

        Self { image, slices }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.size()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }

    pub fn slices(&self) -> &[SpriteSlice] {
        &self.slices
    }
}

impl fmt::Debug for Spritesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        writeln!(f, "Dimensions: ({}, {})", width, height)?;
        writeln!(f, "Inputs:")?;

        for slice in &self.slices {
            writeln!(
                f,
                "\t{}: ({}, {}) ({}, {})",
                slice.name, slice.min.0, slice.min.1, slice.max.0, slice.max.1
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use packos::GreedyPacker;

    use crate::image::Pixel;

    fn solid(size: (u32, u32), pixel: Pixel) -> Image {
        let mut image = Image::new_empty_rgba8(size);
        for y in 0..size.1 {
            for x in 0..size.0 {
                image.set_pixel((x, y), pixel);
            }
        }
        image
    }

    #[test]
    fn composes_placed_images() {
        let red = Pixel::new(255, 0, 0, 255);
        let blue = Pixel::new(0, 0, 255, 255);

        let mut sources = SpriteSources::new();
        let mut rects = vec![
            Rect::new((4, 4), 1, "red.png", sources.insert(solid((4, 4), red))),
            Rect::new((2, 2), 1, "blue.png", sources.insert(solid((2, 2), blue))),
        ];

        let canvas = Canvas::new(8, 8);
        GreedyPacker::new(canvas).pack(&mut rects).unwrap();

        let sheet = Spritesheet::compose(canvas, &rects, &sources);

        assert_eq!(sheet.dimensions(), (8, 8));
        assert_eq!(sheet.image().get_pixel((0, 0)), red);
        assert_eq!(sheet.image().get_pixel((3, 3)), red);
        // Padding column between the two.
        assert_eq!(sheet.image().get_pixel((4, 0)), Pixel::new(0, 0, 0, 0));
        assert_eq!(sheet.image().get_pixel((5, 0)), blue);
        assert_eq!(sheet.image().get_pixel((6, 1)), blue);

        assert_eq!(
            sheet.slices()[1],
            SpriteSlice {
                name: "blue.png".to_owned(),
                name_id: "blue".to_owned(),
                min: (5, 0),
                max: (7, 2),
            }
        );
        assert_eq!(sheet.slices()[1].size(), (2, 2));
    }

    #[test]
    fn unplaced_images_are_skipped() {
        let mut sources = SpriteSources::new();
        let rects = vec![Rect::new(
            (4, 4),
            0,
            "never-packed.png",
            sources.insert(Image::new_empty_rgba8((4, 4))),
        )];

        let sheet = Spritesheet::compose(Canvas::new(8, 8), &rects, &sources);

        assert!(sheet.slices().is_empty());
        assert_eq!(
            format!("{:?}", sheet),
            "Dimensions: (8, 8)\nInputs:\n"
        );
    }
}
