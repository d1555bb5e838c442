//! Changes pixels in an image that are totally transparent to the color of
//! their nearest non-transparent neighbor. Packed images are usually sampled
//! with filtering, which otherwise pulls black from the empty space around each
//! sprite into its edges.

use std::collections::VecDeque;

use crate::image::{Image, Pixel};

pub fn alpha_bleed(img: &mut Image) {
    let (w, h) = img.size();

    // Pixels that already have a final color and are safe to sample from.
    let mut can_be_sampled = Mask2::new(w, h);

    // Pixels that have been queued at some point and shouldn't be queued again.
    let mut visited = Mask2::new(w, h);

    // Transparent pixels waiting to take the average of their sampleable
    // neighbors, in breadth-first order outwards from visible pixels.
    let mut to_visit = VecDeque::new();

    let adjacent_positions = |x: u32, y: u32| {
        DIRECTIONS.iter().filter_map(move |&(x_offset, y_offset)| {
            let x_source = (x as i64) + x_offset;
            let y_source = (y as i64) + y_offset;

            if x_source < 0 || y_source < 0 || x_source >= w as i64 || y_source >= h as i64 {
                return None;
            }

            Some((x_source as u32, y_source as u32))
        })
    };

    for y in 0..h {
        for x in 0..w {
            if img.get_pixel((x, y)).a != 0 {
                can_be_sampled.set(x, y);
                visited.set(x, y);
                continue;
            }

            let borders_visible =
                adjacent_positions(x, y).any(|source| img.get_pixel(source).a != 0);

            if borders_visible {
                visited.set(x, y);
                to_visit.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = to_visit.pop_front() {
        let mut new_color = (0u32, 0u32, 0u32);
        let mut contributing = 0u32;

        for (x_source, y_source) in adjacent_positions(x, y) {
            if can_be_sampled.get(x_source, y_source) {
                let source = img.get_pixel((x_source, y_source));

                contributing += 1;
                new_color.0 += u32::from(source.r);
                new_color.1 += u32::from(source.g);
                new_color.2 += u32::from(source.b);
            } else if !visited.get(x_source, y_source) {
                visited.set(x_source, y_source);
                to_visit.push_back((x_source, y_source));
            }
        }

        // Every queued pixel has at least one sampleable neighbor: either it
        // bordered a visible pixel, or it was queued by a neighbor that has
        // since been bled.
        if contributing > 0 {
            let pixel = Pixel::new(
                (new_color.0 / contributing) as u8,
                (new_color.1 / contributing) as u8,
                (new_color.2 / contributing) as u8,
                0,
            );

            img.set_pixel((x, y), pixel);
        }

        can_be_sampled.set(x, y);
    }
}

const DIRECTIONS: &[(i64, i64)] = &[
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

struct Mask2 {
    width: u32,
    data: Vec<bool>,
}

impl Mask2 {
    fn new(w: u32, h: u32) -> Self {
        Self {
            width: w,
            data: vec![false; (w as usize) * (h as usize)],
        }
    }

    fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    fn set(&mut self, x: u32, y: u32) {
        let index = self.index(x, y);
        self.data[index] = true;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fully_transparent_image_is_untouched() {
        let mut img = Image::new_empty_rgba8((4, 4));

        alpha_bleed(&mut img);

        assert_eq!(img, Image::new_empty_rgba8((4, 4)));
    }

    #[test]
    fn color_spreads_without_alpha() {
        let mut img = Image::new_empty_rgba8((5, 1));
        img.set_pixel((0, 0), Pixel::new(200, 100, 50, 255));

        alpha_bleed(&mut img);

        assert_eq!(img.get_pixel((0, 0)), Pixel::new(200, 100, 50, 255));
        for x in 1..5 {
            assert_eq!(img.get_pixel((x, 0)), Pixel::new(200, 100, 50, 0));
        }
    }

    #[test]
    fn neighbors_are_averaged() {
        let mut img = Image::new_empty_rgba8((3, 1));
        img.set_pixel((0, 0), Pixel::new(100, 0, 0, 255));
        img.set_pixel((2, 0), Pixel::new(0, 100, 0, 255));

        alpha_bleed(&mut img);

        assert_eq!(img.get_pixel((1, 0)), Pixel::new(50, 50, 0, 0));
    }

    #[test]
    fn partially_transparent_pixels_are_kept() {
        let mut img = Image::new_empty_rgba8((2, 1));
        img.set_pixel((0, 0), Pixel::new(10, 20, 30, 1));
        img.set_pixel((1, 0), Pixel::new(90, 90, 90, 128));

        alpha_bleed(&mut img);

        assert_eq!(img.get_pixel((0, 0)), Pixel::new(10, 20, 30, 1));
        assert_eq!(img.get_pixel((1, 0)), Pixel::new(90, 90, 90, 128));
    }
}
