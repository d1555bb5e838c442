//! A minimal RGBA8 image container, along with PNG decoding and encoding.

use std::io::{Read, Write};

use thiserror::Error;

const STRIDE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Decode(#[from] png::DecodingError),

    #[error(transparent)]
    Encode(#[from] png::EncodingError),

    #[error("unsupported PNG format {color_type:?} at {bit_depth:?} bits per channel")]
    UnsupportedFormat {
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    size: (u32, u32),
    data: Vec<u8>,
}

impl Image {
    pub fn new_rgba8<D: Into<Vec<u8>>>(size: (u32, u32), data: D) -> Self {
        let data = data.into();

        assert!(data.len() == (size.0 * size.1 * STRIDE) as usize);

        Self { size, data }
    }

    pub fn new_empty_rgba8(size: (u32, u32)) -> Self {
        let data = vec![0; (size.0 * size.1 * STRIDE) as usize];
        Self::new_rgba8(size, data)
    }

    /// Decodes a PNG of any color type into RGBA8. Palettes and low bit
    /// depths are expanded, 16-bit channels are truncated, and images without
    /// alpha become fully opaque.
    pub fn decode_png<R: Read>(input: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let (info, mut reader) = decoder.read_info()?;

        let mut raw = vec![0; info.buffer_size()];
        reader.next_frame(&mut raw)?;

        if info.bit_depth != png::BitDepth::Eight {
            return Err(ImageError::UnsupportedFormat {
                color_type: info.color_type,
                bit_depth: info.bit_depth,
            });
        }

        let pixel_count = (info.width * info.height) as usize;
        let mut data = Vec::with_capacity(pixel_count * STRIDE as usize);

        match info.color_type {
            png::ColorType::RGBA => {
                data.extend_from_slice(&raw[..pixel_count * STRIDE as usize]);
            }
            png::ColorType::RGB => {
                for rgb in raw.chunks_exact(3).take(pixel_count) {
                    data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
                }
            }
            png::ColorType::GrayscaleAlpha => {
                for ga in raw.chunks_exact(2).take(pixel_count) {
                    data.extend_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
                }
            }
            png::ColorType::Grayscale => {
                for &g in raw.iter().take(pixel_count) {
                    data.extend_from_slice(&[g, g, g, 255]);
                }
            }
            color_type => {
                return Err(ImageError::UnsupportedFormat {
                    color_type,
                    bit_depth: info.bit_depth,
                })
            }
        }

        Ok(Self::new_rgba8((info.width, info.height), data))
    }

    pub fn encode_png<W: Write>(&self, output: W) -> Result<(), ImageError> {
        let mut encoder = png::Encoder::new(output, self.size.0, self.size.1);
        encoder.set_color(png::ColorType::RGBA);
        encoder.set_depth(png::BitDepth::Eight);

        let mut output_writer = encoder.write_header()?;
        output_writer.write_image_data(&self.data)?;

        // On drop, output_writer will write the last chunk of the PNG file.
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Copies all of `other` into this image with its top-left corner at
    /// `pos`. `other` must fit entirely inside this image.
    pub fn blit(&mut self, other: &Image, pos: (u32, u32)) {
        assert!(pos.0 + other.size.0 <= self.size.0);
        assert!(pos.1 + other.size.1 <= self.size.1);

        let other_width_bytes = other.size.0 * STRIDE;
        let other_rows = other.data.chunks_exact(other_width_bytes as usize);

        for (other_y, other_row) in other_rows.enumerate() {
            let self_y = pos.1 + other_y as u32;

            let start_px = pos.0 + self.size.0 * self_y;

            let start_in_bytes = (STRIDE * start_px) as usize;
            let end_in_bytes = start_in_bytes + other_row.len();

            let self_row = &mut self.data[start_in_bytes..end_in_bytes];
            self_row.copy_from_slice(other_row);
        }
    }

    pub fn get_pixel(&self, pos: (u32, u32)) -> Pixel {
        let start = self.pixel_offset(pos);

        Pixel {
            r: self.data[start],
            g: self.data[start + 1],
            b: self.data[start + 2],
            a: self.data[start + 3],
        }
    }

    pub fn set_pixel(&mut self, pos: (u32, u32), pixel: Pixel) {
        let start = self.pixel_offset(pos);

        self.data[start] = pixel.r;
        self.data[start + 1] = pixel.g;
        self.data[start + 2] = pixel.b;
        self.data[start + 3] = pixel.a;
    }

    fn pixel_offset(&self, pos: (u32, u32)) -> usize {
        assert!(pos.0 < self.size.0);
        assert!(pos.1 < self.size.1);

        (STRIDE * (pos.0 + pos.1 * self.size.0)) as usize
    }
}
