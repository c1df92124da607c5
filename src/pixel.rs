//! Pixel data model: RGB triples in a flat row-major buffer.

use crate::error::{FilterError, Result};

/// One truecolor sample. Channels are already in `[0, 255]` by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Pixel { r, g, b }
    }

    /// Saturate signed per-channel sums into a pixel.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Pixel {
            r: r.clamp(0, 255) as u8,
            g: g.clamp(0, 255) as u8,
            b: b.clamp(0, 255) as u8,
        }
    }
}

/// `width * height` pixels, index `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Wrap an existing pixel vector, checking the dimension invariants.
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        let expected = checked_area(width, height)?;
        if pixels.len() != expected {
            return Err(FilterError::config(format!(
                "{}x{} image needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        Ok(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// A buffer where every cell holds `pixel`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Result<Self> {
        let area = checked_area(width, height)?;
        Ok(PixelBuffer {
            width,
            height,
            pixels: vec![pixel; area],
        })
    }

    /// Build from packed `RGBRGB...` bytes.
    pub fn from_raw(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let area = checked_area(width, height)?;
        if bytes.len() != area * 3 {
            return Err(FilterError::Truncated {
                expected: area * 3,
                actual: bytes.len(),
            });
        }

        let pixels = bytes
            .chunks_exact(3)
            .map(|rgb| Pixel::new(rgb[0], rgb[1], rgb[2]))
            .collect();

        Ok(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Packed `RGBRGB...` bytes in row-major order.
    pub fn to_raw(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            bytes.extend_from_slice(&[p.r, p.g, p.b]);
        }
        bytes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    /// Iterate over rows as slices of `width` pixels.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width)
    }
}

fn checked_area(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(FilterError::config(format!(
            "image dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    width
        .checked_mul(height)
        .filter(|area| area.checked_mul(3).is_some())
        .ok_or_else(|| FilterError::config(format!("image {}x{} is too large", width, height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_saturates_both_ends() {
        assert_eq!(Pixel::clamped(-4080, 300, 128), Pixel::new(0, 255, 128));
        assert_eq!(Pixel::clamped(0, 255, -1), Pixel::new(0, 255, 0));
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = PixelBuffer::new(2, 2, vec![Pixel::BLACK; 3]).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(PixelBuffer::filled(0, 5, Pixel::BLACK).is_err());
        assert!(PixelBuffer::filled(5, 0, Pixel::BLACK).is_err());
        assert!(PixelBuffer::new(0, 0, Vec::new()).is_err());
    }

    #[test]
    fn test_raw_layout_is_row_major_rgb() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let buffer = PixelBuffer::from_raw(2, 2, &bytes).unwrap();

        assert_eq!(buffer.get(0, 0), Pixel::new(1, 2, 3));
        assert_eq!(buffer.get(1, 0), Pixel::new(4, 5, 6));
        assert_eq!(buffer.get(0, 1), Pixel::new(7, 8, 9));
        assert_eq!(buffer.get(1, 1), Pixel::new(10, 11, 12));
        assert_eq!(buffer.to_raw(), bytes.to_vec());
    }

    #[test]
    fn test_from_raw_short_input() {
        let err = PixelBuffer::from_raw(2, 2, &[0; 11]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::Truncated {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_rows() {
        let buffer = PixelBuffer::filled(3, 4, Pixel::new(9, 9, 9)).unwrap();
        let rows: Vec<_> = buffer.rows().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| row.len() == 3));
    }
}
