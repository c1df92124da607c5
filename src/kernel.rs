//! The 3x3 Laplacian edge-detection kernel and its per-pixel rule.
//!
//! Borders wrap: a neighbour that falls off one edge is read from the
//! opposite edge, so the image behaves like a torus.

use crate::pixel::{Pixel, PixelBuffer};

pub const KERNEL_SIZE: usize = 3;

/// Indexed `[fx][fy]`. Sums to zero, so flat regions map to black.
pub const LAPLACIAN: [[i32; KERNEL_SIZE]; KERNEL_SIZE] = [
    [-1, -1, -1],
    [-1, 8, -1],
    [-1, -1, -1],
];

/// Source coordinates sampled for the target `(x, y)`, in `[fx][fy]` order.
#[inline]
pub fn sample_coords(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> [[(usize, usize); KERNEL_SIZE]; KERNEL_SIZE] {
    let half = KERNEL_SIZE / 2;
    let mut coords = [[(0, 0); KERNEL_SIZE]; KERNEL_SIZE];

    for (fx, column) in coords.iter_mut().enumerate() {
        // x + width never underflows once we subtract `half`
        let image_x = (x + width + fx - half) % width;
        for (fy, slot) in column.iter_mut().enumerate() {
            let image_y = (y + height + fy - half) % height;
            *slot = (image_x, image_y);
        }
    }

    coords
}

/// Convolve one pixel of `source` with [`LAPLACIAN`] and clamp the result.
#[inline]
pub fn apply_at(source: &PixelBuffer, x: usize, y: usize) -> Pixel {
    let (width, height) = source.dimensions();
    let coords = sample_coords(x, y, width, height);

    let (mut red, mut green, mut blue) = (0i32, 0i32, 0i32);
    for (fx, column) in coords.iter().enumerate() {
        for (fy, &(image_x, image_y)) in column.iter().enumerate() {
            let weight = LAPLACIAN[fx][fy];
            let sample = source.get(image_x, image_y);
            red += i32::from(sample.r) * weight;
            green += i32::from(sample.g) * weight;
            blue += i32::from(sample.b) * weight;
        }
    }

    Pixel::clamped(red, green, blue)
}

/// Fill `out` with row `y` of the filtered image.
pub fn convolve_row(source: &PixelBuffer, y: usize, out: &mut [Pixel]) {
    debug_assert_eq!(out.len(), source.width());
    for (x, cell) in out.iter_mut().enumerate() {
        *cell = apply_at(source, x, y);
    }
}
