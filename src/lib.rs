//! Laplacian edge detection for binary PPM images.
//!
//! Rows are split into contiguous bands, one per worker, and every worker
//! convolves its band against the shared source image with wraparound
//! borders.

pub mod config;
pub mod convolve;
pub mod error;
pub mod kernel;
pub mod partition;
pub mod pixel;
pub mod ppm;

pub use config::Config;
pub use convolve::{convolve, filter};
pub use error::{ErrorKind, FilterError, Result};
pub use partition::{partition, Partition};
pub use pixel::{Pixel, PixelBuffer};
