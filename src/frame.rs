//! Input frames and the rasters the pipeline hands back to its caller.

use std::f32::consts::PI;
use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageResult, Luma};
use imageproc::definitions::{HasBlack, HasWhite};

use crate::buffer::pixel_count;
use crate::error::CannyError;

/// A borrowed, immutable 8-bit grayscale frame in row-major order.
///
/// The pipeline only reads a frame for the duration of one call and never keeps it.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wraps a raw buffer, checking that it holds exactly `width * height` bytes.
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Result<Self, CannyError> {
        let expected = pixel_count(width, height)?;
        if expected == 0 || pixels.is_empty() {
            return Err(CannyError::EmptyFrame { width, height });
        }
        if pixels.len() != expected {
            return Err(CannyError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Borrows the pixels of a decoded luma image.
    pub fn from_image(image: &'a GrayImage) -> Result<Self, CannyError> {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` of the frame.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major intensities, `width * height` bytes.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: u32) -> &'a [u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }
}

/// Binary edge raster: every pixel is either [`EdgeMap::EDGE`] or [`EdgeMap::BACKGROUND`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    image: GrayImage,
}

impl EdgeMap {
    /// Value of a pixel on an edge.
    pub const EDGE: u8 = 255;
    /// Value of every other pixel.
    pub const BACKGROUND: u8 = 0;

    /// Wraps a raster whose values are already restricted to the two levels.
    pub(crate) fn from_image(image: GrayImage) -> Self {
        debug_assert!(image
            .as_raw()
            .iter()
            .all(|&v| v == Self::EDGE || v == Self::BACKGROUND));
        Self { image }
    }

    /// Map width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Map height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major pixel values, `width * height` bytes in `{0, 255}`.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Borrows the underlying grayscale image.
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Hands the underlying buffer to the caller.
    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// True when `(x, y)` is marked as an edge. Panics if the pixel is out of bounds.
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] == Self::EDGE
    }

    /// Number of edge pixels.
    pub fn edge_count(&self) -> usize {
        self.image
            .as_raw()
            .iter()
            .filter(|&&v| v == Self::EDGE)
            .count()
    }

    /// Coordinates of every edge pixel in row-major order.
    pub fn edge_points(&self) -> Vec<(u32, u32)> {
        self.image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == Self::EDGE)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Dark edges on a white background, the classic rendering for printed output.
    pub fn inverted(&self) -> GrayImage {
        let white = Luma::<u8>::white();
        let black = Luma::<u8>::black();
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            if self.is_edge(x, y) {
                black
            } else {
                white
            }
        })
    }

    /// Saves the map; the format follows the file extension (`.pgm` gives a P5 graymap).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save(path)
    }
}

/// Per-pixel gradient orientation in radians, folded into `[0, π)`.
///
/// Only produced when the caller asks for it. Border pixels carry `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionMap {
    image: ImageBuffer<Luma<f32>, Vec<f32>>,
}

impl DirectionMap {
    pub(crate) fn from_image(image: ImageBuffer<Luma<f32>, Vec<f32>>) -> Self {
        Self { image }
    }

    /// Map width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Map height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major orientations in radians.
    pub fn as_raw(&self) -> &[f32] {
        self.image.as_raw()
    }

    /// Orientation of pixel `(x, y)` in radians.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.image.get_pixel(x, y)[0]
    }

    /// Maps `[0, π)` linearly onto `0..=255` for storage as an 8-bit raster.
    pub fn to_gray(&self) -> GrayImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let scaled = (self.get(x, y) / PI * 255.0).round().clamp(0.0, 255.0);
            Luma([scaled as u8])
        })
    }
}
