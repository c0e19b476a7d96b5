//! Sobel gradient estimation with magnitude and quantized direction.
//!
//! - Convolves the smoothed frame with the 3x3 Sobel pair (`Gx`, `Gy`).
//! - Magnitude is the Euclidean norm `sqrt(gx^2 + gy^2)`.
//! - Direction is `atan2(gy, gx)` folded modulo π and quantized into four sectors.
//! - The outermost ring of pixels ([`BORDER_WIDTH`] wide) is left at zero: the 3x3 operator
//!   cannot be applied there without reading outside the frame.

use std::f32::consts::PI;

use image::{ImageBuffer, Luma};
use rayon::prelude::*;

use crate::buffer::{filled, into_luma, pixel_count};
use crate::error::CannyError;
use crate::frame::DirectionMap;
use crate::smooth::SmoothedFrame;

/// Width of the frame ring the derivative operator cannot reach.
pub const BORDER_WIDTH: u32 = 1;

/// Conversion factor from radians to degrees
const RADIANS_TO_DEGREES: f32 = 180f32 / PI;

/// Gradient orientation quantized into four sectors covering 180°.
///
/// Angles are measured in image coordinates (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sector {
    /// 0° (horizontal gradient): compare with left and right neighbors
    #[default]
    Horizontal,
    /// 45° (diagonal): compare with ↘ and ↖ neighbors
    Diagonal45,
    /// 90° (vertical gradient): compare with top and bottom neighbors
    Vertical,
    /// 135° (diagonal): compare with ↙ and ↗ neighbors
    Diagonal135,
}

impl Sector {
    /// Quantizes an angle in degrees. Any real angle is accepted and folded modulo 180°.
    pub fn from_degrees(angle: f32) -> Self {
        let angle = angle.rem_euclid(180.0);
        if !(22.5..157.5).contains(&angle) {
            Sector::Horizontal
        } else if angle < 67.5 {
            Sector::Diagonal45
        } else if angle < 112.5 {
            Sector::Vertical
        } else {
            Sector::Diagonal135
        }
    }

    /// Quantizes the direction of the gradient vector `(gx, gy)`.
    pub fn from_gradient(gx: f32, gy: f32) -> Self {
        Self::from_degrees(gy.atan2(gx) * RADIANS_TO_DEGREES)
    }

    /// Offsets `(dx, dy)` of the two neighbors lying along this direction, one on each side.
    pub fn neighbor_offsets(self) -> [(i32, i32); 2] {
        match self {
            Sector::Horizontal => [(-1, 0), (1, 0)],
            Sector::Diagonal45 => [(1, 1), (-1, -1)],
            Sector::Vertical => [(0, -1), (0, 1)],
            Sector::Diagonal135 => [(-1, 1), (1, -1)],
        }
    }
}

/// Per-pixel derivatives, magnitude and quantized direction of one smoothed frame.
#[derive(Debug, Clone)]
pub struct GradientField {
    gx: ImageBuffer<Luma<f32>, Vec<f32>>,
    gy: ImageBuffer<Luma<f32>, Vec<f32>>,
    magnitude: ImageBuffer<Luma<f32>, Vec<f32>>,
    sectors: Vec<Sector>,
}

impl GradientField {
    /// Field width in pixels.
    pub fn width(&self) -> u32 {
        self.magnitude.width()
    }

    /// Field height in pixels.
    pub fn height(&self) -> u32 {
        self.magnitude.height()
    }

    /// Horizontal derivative (convolution with `Gx`)
    pub fn gx(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.gx
    }

    /// Vertical derivative (convolution with `Gy`)
    pub fn gy(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.gy
    }

    /// Euclidean gradient magnitude, zero on the border ring.
    pub fn magnitude(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.magnitude
    }

    /// Quantized direction of pixel `(x, y)`.
    pub fn sector(&self, x: u32, y: u32) -> Sector {
        self.sectors[(y * self.width() + x) as usize]
    }

    /// Row-major quantized directions, one per pixel.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Continuous orientation per pixel in `[0, π)`.
    pub fn direction_map(&self) -> Result<DirectionMap, CannyError> {
        let data: Vec<f32> = self
            .gx
            .as_raw()
            .par_iter()
            .zip(self.gy.as_raw().par_iter())
            .map(|(&gx, &gy)| fold_half_turn(gy.atan2(gx)))
            .collect();
        Ok(DirectionMap::from_image(into_luma(
            self.width(),
            self.height(),
            data,
        )?))
    }
}

/// Folds an angle in `(-π, π]` into `[0, π)`.
fn fold_half_turn(angle: f32) -> f32 {
    let folded = angle.rem_euclid(PI);
    // rem_euclid can round up to exactly π for tiny negative inputs
    if folded >= PI {
        0.0
    } else {
        folded
    }
}

/// Computes Sobel gradients of a smoothed frame.
///
/// Rows are processed in parallel, excluding the border ring which stays at zero.
///
/// # Sobel Operators
///
/// Horizontal (Gx):
/// ```text
/// [-1  0  1]
/// [-2  0  2]
/// [-1  0  1]
/// ```
///
/// Vertical (Gy):
/// ```text
/// [-1 -2 -1]
/// [ 0  0  0]
/// [ 1  2  1]
/// ```
pub fn sobel_gradients(smoothed: &SmoothedFrame) -> Result<GradientField, CannyError> {
    let (width, height) = smoothed.dimensions();
    let w = width as usize;
    let h = height as usize;
    let len = pixel_count(width, height)?;
    let pixels = smoothed.as_raw();

    let mut gx = filled(len, 0.0f32)?;
    let mut gy = filled(len, 0.0f32)?;
    let mut mag = filled(len, 0.0f32)?;
    let mut sectors = filled(len, Sector::default())?;

    if w > 2 && h > 2 {
        gx.par_chunks_mut(w)
            .zip(gy.par_chunks_mut(w))
            .zip(mag.par_chunks_mut(w))
            .zip(sectors.par_chunks_mut(w))
            .enumerate()
            .skip(1)
            .take(h - 2)
            .for_each(|(y, (((gx_row, gy_row), mag_row), sector_row))| {
                // Previous row (y-1), current row (y), and next row (y+1)
                let top = &pixels[(y - 1) * w..y * w];
                let mid = &pixels[y * w..(y + 1) * w];
                let bot = &pixels[(y + 1) * w..(y + 2) * w];

                for x in 1..w - 1 {
                    // Weighted column/row sums are subtracted last so that equal
                    // neighborhoods cancel exactly
                    let right = top[x + 1] + 2.0 * mid[x + 1] + bot[x + 1];
                    let left = top[x - 1] + 2.0 * mid[x - 1] + bot[x - 1];
                    let below = bot[x - 1] + 2.0 * bot[x] + bot[x + 1];
                    let above = top[x - 1] + 2.0 * top[x] + top[x + 1];
                    let gx_val = right - left;
                    let gy_val = below - above;

                    gx_row[x] = gx_val;
                    gy_row[x] = gy_val;
                    mag_row[x] = (gx_val * gx_val + gy_val * gy_val).sqrt();
                    sector_row[x] = Sector::from_gradient(gx_val, gy_val);
                }
            });
    }

    debug!("gradients ok for {}x{}", width, height);

    Ok(GradientField {
        gx: into_luma(width, height, gx)?,
        gy: into_luma(width, height, gy)?,
        magnitude: into_luma(width, height, mag)?,
        sectors,
    })
}
