//! Non-maximum suppression: thins the gradient magnitude to single-pixel-wide ridges.

use image::{ImageBuffer, Luma};
use rayon::prelude::*;

use crate::buffer::{filled, into_luma, pixel_count};
use crate::error::CannyError;
use crate::gradient::{GradientField, BORDER_WIDTH};

/// Gradient magnitude after suppression: ridge pixels keep their magnitude, all others are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeField {
    magnitude: ImageBuffer<Luma<f32>, Vec<f32>>,
}

impl RidgeField {
    /// Builds a ridge field from raw row-major magnitudes.
    ///
    /// Useful for driving hysteresis with a hand-made field; negative or non-finite values are
    /// treated as zero.
    pub fn from_raw(width: u32, height: u32, magnitudes: Vec<f32>) -> Result<Self, CannyError> {
        let expected = pixel_count(width, height)?;
        if magnitudes.len() != expected {
            return Err(CannyError::BufferSize {
                width,
                height,
                expected,
                actual: magnitudes.len(),
            });
        }
        let magnitudes = magnitudes
            .into_iter()
            .map(|m| if m.is_finite() && m > 0.0 { m } else { 0.0 })
            .collect();
        Ok(Self {
            magnitude: into_luma(width, height, magnitudes)?,
        })
    }

    /// Field width in pixels.
    pub fn width(&self) -> u32 {
        self.magnitude.width()
    }

    /// Field height in pixels.
    pub fn height(&self) -> u32 {
        self.magnitude.height()
    }

    /// Ridge magnitude of pixel `(x, y)`, zero when suppressed.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.magnitude.get_pixel(x, y)[0]
    }

    /// Row-major ridge magnitudes.
    pub fn as_raw(&self) -> &[f32] {
        self.magnitude.as_raw()
    }

    /// Borrows the magnitudes as a single-channel float image.
    pub fn as_image(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.magnitude
    }

    /// Number of pixels with non-zero ridge magnitude.
    pub fn ridge_count(&self) -> usize {
        self.magnitude.as_raw().iter().filter(|&&m| m > 0.0).count()
    }
}

/// Performs non-maximum suppression to thin edges to single-pixel width.
///
/// Each interior pixel is compared with its two neighbors along the quantized gradient
/// direction (see [`Sector::neighbor_offsets`](crate::Sector::neighbor_offsets)). It survives
/// when its magnitude is strictly greater than the first neighbor and greater than or equal to
/// the second; otherwise it is set to zero. The one-sided tie rule keeps exactly one pixel of a
/// plateau, so a symmetric step still yields a single-pixel-wide ridge.
///
/// Border pixels are never ridge candidates. The border ring carries no magnitude, so a pixel
/// whose comparison neighbor lies on the ring cannot be shown to be a maximum and is suppressed
/// as well.
///
/// # Edge Direction Quantization
///
/// - 0° (horizontal): Compare with left and right neighbors
/// - 45° (diagonal): Compare with diagonal neighbors (↘ and ↖)
/// - 90° (vertical): Compare with top and bottom neighbors
/// - 135° (diagonal): Compare with diagonal neighbors (↙ and ↗)
pub fn non_maximum_suppression(field: &GradientField) -> Result<RidgeField, CannyError> {
    let (width, height) = (field.width(), field.height());
    let w = width as usize;
    let h = height as usize;
    let len = pixel_count(width, height)?;
    let g = field.magnitude().as_raw();
    let sectors = field.sectors();

    let mut out = filled(len, 0.0f32)?;

    if w > 2 && h > 2 {
        out.par_chunks_mut(w)
            .enumerate()
            .skip(1)
            .take(h - 2)
            .for_each(|(y, out_row)| {
                for x in 1..w - 1 {
                    let idx = y * w + x;
                    let pixel = g[idx];
                    if pixel <= 0.0 {
                        continue;
                    }

                    let [(ax, ay), (bx, by)] = sectors[idx].neighbor_offsets();
                    let (Some(first), Some(second)) = (
                        interior_neighbor(x, y, ax, ay, w, h),
                        interior_neighbor(x, y, bx, by, w, h),
                    ) else {
                        continue;
                    };

                    // Suppress pixel if it's not a local maximum along gradient direction
                    if pixel > g[first] && pixel >= g[second] {
                        out_row[x] = pixel;
                    }
                }
            });
    }

    let ridges = RidgeField {
        magnitude: into_luma(width, height, out)?,
    };
    debug!("ridge pixels: {}", ridges.ridge_count());
    Ok(ridges)
}

/// Index of the neighbor at `(x + dx, y + dy)`, or `None` when it falls on the border ring.
#[inline]
fn interior_neighbor(x: usize, y: usize, dx: i32, dy: i32, w: usize, h: usize) -> Option<usize> {
    let ring = BORDER_WIDTH as isize;
    let nx = x as isize + dx as isize;
    let ny = y as isize + dy as isize;
    let inside =
        (ring..w as isize - ring).contains(&nx) && (ring..h as isize - ring).contains(&ny);
    inside.then(|| ny as usize * w + nx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::gradient::sobel_gradients;
    use crate::kernel::GaussianKernel;
    use crate::smooth::{gaussian_smooth, SmoothedFrame};

    fn ridges_of(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> RidgeField {
        let smoothed: SmoothedFrame = ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)]));
        non_maximum_suppression(&sobel_gradients(&smoothed).unwrap()).unwrap()
    }

    #[test]
    fn tied_ramp_columns_thin_to_one() {
        // Columns 4 and 5 share the steepest central difference
        let profile = [0.0, 0.0, 0.0, 10.0, 30.0, 70.0, 90.0, 100.0, 100.0, 100.0];
        let ridges = ridges_of(10, 6, |x, _| profile[x as usize]);

        for y in 1..5 {
            let row: Vec<u32> = (0..10).filter(|&x| ridges.get(x, y) > 0.0).collect();
            assert_eq!(row, vec![4], "row {y}");
        }
    }

    #[test]
    fn plateau_keeps_a_single_pixel() {
        // A linear ramp gives columns 3..=7 the same gradient magnitude
        let profile = [0.0, 0.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 50.0, 50.0, 50.0];
        let ridges = ridges_of(11, 5, |x, _| profile[x as usize]);

        for y in 1..4 {
            let row: Vec<u32> = (0..11).filter(|&x| ridges.get(x, y) > 0.0).collect();
            assert_eq!(row, vec![3], "row {y}");
        }
    }

    #[test]
    fn diagonal_step_ridges_stay_on_the_line_near_the_border() {
        // Dark below the anti-diagonal x + y = 7.5, which meets the top and left border
        let pixels: Vec<u8> = (0..12u32)
            .flat_map(|y| (0..12u32).map(move |x| if x + y < 8 { 30 } else { 210 }))
            .collect();
        let frame = Frame::new(12, 12, &pixels).unwrap();

        for sigma in [1.0, 1.5] {
            let smoothed = gaussian_smooth(&frame, &GaussianKernel::new(sigma)).unwrap();
            let ridges = non_maximum_suppression(&sobel_gradients(&smoothed).unwrap()).unwrap();

            assert!(ridges.ridge_count() > 0);
            for y in 0..12 {
                for x in 0..12 {
                    if ridges.get(x, y) > 0.0 {
                        let distance = (x as f32 + y as f32 - 7.5).abs() / 2f32.sqrt();
                        assert!(distance <= 1.0, "sigma {sigma}: ridge at ({x}, {y})");
                    }
                }
            }
        }
    }

    #[test]
    fn border_pixels_are_never_ridges() {
        let ridges = ridges_of(8, 8, |x, y| ((x * 53 + y * 29) % 97) as f32);
        for y in 0..8 {
            for x in 0..8 {
                if x == 0 || y == 0 || x == 7 || y == 7 {
                    assert_eq!(ridges.get(x, y), 0.0);
                }
            }
        }
    }

    #[test]
    fn constant_field_has_no_ridges() {
        let ridges = ridges_of(9, 7, |_, _| 42.0);
        assert_eq!(ridges.ridge_count(), 0);
    }

    #[test]
    fn from_raw_validates_length_and_clears_invalid_values() {
        assert!(RidgeField::from_raw(3, 3, vec![0.0; 8]).is_err());

        let field = RidgeField::from_raw(2, 2, vec![1.0, -3.0, f32::NAN, 2.5]).unwrap();
        assert_eq!(field.as_raw(), &[1.0, 0.0, 0.0, 2.5]);
        assert_eq!(field.ridge_count(), 2);
    }
}
