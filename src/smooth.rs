//! Separable Gaussian smoothing.
//!
//! The frame is convolved with the 1-D kernel horizontally, then vertically. Samples that fall
//! outside the frame replicate the nearest edge pixel (index clamping), so every output pixel is
//! defined and the result is bit-reproducible. Rows are processed in parallel; each row writes
//! only its own slice, so the output does not depend on scheduling.

use image::{ImageBuffer, Luma};
use rayon::prelude::*;

use crate::buffer::{filled, into_luma, pixel_count};
use crate::error::CannyError;
use crate::frame::Frame;
use crate::kernel::GaussianKernel;

/// Blurred intensities, same dimensions as the source frame.
pub type SmoothedFrame = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Applies `kernel` along both axes of `frame`.
///
/// # Examples
///
/// ```rust
/// use camera_canny::{gaussian_smooth, Frame, GaussianKernel};
///
/// let pixels = vec![100u8; 16];
/// let frame = Frame::new(4, 4, &pixels).unwrap();
/// let smoothed = gaussian_smooth(&frame, &GaussianKernel::new(1.0)).unwrap();
///
/// // A constant frame stays constant under a normalized kernel
/// assert!(smoothed.pixels().all(|p| (p[0] - 100.0).abs() < 1e-3));
/// ```
pub fn gaussian_smooth(
    frame: &Frame<'_>,
    kernel: &GaussianKernel,
) -> Result<SmoothedFrame, CannyError> {
    let (width, height) = frame.dimensions();
    let w = width as usize;
    let h = height as usize;
    let len = pixel_count(width, height)?;
    let weights = kernel.weights();
    let radius = kernel.radius() as isize;

    // Horizontal pass
    let mut tmp = filled(len, 0.0f32)?;
    tmp.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        let src = frame.row(y as u32);
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &weight) in weights.iter().enumerate() {
                let sx = clamp_index(x as isize + k as isize - radius, w);
                acc += src[sx] as f32 * weight;
            }
            *out = acc;
        }
    });

    // Vertical pass
    let mut out = filled(len, 0.0f32)?;
    out.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &weight) in weights.iter().enumerate() {
                let sy = clamp_index(y as isize + k as isize - radius, h);
                acc += tmp[sy * w + x] * weight;
            }
            *out = acc;
        }
    });

    debug!("smoothed {}x{} with kernel of {} taps", width, height, kernel.len());

    into_luma(width, height, out)
}

/// Replicate-border policy: indices before the first sample map to 0, past the last to `len - 1`.
#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
