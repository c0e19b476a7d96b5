//! The per-frame edge detection pipeline.

use image::GrayImage;

use crate::error::CannyError;
use crate::frame::{DirectionMap, EdgeMap, Frame};
use crate::gradient::sobel_gradients;
use crate::hysteresis::{derive_cutoffs, trace_edges};
use crate::kernel::GaussianKernel;
use crate::nms::non_maximum_suppression;
use crate::params::CannyParams;
use crate::smooth::gaussian_smooth;

/// Everything the pipeline returns for one frame. The caller owns both buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeOutput {
    /// Binary edge map, values in `{0, 255}`.
    pub edges: EdgeMap,
    /// Orientation per pixel, present only when the parameters ask for it.
    pub direction: Option<DirectionMap>,
}

/// A configured Canny detector for frames of one fixed size.
///
/// Parameters are validated once, at construction, so configuration errors surface before any
/// frame is processed. The pipeline holds no per-frame state: each call allocates its own working
/// buffers and drops them before returning, so one instance can serve many threads at once.
#[derive(Debug, Clone)]
pub struct EdgePipeline {
    width: u32,
    height: u32,
    params: CannyParams,
    kernel: GaussianKernel,
}

impl EdgePipeline {
    /// Creates a pipeline for `width` x `height` frames.
    pub fn new(width: u32, height: u32, params: CannyParams) -> Result<Self, CannyError> {
        if width == 0 || height == 0 {
            return Err(CannyError::EmptyFrame { width, height });
        }
        let kernel = GaussianKernel::new(params.sigma());
        debug!(
            "pipeline {}x{} sigma={} kernel taps={}",
            width,
            height,
            params.sigma(),
            kernel.len()
        );
        Ok(Self {
            width,
            height,
            params,
            kernel,
        })
    }

    /// Frame width this pipeline accepts.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height this pipeline accepts.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Parameters the pipeline was built with.
    pub fn params(&self) -> &CannyParams {
        &self.params
    }

    /// Smoothing kernel derived from `sigma`, built once per pipeline.
    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    /// Runs the pipeline on a raw row-major 8-bit buffer of the configured size.
    pub fn process(&self, pixels: &[u8]) -> Result<EdgeOutput, CannyError> {
        let frame = Frame::new(self.width, self.height, pixels)?;
        self.process_frame(&frame)
    }

    /// Runs the pipeline on a decoded luma image.
    pub fn process_image(&self, image: &GrayImage) -> Result<EdgeOutput, CannyError> {
        self.check_dimensions(image.width(), image.height())?;
        self.process_frame(&Frame::from_image(image)?)
    }

    /// Runs smoothing, gradient estimation, non-maximum suppression and hysteresis in order.
    ///
    /// # Algorithm Pipeline
    ///
    /// 1. Separable Gaussian blur (replicated border)
    /// 2. Sobel gradients, Euclidean magnitude, four-sector direction
    /// 3. Non-maximum suppression along the quantized direction
    /// 4. Percentile cutoffs and hysteresis edge tracing
    pub fn process_frame(&self, frame: &Frame<'_>) -> Result<EdgeOutput, CannyError> {
        self.check_dimensions(frame.width(), frame.height())?;

        let smoothed = gaussian_smooth(frame, &self.kernel)?;
        let gradients = sobel_gradients(&smoothed)?;
        drop(smoothed);

        let direction = if self.params.want_direction() {
            Some(gradients.direction_map()?)
        } else {
            None
        };

        let ridges = non_maximum_suppression(&gradients)?;
        drop(gradients);

        let cutoffs = derive_cutoffs(&ridges, self.params.thresholds())?;
        let edges = trace_edges(&ridges, cutoffs)?;

        Ok(EdgeOutput { edges, direction })
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<(), CannyError> {
        if (width, height) != (self.width, self.height) {
            return Err(CannyError::DimensionMismatch {
                width: self.width,
                height: self.height,
                actual_width: width,
                actual_height: height,
            });
        }
        Ok(())
    }
}

/// One-shot entry point: validates the parameters and runs a single frame.
///
/// # Arguments
///
/// * `pixels` - Row-major 8-bit grayscale buffer of `width * height` bytes
/// * `width`, `height` - Frame dimensions
/// * `params` - Smoothing sigma, hysteresis fractions and the direction-map switch
///
/// # Examples
///
/// ```rust
/// use camera_canny::{canny, CannyParams, EdgeMap};
///
/// // A dark left half meeting a bright right half
/// let (width, height) = (16u32, 12u32);
/// let pixels: Vec<u8> = (0..width * height)
///     .map(|i| if i % width < 8 { 20 } else { 220 })
///     .collect();
///
/// let params = CannyParams::new(1.0, 0.5, 0.9).unwrap();
/// let output = canny(&pixels, width, height, &params).unwrap();
///
/// assert!(output.edges.as_raw().iter().all(|&v| v == EdgeMap::EDGE || v == EdgeMap::BACKGROUND));
/// assert!(output.edges.is_edge(7, 6) || output.edges.is_edge(8, 6));
/// assert!(output.direction.is_none());
/// ```
pub fn canny(
    pixels: &[u8],
    width: u32,
    height: u32,
    params: &CannyParams,
) -> Result<EdgeOutput, CannyError> {
    EdgePipeline::new(width, height, *params)?.process(pixels)
}
