//! # Camera Canny Edge Detection Library
//!
//! This crate detects edges in a bounded sequence of live grayscale video frames using the
//! multi-stage Canny algorithm. Every frame runs through the same deterministic pipeline and
//! the crate reports per-run throughput statistics around it.
//!
//! ## Features
//!
//! - Separable Gaussian smoothing with a replicated border
//! - Parallel Sobel gradient estimation with four-sector direction quantization
//! - Non-maximum suppression for single-pixel-wide ridges
//! - Percentile-driven hysteresis thresholding with an explicit work stack
//! - Frame sources (raw 8-bit streams, image directories, a synthetic pattern)
//! - PGM persistence of edge and direction maps
//! - Optional debug logging (enable with `logger` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use camera_canny::{CannyParams, EdgePipeline};
//!
//! let frame = image::open("frame.png").unwrap().to_luma8();
//! let params = CannyParams::new(1.5, 0.4, 0.8).unwrap();
//! let pipeline = EdgePipeline::new(frame.width(), frame.height(), params).unwrap();
//!
//! let output = pipeline.process_image(&frame).unwrap();
//! output.edges.save("edges.pgm").unwrap();
//!
//! println!("Found {} edge pixels", output.edges.edge_count());
//! ```
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! Enable debug logging to monitor the edge detection pipeline:
//!
//! ```toml
//! [dependencies]
//! camera-canny = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! ```rust,no_run
//! use camera_canny::{canny, CannyParams};
//!
//! // Initialize logger to see debug output
//! env_logger::init();
//!
//! let frame = image::open("frame.png").unwrap().to_luma8();
//! let params = CannyParams::new(1.0, 0.5, 0.9).unwrap();
//! let output = canny(frame.as_raw(), frame.width(), frame.height(), &params).unwrap();
//! // With logger feature, you'll see debug messages like:
//! // DEBUG camera_canny::smooth: smoothed 640x480 with kernel of 7 taps
//! // DEBUG camera_canny::nms: ridge pixels: 4711
//! // DEBUG camera_canny::hysteresis: cutoffs low=21 high=42 from 4711 ridge pixels
//! ```
//!
//! ### CLI Feature
//!
//! The `cli` feature builds the `camera-canny` binary, which pulls frames from a source,
//! writes `frame001.pgm`, `frame002.pgm`, ... and prints the run's performance statistics.
//!
//! ```text
//! ffmpeg -f v4l2 -video_size 640x480 -i /dev/video0 -f rawvideo -pix_fmt gray - \
//!     | camera-canny 1.5 0.4 0.8 --input - --output-dir out
//! ```
//!
//! ## Advanced Usage
//!
//! ```rust,no_run
//! use camera_canny::{
//!     derive_cutoffs, gaussian_smooth, non_maximum_suppression, sobel_gradients, trace_edges,
//!     Frame, GaussianKernel, Thresholds,
//! };
//!
//! let image = image::open("frame.png").unwrap().to_luma8();
//! let frame = Frame::from_image(&image).unwrap();
//!
//! // Run the stages by hand to inspect intermediate fields
//! let kernel = GaussianKernel::new(2.0);
//! let smoothed = gaussian_smooth(&frame, &kernel).unwrap();
//! let gradients = sobel_gradients(&smoothed).unwrap();
//! let ridges = non_maximum_suppression(&gradients).unwrap();
//!
//! let cutoffs = derive_cutoffs(&ridges, Thresholds::new(0.3, 0.7).unwrap()).unwrap();
//! let edges = trace_edges(&ridges, cutoffs).unwrap();
//! println!("high cutoff {} -> {} edge pixels", cutoffs.high, edges.edge_count());
//! ```

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {
        let _ = format_args!($($arg)*);
    };
}

#[cfg(feature = "logger")]
macro_rules! info {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! info {
    ($($arg:tt)*) => {
        let _ = format_args!($($arg)*);
    };
}

#[cfg(feature = "logger")]
macro_rules! warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! warn {
    ($($arg:tt)*) => {
        let _ = format_args!($($arg)*);
    };
}

mod buffer;
pub mod error;
pub mod frame;
pub mod gradient;
pub mod hysteresis;
pub mod kernel;
pub mod nms;
pub mod params;
pub mod pipeline;
pub mod run;
pub mod sink;
pub mod smooth;
pub mod source;
pub mod stats;

pub use error::{CannyError, StreamError};
pub use frame::{DirectionMap, EdgeMap, Frame};
pub use gradient::{sobel_gradients, GradientField, Sector, BORDER_WIDTH};
pub use hysteresis::{derive_cutoffs, hysteresis, trace_edges, Cutoffs};
pub use kernel::GaussianKernel;
pub use nms::{non_maximum_suppression, RidgeField};
pub use params::{CannyParams, Thresholds};
pub use pipeline::{canny, EdgeOutput, EdgePipeline};
pub use run::{RunConfig, Runner};
pub use sink::{write_pgm, FrameSink, NullSink, PgmSequenceWriter};
pub use smooth::{gaussian_smooth, SmoothedFrame};
pub use source::{FrameSource, ImageSequenceSource, RawVideoSource, SyntheticSource};
pub use stats::RunStats;
