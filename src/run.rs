//! The bounded frame loop: acquire, detect, persist, time.

use std::time::Instant;

use crate::error::{CannyError, StreamError};
use crate::pipeline::{EdgeOutput, EdgePipeline};
use crate::sink::FrameSink;
use crate::source::FrameSource;
use crate::stats::{process_cpu_time, RunStats};

/// Frames processed when no limit is given, about five seconds of 30 fps video.
pub const DEFAULT_MAX_FRAMES: usize = 150;

/// Limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Stop after this many successfully processed frames.
    pub max_frames: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

/// Drives an [`EdgePipeline`] over a [`FrameSource`] into a [`FrameSink`].
///
/// # Failure policy
///
/// - The source ending early ends the run normally.
/// - A source or pipeline error aborts the run.
/// - A sink error is logged; the frame is counted as skipped and the loop moves on.
#[derive(Debug, Clone)]
pub struct Runner {
    pipeline: EdgePipeline,
    config: RunConfig,
}

impl Runner {
    /// Wraps a pipeline with the limits of one run.
    pub fn new(pipeline: EdgePipeline, config: RunConfig) -> Self {
        Self { pipeline, config }
    }

    /// The pipeline applied to every frame.
    pub fn pipeline(&self) -> &EdgePipeline {
        &self.pipeline
    }

    /// Limits of this run.
    pub fn config(&self) -> RunConfig {
        self.config
    }

    /// Runs the loop without progress reporting.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunStats, StreamError>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        self.run_with_progress(source, sink, |_, _| {})
    }

    /// Runs the loop, calling `on_frame(index, output)` after each frame is persisted.
    ///
    /// Frame indices are 1-based and count only frames whose output was written.
    pub fn run_with_progress<S, K, F>(
        &self,
        source: &mut S,
        sink: &mut K,
        mut on_frame: F,
    ) -> Result<RunStats, StreamError>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
        F: FnMut(usize, &EdgeOutput),
    {
        let (width, height) = source.dimensions();
        if (width, height) != (self.pipeline.width(), self.pipeline.height()) {
            return Err(CannyError::DimensionMismatch {
                width: self.pipeline.width(),
                height: self.pipeline.height(),
                actual_width: width,
                actual_height: height,
            }
            .into());
        }

        let mut stats = RunStats::default();
        let total_start = Instant::now();

        while stats.frames_processed() < self.config.max_frames {
            let frame_start = Instant::now();
            let index = stats.frames_processed() + 1;

            let Some(frame) = source.next_frame()? else {
                info!("source ended after {} frames", stats.frames_processed());
                break;
            };

            debug!("processing frame {}/{}", index, self.config.max_frames);
            let output = self.pipeline.process_image(&frame)?;

            if let Err(err) = sink.write(index, &output.edges, output.direction.as_ref()) {
                warn!("error writing frame {}: {}", index, err);
                stats.frames_skipped += 1;
                continue;
            }

            stats.frame_times.push(frame_start.elapsed());
            on_frame(index, &output);
        }

        stats.wall_time = total_start.elapsed();
        stats.cpu_time = process_cpu_time();
        info!(
            "processed {} frames in {:.3}s",
            stats.frames_processed(),
            stats.wall_time.as_secs_f64()
        );
        Ok(stats)
    }
}
