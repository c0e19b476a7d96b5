//! Frame sources feeding the pipeline.
//!
//! - `RawVideoSource`: consecutive raw 8-bit frames from any reader (a file, stdin, a pipe
//!   from `ffmpeg -f rawvideo -pix_fmt gray -` or `rpicam-vid --codec yuv420`).
//! - `ImageSequenceSource`: still images from a directory, sorted by file name.
//! - `SyntheticSource`: a deterministic moving-bar pattern for demos and benchmarks.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma};

use crate::buffer::pixel_count;
use crate::error::StreamError;

/// Anything that hands out grayscale frames of one fixed size until it runs dry.
pub trait FrameSource {
    /// Width and height shared by every frame of this source.
    fn dimensions(&self) -> (u32, u32);

    /// Returns the next frame, or `Ok(None)` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<GrayImage>, StreamError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn next_frame(&mut self) -> Result<Option<GrayImage>, StreamError> {
        (**self).next_frame()
    }
}

/// Reads back-to-back `width * height` byte frames from a reader.
///
/// A clean end of input between frames ends the stream; input that stops part-way through a
/// frame is reported as [`StreamError::TruncatedFrame`].
///
/// Planar YUV 4:2:0 input (as written by most camera tools) can be consumed by setting
/// `frame_stride` to `width * height * 3 / 2`: the luma plane is kept, the chroma planes skipped.
#[derive(Debug)]
pub struct RawVideoSource<R> {
    reader: R,
    width: u32,
    height: u32,
    frame_stride: usize,
}

impl<R: Read> RawVideoSource<R> {
    /// Tightly packed 8-bit gray frames.
    pub fn new(reader: R, width: u32, height: u32) -> Result<Self, StreamError> {
        let len = pixel_count(width, height)?;
        Self::with_stride(reader, width, height, len)
    }

    /// Frames of `frame_stride` bytes whose first `width * height` bytes are the luma plane.
    pub fn with_stride(
        reader: R,
        width: u32,
        height: u32,
        frame_stride: usize,
    ) -> Result<Self, StreamError> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            reader,
            width,
            height,
            frame_stride: frame_stride.max(len),
        })
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Fills `buf` completely. Returns the number of bytes read if input ended first.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let mut read = 0;
        while read < buf.len() {
            match self.reader.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(read)
    }
}

impl<R: Read> FrameSource for RawVideoSource<R> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<GrayImage>, StreamError> {
        let mut frame = vec![0u8; self.frame_stride];
        let read = self.read_full(&mut frame)?;
        if read == 0 {
            return Ok(None);
        }
        if read < frame.len() {
            return Err(StreamError::TruncatedFrame {
                read,
                expected: frame.len(),
            });
        }

        frame.truncate(self.width as usize * self.height as usize);
        GrayImage::from_raw(self.width, self.height, frame)
            .map(Some)
            .ok_or(StreamError::TruncatedFrame {
                read,
                expected: self.frame_stride,
            })
    }
}

/// Still images from a directory, decoded and converted to 8-bit luma.
///
/// Every image must have the size of the first one.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
}

/// Extensions the `image` crate can decode out of the box.
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "pgm", "pnm", "bmp", "tif", "tiff"];

impl ImageSequenceSource {
    /// Lists the decodable images in `dir` and reads the first one to fix the frame size.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StreamError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let known = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if known && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| StreamError::NoFrames(dir.to_path_buf()))?;
        let (width, height) = image::image_dimensions(first).map_err(|source| StreamError::Image {
            path: first.clone(),
            source,
        })?;

        debug!("image sequence of {} frames at {}x{}", paths.len(), width, height);
        Ok(Self {
            paths,
            next: 0,
            width,
            height,
        })
    }

    /// Number of images found.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when the directory held no decodable images.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<GrayImage>, StreamError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let image = image::open(path)
            .map_err(|source| StreamError::Image {
                path: path.clone(),
                source,
            })?
            .into_luma8();

        if image.dimensions() != (self.width, self.height) {
            return Err(StreamError::FrameSizeMismatch {
                path: path.clone(),
                width: self.width,
                height: self.height,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
        Ok(Some(image))
    }
}

/// A bright bar sweeping across a dark background, four columns per frame.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frames: usize,
    emitted: usize,
}

impl SyntheticSource {
    /// Width of the moving bar in pixels.
    const BAR_WIDTH: u32 = 24;
    const BACKGROUND: u8 = 30;
    const FOREGROUND: u8 = 210;

    /// A pattern source that ends after `frames` frames.
    pub fn new(width: u32, height: u32, frames: usize) -> Self {
        Self {
            width,
            height,
            frames,
            emitted: 0,
        }
    }

    /// Frame `index` of the pattern, independent of how many frames were already emitted.
    pub fn render(&self, index: usize) -> GrayImage {
        let span = self.width.max(1) as usize;
        let left = ((index * 4) % span) as u32;
        let right = left + Self::BAR_WIDTH;
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let in_bar = (left..right).contains(&x);
            // A fixed horizontal band adds edges in the other orientation
            let in_band = (self.height / 3..self.height / 2).contains(&y) && x < self.width / 4;
            if in_bar || in_band {
                Luma([Self::FOREGROUND])
            } else {
                Luma([Self::BACKGROUND])
            }
        })
    }
}

impl FrameSource for SyntheticSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<GrayImage>, StreamError> {
        if self.emitted >= self.frames {
            return Ok(None);
        }
        let frame = self.render(self.emitted);
        self.emitted += 1;
        Ok(Some(frame))
    }
}
