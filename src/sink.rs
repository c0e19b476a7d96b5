//! Persistence of edge and direction maps as binary PGM (P5) rasters.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageEncoder};

use crate::error::StreamError;
use crate::frame::{DirectionMap, EdgeMap};

/// Receives the output of each processed frame.
pub trait FrameSink {
    /// Persists frame `index` (1-based) and, when present, its direction map.
    fn write(
        &mut self,
        index: usize,
        edges: &EdgeMap,
        direction: Option<&DirectionMap>,
    ) -> Result<(), StreamError>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write(
        &mut self,
        index: usize,
        edges: &EdgeMap,
        direction: Option<&DirectionMap>,
    ) -> Result<(), StreamError> {
        (**self).write(index, edges, direction)
    }
}

/// Discards every frame, for timing runs that should not touch the disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn write(
        &mut self,
        _index: usize,
        _edges: &EdgeMap,
        _direction: Option<&DirectionMap>,
    ) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Writes a single-channel 8-bit raster as binary PGM with a maximum value of 255.
pub fn write_pgm<P: AsRef<Path>>(path: P, image: &GrayImage) -> Result<(), StreamError> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    PnmEncoder::new(file)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::L8,
        )
        .map_err(|source| StreamError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes `frame001.pgm`, `frame002.pgm`, ... into one directory.
///
/// Direction maps go next to their edge map as `frame001-dir.pgm`, scaled from `[0, π)` onto
/// `0..=255`.
#[derive(Debug, Clone)]
pub struct PgmSequenceWriter {
    dir: PathBuf,
    prefix: String,
    invert: bool,
}

impl PgmSequenceWriter {
    /// Creates the output directory if needed.
    pub fn create<P: Into<PathBuf>>(dir: P) -> Result<Self, StreamError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: "frame".to_string(),
            invert: false,
        })
    }

    /// File name prefix, `frame` by default.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Writes dark edges on white instead of white edges on black.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Path of the edge map for frame `index`.
    pub fn edge_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{:03}.pgm", self.prefix, index))
    }

    /// Path of the direction map for frame `index`.
    pub fn direction_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{:03}-dir.pgm", self.prefix, index))
    }
}

impl FrameSink for PgmSequenceWriter {
    fn write(
        &mut self,
        index: usize,
        edges: &EdgeMap,
        direction: Option<&DirectionMap>,
    ) -> Result<(), StreamError> {
        let edge_path = self.edge_path(index);
        if self.invert {
            write_pgm(&edge_path, &edges.inverted())?;
        } else {
            write_pgm(&edge_path, edges.as_image())?;
        }

        if let Some(direction) = direction {
            write_pgm(self.direction_path(index), &direction.to_gray())?;
        }
        debug!("wrote {}", edge_path.display());
        Ok(())
    }
}
