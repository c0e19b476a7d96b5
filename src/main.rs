//! Camera Canny edge detection over a bounded run of frames.
//!
//! # Usage
//!
//! ```bash
//! # Live camera, piped as raw 8-bit gray frames
//! ffmpeg -f v4l2 -video_size 640x480 -i /dev/video0 -f rawvideo -pix_fmt gray - \
//!     | camera-canny 1.5 0.4 0.8 --input -
//!
//! # Raspberry Pi camera, YUV 4:2:0 output (luma plane is used)
//! rpicam-vid -t 0 --width 640 --height 480 --codec yuv420 -o - \
//!     | camera-canny 1.5 0.4 0.8 --input - --yuv420
//!
//! # A directory of still images, with direction maps
//! camera-canny 2.0 0.3 0.9 --input frames/ --write-direction --output-dir out
//!
//! # Synthetic pattern, timing only
//! camera-canny 1.0 0.5 0.9 --input synthetic --no-save
//! ```
//!
//! The edge maps are written as `frame001.pgm`, `frame002.pgm`, ...; afterwards they can be
//! encoded into a video with ffmpeg.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camera_canny::run::DEFAULT_MAX_FRAMES;
use camera_canny::{
    CannyParams, EdgePipeline, FrameSink, FrameSource, ImageSequenceSource, NullSink,
    PgmSequenceWriter, RawVideoSource, RunConfig, Runner, SyntheticSource,
};
use clap::Parser;
use env_logger::Builder;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Standard deviation of the gaussian blur kernel.
    sigma: f32,

    /// Fraction (0.0-1.0] of the high edge strength threshold.
    tlow: f32,

    /// Fraction (0.0-1.0] of the distribution of non-zero edge strengths.
    thigh: f32,

    /// Also write a direction image per frame.
    #[arg(long)]
    write_direction: bool,

    /// Frame source: a raw 8-bit stream file, `-` for stdin, a directory of images,
    /// or `synthetic`.
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Frame width for raw and synthetic input.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height for raw and synthetic input.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Raw input is planar YUV 4:2:0; only the luma plane is used.
    #[arg(long)]
    yuv420: bool,

    /// Number of frames to process.
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: usize,

    /// Directory for the output images.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File name prefix of the output images.
    #[arg(long, default_value = "frame")]
    prefix: String,

    /// Write dark edges on a white background.
    #[arg(long)]
    invert: bool,

    /// Do not write any output images.
    #[arg(long)]
    no_save: bool,
}

fn open_source(cli: &Cli) -> Result<Box<dyn FrameSource>> {
    let stride = |w: u32, h: u32| {
        let luma = w as usize * h as usize;
        if cli.yuv420 {
            luma + luma / 2
        } else {
            luma
        }
    };

    if cli.input == "synthetic" {
        return Ok(Box::new(SyntheticSource::new(
            cli.width,
            cli.height,
            cli.max_frames,
        )));
    }

    if cli.input == "-" {
        info!("reading {}x{} frames from stdin", cli.width, cli.height);
        let stdin = io::stdin().lock();
        return Ok(Box::new(RawVideoSource::with_stride(
            stdin,
            cli.width,
            cli.height,
            stride(cli.width, cli.height),
        )?));
    }

    let path = Path::new(&cli.input);
    if path.is_dir() {
        let source = ImageSequenceSource::open(path)
            .with_context(|| format!("failed to open image directory {}", path.display()))?;
        info!("reading {} images from {}", source.len(), path.display());
        return Ok(Box::new(source));
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    info!("reading {}x{} frames from {}", cli.width, cli.height, path.display());
    Ok(Box::new(RawVideoSource::with_stride(
        BufReader::new(file),
        cli.width,
        cli.height,
        stride(cli.width, cli.height),
    )?))
}

fn main() -> Result<()> {
    Builder::from_default_env().format_timestamp_millis().init();
    let cli = Cli::parse();

    // Parameters are checked before any frame is pulled from the source
    let params = CannyParams::new(cli.sigma, cli.tlow, cli.thigh)
        .context("invalid detector parameters")?
        .with_direction(cli.write_direction);

    let mut source = open_source(&cli)?;
    let (width, height) = source.dimensions();
    let pipeline = EdgePipeline::new(width, height, params)?;
    let runner = Runner::new(
        pipeline,
        RunConfig {
            max_frames: cli.max_frames,
        },
    );

    let mut sink: Box<dyn FrameSink> = if cli.no_save {
        Box::new(NullSink)
    } else {
        Box::new(
            PgmSequenceWriter::create(&cli.output_dir)
                .with_context(|| format!("failed to create {}", cli.output_dir.display()))?
                .with_prefix(cli.prefix.as_str())
                .inverted(cli.invert),
        )
    };

    let max_frames = cli.max_frames;
    let stats = runner
        .run_with_progress(&mut source, &mut sink, |index, _| {
            let mut stdout = io::stdout().lock();
            let _ = write!(stdout, "\rProcessed frame {index}/{max_frames}");
            let _ = stdout.flush();
        })
        .context("frame loop aborted")?;

    println!("\n\n{stats}");

    if !cli.no_save && stats.frames_processed() > 0 {
        let pattern = cli.output_dir.join(format!("{}%03d.pgm", cli.prefix));
        println!("\nTo encode processed frames into video, run:");
        println!(
            "ffmpeg -i {} -pix_fmt yuvj420p {}_vid.h264",
            pattern.display(),
            cli.prefix
        );
    }

    Ok(())
}
