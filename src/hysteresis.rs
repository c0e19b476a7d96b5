//! Hysteresis thresholding with percentile-derived cutoffs.
//!
//! Ridge magnitudes are rounded to integer levels and collected in a histogram. The high
//! cutoff is the level below which the `thigh` fraction of non-zero ridge pixels falls; the low
//! cutoff is `tlow` times the high one. Tracing then grows edges from strong seeds over
//! 8-connected ridge pixels above the low cutoff, using an explicit stack so arbitrarily large
//! components cannot exhaust the call stack.

use image::{GrayImage, Luma};
use imageproc::definitions::{HasBlack, HasWhite};

use crate::buffer::{filled, into_luma, pixel_count, try_push};
use crate::error::CannyError;
use crate::frame::EdgeMap;
use crate::nms::RidgeField;
use crate::params::Thresholds;

/// Magnitudes above this level share the top histogram bin.
const MAX_LEVEL: u32 = u16::MAX as u32;

/// 8-connected neighborhood offsets.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Absolute cutoffs in magnitude levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cutoffs {
    /// Weak pixels must exceed this level to be promoted.
    pub low: u32,
    /// Pixels at or above this level seed edges.
    pub high: u32,
}

/// Integer level of a ridge magnitude. Level 0 means "not a ridge".
#[inline]
fn level(magnitude: f32) -> u32 {
    (magnitude.round() as u32).min(MAX_LEVEL)
}

/// Derives absolute cutoffs from the distribution of non-zero ridge magnitudes.
///
/// # Algorithm
///
/// 1. Histogram the rounded levels of all non-zero ridge pixels (`n` of them)
/// 2. `high` is the smallest level whose cumulative count reaches `round(thigh * n)`
///    (at least one pixel, at most all of them)
/// 3. `low = round(tlow * high)`
///
/// An empty ridge field yields `Cutoffs { low: 0, high: 0 }`. Fails only when the histogram
/// cannot be allocated.
pub fn derive_cutoffs(
    ridges: &RidgeField,
    thresholds: Thresholds,
) -> Result<Cutoffs, CannyError> {
    let levels = ridges.as_raw().iter().map(|&m| level(m)).filter(|&l| l > 0);

    let max_level = levels.clone().max().unwrap_or(0);
    if max_level == 0 {
        debug!("no ridge pixels, cutoffs are zero");
        return Ok(Cutoffs::default());
    }

    let mut histogram = filled(max_level as usize + 1, 0usize)?;
    let mut total = 0usize;
    for l in levels {
        histogram[l as usize] += 1;
        total += 1;
    }

    let target = ((total as f64 * thresholds.thigh() as f64) + 0.5).floor() as usize;
    let target = target.clamp(1, total);

    let mut cumulative = 0usize;
    let mut high = max_level;
    for (l, &count) in histogram.iter().enumerate().skip(1) {
        cumulative += count;
        if cumulative >= target {
            high = l as u32;
            break;
        }
    }

    let low = ((high as f64 * thresholds.tlow() as f64) + 0.5).floor() as u32;

    debug!(
        "cutoffs low={} high={} from {} ridge pixels",
        low, high, total
    );
    Ok(Cutoffs { low, high })
}

/// Classifies ridge pixels as edge or background using absolute `cutoffs`.
///
/// Every non-zero ridge pixel at or above `cutoffs.high` becomes an edge and seeds a traversal;
/// any 8-connected ridge pixel above `cutoffs.low` reached from a seed is promoted as well. The
/// result is a transitive closure, so it does not depend on traversal order.
///
/// # Examples
///
/// ```rust
/// use camera_canny::{trace_edges, Cutoffs, RidgeField};
///
/// // A strong pixel linked to a weak one, and a weak pixel on its own
/// let ridges = RidgeField::from_raw(5, 1, vec![90.0, 30.0, 0.0, 0.0, 30.0]).unwrap();
/// let edges = trace_edges(&ridges, Cutoffs { low: 20, high: 80 }).unwrap();
///
/// assert_eq!(edges.as_raw(), &[255, 255, 0, 0, 0]);
/// ```
pub fn trace_edges(ridges: &RidgeField, cutoffs: Cutoffs) -> Result<EdgeMap, CannyError> {
    let (width, height) = (ridges.width(), ridges.height());
    let w = width as i64;
    let h = height as i64;
    let len = pixel_count(width, height)?;
    let magnitudes = ridges.as_raw();

    let edge = Luma::<u8>::white()[0];
    let background = Luma::<u8>::black()[0];
    let mut out = filled(len, background)?;
    // Stack for depth-first traversal of connected edge components
    let mut stack: Vec<usize> = Vec::new();

    for seed in 0..len {
        let seed_level = level(magnitudes[seed]);
        if seed_level == 0 || seed_level < cutoffs.high || out[seed] == edge {
            continue;
        }

        out[seed] = edge;
        try_push(&mut stack, seed)?;

        while let Some(idx) = stack.pop() {
            let x = (idx % width as usize) as i64;
            let y = (idx / width as usize) as i64;

            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let n = (ny * w + nx) as usize;
                // Accept weak edges that are connected to strong edges
                if out[n] == background && level(magnitudes[n]) > cutoffs.low {
                    out[n] = edge;
                    try_push(&mut stack, n)?;
                }
            }
        }
    }

    let image: GrayImage = into_luma(width, height, out)?;
    let edges = EdgeMap::from_image(image);
    debug!("edge pixels: {}", edges.edge_count());
    Ok(edges)
}

/// Derives cutoffs from `thresholds` and traces edges in one step.
pub fn hysteresis(ridges: &RidgeField, thresholds: Thresholds) -> Result<EdgeMap, CannyError> {
    trace_edges(ridges, derive_cutoffs(ridges, thresholds)?)
}
