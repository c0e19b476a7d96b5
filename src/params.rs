//! Validated detector parameters.

use crate::error::CannyError;

/// Hysteresis thresholds, both fractions in `(0.0, 1.0]` with `thigh >= tlow`.
///
/// `thigh` is a percentile: the fraction of non-zero ridge pixels that fall at or below the
/// strong-edge cutoff. `tlow` scales that cutoff down to the weak-edge cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    tlow: f32,
    thigh: f32,
}

impl Thresholds {
    /// Validates and builds a threshold pair. Out-of-range values are rejected, never clamped.
    pub fn new(tlow: f32, thigh: f32) -> Result<Self, CannyError> {
        check_fraction("tlow", tlow)?;
        check_fraction("thigh", thigh)?;
        if thigh < tlow {
            return Err(CannyError::InvertedThresholds { tlow, thigh });
        }
        Ok(Self { tlow, thigh })
    }

    /// Low fraction, relative to the high cutoff.
    pub fn tlow(&self) -> f32 {
        self.tlow
    }

    /// High fraction, a percentile of the non-zero ridge magnitudes.
    pub fn thigh(&self) -> f32 {
        self.thigh
    }
}

fn check_fraction(name: &'static str, value: f32) -> Result<(), CannyError> {
    // NaN fails both comparisons
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(CannyError::InvalidThreshold { name, value })
    }
}

/// Full parameter set for one pipeline: smoothing sigma, hysteresis thresholds and whether a
/// direction map is produced alongside the edge map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyParams {
    sigma: f32,
    thresholds: Thresholds,
    want_direction: bool,
}

impl CannyParams {
    /// Validates `sigma > 0` and the threshold pair. Direction output is off by default.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use camera_canny::CannyParams;
    ///
    /// let params = CannyParams::new(1.5, 0.4, 0.8).unwrap().with_direction(true);
    /// assert!(params.want_direction());
    ///
    /// assert!(CannyParams::new(0.0, 0.4, 0.8).is_err());
    /// assert!(CannyParams::new(1.0, 0.9, 0.5).is_err());
    /// ```
    pub fn new(sigma: f32, tlow: f32, thigh: f32) -> Result<Self, CannyError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(CannyError::InvalidSigma(sigma));
        }
        Ok(Self {
            sigma,
            thresholds: Thresholds::new(tlow, thigh)?,
            want_direction: false,
        })
    }

    /// Requests (or suppresses) the floating-point direction map.
    pub fn with_direction(mut self, want_direction: bool) -> Self {
        self.want_direction = want_direction;
        self
    }

    /// Standard deviation of the smoothing kernel.
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// The validated hysteresis fractions.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Whether a [`DirectionMap`](crate::DirectionMap) is produced alongside the edges.
    pub fn want_direction(&self) -> bool {
        self.want_direction
    }
}
