//! One-dimensional Gaussian smoothing kernels.

/// Half-width of the kernel in units of sigma.
const SUPPORT_SIGMAS: f32 = 2.5;

/// Normalized, symmetric, odd-length Gaussian kernel.
///
/// The support is `ceil(2.5 * sigma)` taps on each side of the centre, trimmed while the
/// outermost tap is negligible (below `f32::EPSILON` of the peak). A vanishing sigma therefore
/// collapses to the identity kernel `[1.0]` instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Builds the kernel for `sigma`. Non-positive or non-finite values yield the identity kernel.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use camera_canny::GaussianKernel;
    ///
    /// let kernel = GaussianKernel::new(1.0);
    /// assert_eq!(kernel.len(), 7);
    /// assert_eq!(kernel.radius(), 3);
    ///
    /// assert_eq!(GaussianKernel::new(1e-6).weights(), &[1.0]);
    /// ```
    pub fn new(sigma: f32) -> Self {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Self { weights: vec![1.0] };
        }

        let mut radius = (SUPPORT_SIGMAS * sigma).ceil() as usize;
        while radius > 0 && relative_weight(radius, sigma) < f32::EPSILON {
            radius -= 1;
        }

        let mut weights: Vec<f32> = (0..=2 * radius)
            .map(|i| relative_weight(i.abs_diff(radius), sigma))
            .collect();
        let sum: f32 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);

        Self { weights }
    }

    /// Normalized taps, centre tap in the middle.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of taps, always odd.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Never true; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Taps on each side of the centre.
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }
}

/// `exp(-d^2 / 2 sigma^2)`, the Gaussian relative to its peak.
fn relative_weight(distance: usize, sigma: f32) -> f32 {
    let d = distance as f32;
    (-0.5 * d * d / (sigma * sigma)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kernels_are_odd_symmetric_and_normalized() {
        for sigma in [0.05, 0.3, 0.6, 1.0, 1.5, 2.25, 4.0, 10.0] {
            let kernel = GaussianKernel::new(sigma);
            let w = kernel.weights();

            assert_eq!(w.len() % 2, 1, "sigma {sigma}");
            for i in 0..w.len() {
                assert_eq!(w[i], w[w.len() - 1 - i], "sigma {sigma} tap {i}");
            }
            assert_relative_eq!(w.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn length_grows_monotonically_with_sigma() {
        let mut previous = 0;
        for step in 1..200 {
            let len = GaussianKernel::new(step as f32 * 0.05).len();
            assert!(len >= previous);
            previous = len;
        }
    }

    #[test]
    fn degenerate_sigma_gives_identity() {
        assert_eq!(GaussianKernel::new(1e-4).weights(), &[1.0]);
        assert_eq!(GaussianKernel::new(0.0).weights(), &[1.0]);
        assert_eq!(GaussianKernel::new(-2.0).weights(), &[1.0]);
    }

    #[test]
    fn peak_is_at_the_centre() {
        let kernel = GaussianKernel::new(2.0);
        let centre = kernel.weights()[kernel.radius()];
        assert!(kernel.weights().iter().all(|&w| w <= centre));
    }
}
