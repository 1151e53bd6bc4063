//! Radial lens distortion model
//!
//! The lens polynomial maps a lens-space point to its undistorted counterpart:
//!
//! ```text
//! scale(r²) = K0 + r²·(K1 + r²·(K2 + r²·K3))
//! undistorted(v) = v · scale(|v|²)
//! ```
//!
//! Pre-warping a mesh needs the inverse of `r · scale(r²)`, which has no closed
//! form. It is found by bisection over `[0, 2·r_target]`. This assumes the
//! forward radius is monotonically increasing over that bracket; coefficient
//! sets that break the assumption surface as [`Error::NoConvergence`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Absolute tolerance on the distorted radius, in lens-space units
pub const BISECTION_TOLERANCE: f64 = 1e-6;

/// Extra bisection steps on top of the bracket halvings. The tolerance is on
/// the forward radius, so a slope of up to `2^margin` in `r · scale(r²)` still
/// converges within the cap.
pub const BISECTION_ITERATION_MARGIN: u32 = 24;

/// Step cap for a search over `[0, 2·r_target]`: enough halvings to shrink the
/// bracket below [`BISECTION_TOLERANCE`], plus [`BISECTION_ITERATION_MARGIN`]
pub fn bisection_iteration_cap(r_target: f64) -> u32 {
    let halvings = (2.0 * r_target / BISECTION_TOLERANCE).log2().ceil();
    if halvings.is_finite() && halvings > 0.0 {
        // f64 exponents top out near 1100, far below u32::MAX
        halvings as u32 + BISECTION_ITERATION_MARGIN
    } else {
        BISECTION_ITERATION_MARGIN
    }
}

/// Four radial polynomial coefficients `K0..K3`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionCoefficients(pub [f64; 4]);

impl DistortionCoefficients {
    /// `K0 = 1`, everything else zero: no distortion at all
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 0.0]);

    pub fn new(k0: f64, k1: f64, k2: f64, k3: f64) -> Self {
        Self([k0, k1, k2, k3])
    }

    /// Every coefficient multiplied by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.map(|k| k * factor))
    }
}

impl Default for DistortionCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionModel {
    k: [f64; 4],
}

impl DistortionModel {
    pub fn new(coefficients: DistortionCoefficients) -> Self {
        Self { k: coefficients.0 }
    }

    pub fn coefficients(&self) -> DistortionCoefficients {
        DistortionCoefficients(self.k)
    }

    /// Horner evaluation of the lens polynomial in `r²`
    pub fn undistortion_scale_for_radius_squared(&self, r_sq: f64) -> f64 {
        let k = &self.k;
        k[0] + r_sq * (k[1] + r_sq * (k[2] + r_sq * k[3]))
    }

    pub fn undistortion_scale_for_radius(&self, r: f64) -> f64 {
        self.undistortion_scale_for_radius_squared(r * r)
    }

    pub fn undistortion_scale(&self, v: DVec2) -> f64 {
        self.undistortion_scale_for_radius_squared(v.length_squared())
    }

    /// Lens-space point after removing the lens distortion
    pub fn undistorted_position(&self, v: DVec2) -> DVec2 {
        v * self.undistortion_scale(v)
    }

    /// Scale that pre-warps a point at `r_target` so the lens puts it back there.
    ///
    /// Searches for `r_source` with `r_source · scale(r_source²) == r_target` and
    /// returns `1 / scale(r_source²)`. Scaling a point at `r_target` by the
    /// result lands it at `r_source`. A zero or negative scale at `r_source`
    /// has no usable inverse and is reported as [`Error::DegenerateScale`].
    pub fn distortion_scale_for_radius(&self, r_target: f64) -> Result<f64> {
        let (_, scale) = self.find_source_radius(r_target)?;
        let inverse = 1.0 / scale;
        if !(inverse.is_finite() && inverse > 0.0) {
            return Err(Error::DegenerateScale {
                target_radius: r_target,
                scale,
            });
        }
        Ok(inverse)
    }

    /// Bisection for `r_source` over `[0, 2·r_target]`, returning it with its scale
    pub(crate) fn find_source_radius(&self, r_target: f64) -> Result<(f64, f64)> {
        let iterations = bisection_iteration_cap(r_target);
        let mut min = 0.0;
        let mut max = r_target * 2.0;

        for _ in 0..iterations {
            let r_source = (max - min) / 2.0 + min;
            let scale = self.undistortion_scale_for_radius_squared(r_source * r_source);
            let r_result = scale * r_source;
            if (r_result - r_target).abs() < BISECTION_TOLERANCE {
                return Ok((r_source, scale));
            }
            if r_result < r_target {
                min = r_source;
            } else {
                max = r_source;
            }
        }

        Err(Error::NoConvergence {
            target_radius: r_target,
            iterations,
        })
    }
}

impl Default for DistortionModel {
    fn default() -> Self {
        Self::new(DistortionCoefficients::IDENTITY)
    }
}
