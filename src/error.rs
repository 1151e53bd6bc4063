//! Error types for distortion setup
//!
//! Numeric helpers never panic; anything that would leave a static GPU
//! resource half-built is reported here so startup can abort instead.

use thiserror::Error;

/// Errors raised while deriving or generating distortion resources
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} resolution {width}x{height} is invalid (each axis must be at least {minimum})")]
    InvalidResolution {
        kind: &'static str,
        width: u32,
        height: u32,
        minimum: u32,
    },

    /// The forward scale is not monotonic over the search bracket for these coefficients
    #[error("inverse distortion did not converge for radius {target_radius} after {iterations} iterations")]
    NoConvergence { target_radius: f64, iterations: u32 },

    /// The bisection converged on a radius whose scale has no positive inverse
    #[error("distortion scale {scale} at radius {target_radius} cannot be inverted")]
    DegenerateScale { target_radius: f64, scale: f64 },

    /// Vertex or index numbering would collide with the strip restart index
    #[error("distortion mesh {width}x{height} needs more indices than 32-bit strips can address")]
    MeshTooLarge { width: u32, height: u32 },

    #[error("invalid device profile: {0}")]
    InvalidProfile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
