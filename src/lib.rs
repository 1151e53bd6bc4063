//! VR Distortion - lens correction for head-mounted displays
//!
//! The headset lenses bend the panel image outward. This crate computes the
//! counter-warp so a normal perspective render looks straight through the
//! lens, and packages it as static GPU resources:
//!
//! - a per-pixel lookup texture (cheap to build, sampled by the warp shader)
//! - a pre-warped triangle-strip mesh (cheaper to draw, built by inverting the
//!   lens polynomial per vertex)
//!
//! Typical setup, done once before the first frame:
//!
//! ```no_run
//! use vr_distortion::{CalibrationStore, DisplayLayout, DistortionHelper, DistortionResources,
//!     DistortionSettings, HmdInfo, StereoConfig, StereoRig};
//!
//! # fn main() -> vr_distortion::Result<()> {
//! let hmd = HmdInfo::dk1();
//! let stereo = StereoConfig::new(&hmd)?;
//! let helper = DistortionHelper::from_stereo_config(&stereo);
//! let resources = DistortionResources::generate(&helper, &DistortionSettings::default())?;
//!
//! let correction = CalibrationStore::at_default_location()
//!     .map_or(glam::Quat::IDENTITY, |store| store.strabismus_correction());
//! let rig = StereoRig::new(&stereo, DisplayLayout::default(), correction);
//! # let _ = (resources, rig);
//! # Ok(())
//! # }
//! ```

pub mod calibration;
pub mod distortion;
pub mod error;
pub mod eye;
pub mod gpu;
pub mod helper;
pub mod lookup;
pub mod mesh;
pub mod profile;
pub mod resources;
pub mod stereo;
pub mod transform;

pub use calibration::CalibrationStore;
pub use distortion::{DistortionCoefficients, DistortionModel};
pub use error::{Error, Result};
pub use eye::{Eye, PerEye};
pub use helper::DistortionHelper;
pub use lookup::LookupTexture;
pub use mesh::{DistortionMesh, MeshVertex, PRIMITIVE_RESTART};
pub use profile::{HmdInfo, StereoConfig};
pub use resources::{DistortionResources, DistortionSettings};
pub use stereo::{DisplayLayout, EyeArgs, StereoRig};
pub use transform::LensGeometry;
