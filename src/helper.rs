//! Distortion helper
//!
//! Combines the lens polynomial with the lens placement. Every generated
//! coordinate goes texture → screen → lens, through the model, and back the
//! same way, for both eyes alike.

use glam::DVec2;
use log::info;

use crate::distortion::{DistortionCoefficients, DistortionModel};
use crate::error::Result;
use crate::eye::Eye;
use crate::profile::{HmdInfo, StereoConfig};
use crate::transform::LensGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistortionHelper {
    model: DistortionModel,
    geometry: LensGeometry,
}

impl DistortionHelper {
    /// `coefficients` are used as given; scale them beforehand if needed
    pub fn new(coefficients: DistortionCoefficients, geometry: LensGeometry) -> Self {
        Self {
            model: DistortionModel::new(coefficients),
            geometry,
        }
    }

    /// Build from a device profile.
    ///
    /// The raw coefficients shrink the image (their scale at the fit point is
    /// above one), so they are pre-multiplied by the post-distortion scale to
    /// fill the field of view without a separate resize pass.
    pub fn from_hmd_info(hmd: &HmdInfo) -> Result<Self> {
        let stereo = StereoConfig::new(hmd)?;
        Ok(Self::from_stereo_config(&stereo))
    }

    pub fn from_stereo_config(stereo: &StereoConfig) -> Self {
        let coefficients = stereo
            .hmd()
            .distortion_coefficients()
            .scaled(stereo.post_distortion_scale());
        let geometry = LensGeometry::new(stereo.lens_center_offset(), stereo.eye_aspect());
        info!(
            "Distortion helper: K = {:?}, lens offset {:.5}, eye aspect {:.5}",
            coefficients.0, geometry.lens_offset, geometry.eye_aspect
        );
        Self::new(coefficients, geometry)
    }

    pub fn model(&self) -> &DistortionModel {
        &self.model
    }

    pub fn geometry(&self) -> &LensGeometry {
        &self.geometry
    }

    /// Texture coordinate to sample for the output texel at `tex_coord`
    pub fn texture_lookup_value(&self, tex_coord: DVec2, eye: Eye) -> DVec2 {
        let lens = self.geometry.texture_to_lens(tex_coord, eye);
        let undistorted = self.model.undistorted_position(lens);
        self.geometry.lens_to_texture(undistorted, eye)
    }

    /// Where a screen-space point has to be drawn so the lens bends it back into place
    pub fn find_distorted_vertex_position(&self, source: DVec2, eye: Eye) -> Result<DVec2> {
        let lens = self.geometry.screen_to_lens(source, eye);
        let r_target = lens.length();
        let distortion_scale = self.model.distortion_scale_for_radius(r_target)?;
        Ok(self.geometry.lens_to_screen(lens * distortion_scale, eye))
    }
}
