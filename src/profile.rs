//! Device profile and the stereo parameters derived from it
//!
//! `HmdInfo` carries what the headset reports about its panel and optics.
//! `StereoConfig` turns that into the lens-space numbers the distortion code
//! and the per-eye projection need.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::distortion::{DistortionCoefficients, DistortionModel};
use crate::error::{Error, Result};

/// Physical description of a head-mounted display
///
/// Sizes are in meters, resolutions in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmdInfo {
    pub h_resolution: u32,
    pub v_resolution: u32,
    pub h_screen_size: f64,
    pub v_screen_size: f64,
    pub v_screen_center: f64,
    pub eye_to_screen_distance: f64,
    pub lens_separation_distance: f64,
    pub interpupillary_distance: f64,
    pub distortion_k: [f64; 4],
    pub chroma_ab_correction: [f64; 4],
    pub desktop_x: i32,
    pub desktop_y: i32,
}

impl HmdInfo {
    /// Development kit 1 values, used when no headset is attached
    pub fn dk1() -> Self {
        Self {
            h_resolution: 1280,
            v_resolution: 800,
            h_screen_size: 0.14976,
            v_screen_size: 0.09360,
            v_screen_center: 0.04680,
            eye_to_screen_distance: 0.04100,
            lens_separation_distance: 0.06350,
            interpupillary_distance: 0.06400,
            distortion_k: [1.0, 0.22, 0.24, 0.0],
            chroma_ab_correction: [0.99600, -0.00400, 1.01400, 0.0],
            desktop_x: 100,
            desktop_y: 100,
        }
    }

    /// Parse a profile from JSON; absent fields keep their DK1 values
    pub fn from_json(json: &str) -> Result<Self> {
        let info: Self = serde_json::from_str(json)?;
        info.validate()?;
        Ok(info)
    }

    pub fn distortion_coefficients(&self) -> DistortionCoefficients {
        DistortionCoefficients(self.distortion_k)
    }

    pub fn validate(&self) -> Result<()> {
        if self.h_resolution == 0 || self.v_resolution == 0 {
            return Err(Error::InvalidProfile(format!(
                "screen resolution {}x{} must be non-zero",
                self.h_resolution, self.v_resolution
            )));
        }
        let sizes = [
            ("h_screen_size", self.h_screen_size),
            ("v_screen_size", self.v_screen_size),
            ("eye_to_screen_distance", self.eye_to_screen_distance),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidProfile(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.distortion_k.iter().all(|k| k.is_finite()) {
            return Err(Error::InvalidProfile("distortion coefficients must be finite".into()));
        }
        Ok(())
    }
}

impl Default for HmdInfo {
    fn default() -> Self {
        Self::dk1()
    }
}

/// Screen-space point the distortion is fitted to: the outer edge of the left eye
const DISTORTION_FIT_X: f64 = -1.0;
const DISTORTION_FIT_Y: f64 = 0.0;

/// Stereo rendering parameters derived from an [`HmdInfo`]
#[derive(Debug, Clone, PartialEq)]
pub struct StereoConfig {
    hmd: HmdInfo,
    ipd: f64,
    lens_center_offset: f64,
    distortion_scale: f64,
}

impl StereoConfig {
    pub fn new(hmd: &HmdInfo) -> Result<Self> {
        hmd.validate()?;

        // Horizontal distance from the center of one eye's half-screen to its lens,
        // in viewport units where the half-screen spans [-1, 1]
        let lens_shift = hmd.h_screen_size * 0.25 - hmd.lens_separation_distance * 0.5;
        let lens_center_offset = 4.0 * lens_shift / hmd.h_screen_size;

        // Fit point in distortion-centered coordinates
        let stereo_aspect = 0.5 * hmd.h_resolution as f64 / hmd.v_resolution as f64;
        let dx = DISTORTION_FIT_X - lens_center_offset;
        let dy = DISTORTION_FIT_Y / stereo_aspect;
        let fit_radius = (dx * dx + dy * dy).sqrt();
        let distortion_scale =
            DistortionModel::new(hmd.distortion_coefficients()).undistortion_scale_for_radius(fit_radius);

        if !(distortion_scale.is_finite() && distortion_scale > 0.0) {
            return Err(Error::InvalidProfile(format!(
                "distortion scale {distortion_scale} at the fit point must be positive"
            )));
        }

        debug!(
            "Stereo config: lens center offset {:.5}, distortion scale {:.5}",
            lens_center_offset, distortion_scale
        );

        Ok(Self {
            hmd: hmd.clone(),
            ipd: hmd.interpupillary_distance,
            lens_center_offset,
            distortion_scale,
        })
    }

    /// Override the interpupillary distance, e.g. from a user profile
    pub fn with_ipd(mut self, ipd: f64) -> Self {
        self.ipd = ipd;
        self
    }

    pub fn hmd(&self) -> &HmdInfo {
        &self.hmd
    }

    pub fn ipd(&self) -> f64 {
        self.ipd
    }

    /// Lens center displacement in lens space (positive for the right eye)
    pub fn lens_center_offset(&self) -> f64 {
        self.lens_center_offset
    }

    /// Projection center shift for the per-eye projection matrix
    pub fn projection_center_offset(&self) -> f64 {
        let eye_projection_shift =
            self.hmd.h_screen_size * 0.25 - self.hmd.lens_separation_distance * 0.5;
        4.0 * eye_projection_shift / self.hmd.h_screen_size
    }

    /// How much the raw coefficients enlarge the fit point
    pub fn distortion_scale(&self) -> f64 {
        self.distortion_scale
    }

    /// Factor the raw coefficients are pre-multiplied by so the corrected image fills the view
    pub fn post_distortion_scale(&self) -> f64 {
        1.0 / self.distortion_scale
    }

    pub fn eye_aspect(&self) -> f64 {
        self.hmd.h_screen_size / 2.0 / self.hmd.v_screen_size
    }

    /// Vertical field of view of one eye, in radians
    pub fn y_fov_radians(&self) -> f64 {
        let perceived_half_rt_distance = (self.hmd.v_screen_size / 2.0) * self.distortion_scale;
        2.0 * (perceived_half_rt_distance / self.hmd.eye_to_screen_distance).atan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn dk1_derived_values() {
        let stereo = StereoConfig::new(&HmdInfo::dk1()).unwrap();

        // 4 * (0.14976 / 4 - 0.0635 / 2) / 0.14976
        assert!(close(stereo.lens_center_offset(), 0.151976, 1e-5));
        assert!(close(stereo.projection_center_offset(), stereo.lens_center_offset(), 1e-12));
        assert!(close(stereo.eye_aspect(), 0.8, 1e-12));

        // fit radius 1.151976 through 1 + 0.22r² + 0.24r⁴
        let r_sq = 1.151976f64 * 1.151976;
        let expected = 1.0 + 0.22 * r_sq + 0.24 * r_sq * r_sq;
        assert!(close(stereo.distortion_scale(), expected, 1e-4));
        assert!(close(stereo.post_distortion_scale() * stereo.distortion_scale(), 1.0, 1e-12));
    }

    #[test]
    fn dk1_field_of_view_is_plausible() {
        let stereo = StereoConfig::new(&HmdInfo::dk1()).unwrap();
        let degrees = stereo.y_fov_radians().to_degrees();
        assert!(degrees > 110.0 && degrees < 135.0, "fov {degrees}");
    }

    #[test]
    fn ipd_override() {
        let stereo = StereoConfig::new(&HmdInfo::dk1()).unwrap();
        assert_eq!(stereo.ipd(), 0.064);
        assert_eq!(stereo.with_ipd(0.058).ipd(), 0.058);
    }

    #[test]
    fn json_profile_defaults_missing_fields() {
        let info = HmdInfo::from_json(r#"{ "h_resolution": 1920, "distortion_k": [1.0, 0.1, 0.0, 0.0] }"#)
            .unwrap();
        assert_eq!(info.h_resolution, 1920);
        assert_eq!(info.v_resolution, 800);
        assert_eq!(info.distortion_coefficients(), DistortionCoefficients::new(1.0, 0.1, 0.0, 0.0));
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let mut info = HmdInfo::dk1();
        info.v_screen_size = 0.0;
        assert!(matches!(StereoConfig::new(&info), Err(Error::InvalidProfile(_))));

        let mut info = HmdInfo::dk1();
        info.v_resolution = 0;
        assert!(matches!(info.validate(), Err(Error::InvalidProfile(_))));

        assert!(matches!(
            HmdInfo::from_json(r#"{ "h_screen_size": -1.0 }"#),
            Err(Error::InvalidProfile(_))
        ));
        assert!(matches!(HmdInfo::from_json("not json"), Err(Error::Json(_))));
    }
}
