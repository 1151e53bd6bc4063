//! Per-eye rendering arguments
//!
//! Each eye renders into its own half of the panel with a shifted projection
//! and a view offset of half the IPD. Which half an eye gets is a property of
//! the display, so it is configured through [`DisplayLayout`] rather than
//! assumed.

use glam::{Mat4, Quat, UVec2, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::eye::{Eye, PerEye};
use crate::profile::StereoConfig;

pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;

/// Panel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayLayout {
    /// Render the left eye into the right half of the panel and vice versa
    pub swap_eyes: bool,
}

impl DisplayLayout {
    /// Whether `eye` renders into the left half of the panel
    pub fn on_left_half(&self, eye: Eye) -> bool {
        (eye == Eye::Left) != self.swap_eyes
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeArgs {
    pub viewport_position: UVec2,
    pub viewport_size: UVec2,
    pub modelview_offset: Mat4,
    pub projection_offset: Mat4,
    pub strabismus_correction: Mat4,
}

impl EyeArgs {
    /// View matrix for this eye given the predicted head orientation and the player pose
    pub fn view_matrix(&self, head_orientation: Quat, player: Mat4) -> Mat4 {
        self.modelview_offset
            * self.strabismus_correction
            * Mat4::from_quat(head_orientation.inverse())
            * player.inverse()
    }

    pub fn aspect(&self) -> f32 {
        self.viewport_size.x as f32 / self.viewport_size.y as f32
    }
}

/// Everything the scene pass needs per eye
#[derive(Debug, Clone, PartialEq)]
pub struct StereoRig {
    eyes: PerEye<EyeArgs>,
    projection: Mat4,
    offscreen_size: UVec2,
}

impl StereoRig {
    /// `strabismus_correction` rotates the left eye; the right eye gets its inverse
    pub fn new(stereo: &StereoConfig, layout: DisplayLayout, strabismus_correction: Quat) -> Self {
        let hmd = stereo.hmd();
        let eye_size = UVec2::new(hmd.h_resolution / 2, hmd.v_resolution);
        let half_ipd = (stereo.ipd() / 2.0) as f32;
        let projection_shift = stereo.projection_center_offset() as f32;

        let eyes = PerEye::from_fn(|eye| {
            let sign = match eye {
                Eye::Left => 1.0,
                Eye::Right => -1.0,
            };
            let viewport_position = if layout.on_left_half(eye) {
                UVec2::ZERO
            } else {
                UVec2::new(hmd.h_resolution / 2, 0)
            };
            let strabismus = match eye {
                Eye::Left => strabismus_correction,
                Eye::Right => strabismus_correction.inverse(),
            };
            EyeArgs {
                viewport_position,
                viewport_size: eye_size,
                modelview_offset: Mat4::from_translation(Vec3::new(sign * half_ipd, 0.0, 0.0)),
                projection_offset: Mat4::from_translation(Vec3::new(sign * projection_shift, 0.0, 0.0)),
                strabismus_correction: Mat4::from_quat(strabismus),
            }
        });

        let aspect = eye_size.x as f32 / eye_size.y as f32;
        let projection = Mat4::perspective_rh_gl(stereo.y_fov_radians() as f32, aspect, Z_NEAR, Z_FAR);

        // The scene buffer is enlarged so the warp does not magnify it
        let scale = stereo.distortion_scale() as f32;
        let offscreen_size = (eye_size.as_vec2() * scale).as_uvec2();

        debug!(
            "Stereo rig: eye {}x{}, offscreen {}x{}, swap_eyes {}",
            eye_size.x, eye_size.y, offscreen_size.x, offscreen_size.y, layout.swap_eyes
        );

        Self {
            eyes,
            projection,
            offscreen_size,
        }
    }

    pub fn eye(&self, eye: Eye) -> &EyeArgs {
        &self.eyes[eye]
    }

    pub fn eyes(&self) -> &PerEye<EyeArgs> {
        &self.eyes
    }

    /// Shared perspective projection before the per-eye offset
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Projection for `eye` with its lens-center shift applied
    pub fn eye_projection(&self, eye: Eye) -> Mat4 {
        self.eyes[eye].projection_offset * self.projection
    }

    pub fn offscreen_size(&self) -> UVec2 {
        self.offscreen_size
    }
}
