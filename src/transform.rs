//! Coordinate conversions between texture, screen and lens space
//!
//! - texture space: `[0, 1]²`, the space render targets are sampled in
//! - screen space: `[-1, 1]²`, normalized device coordinates of one eye's viewport
//! - lens space: screen space shifted so the origin sits on the lens axis and
//!   with the vertical axis divided by the eye aspect, so the radial
//!   polynomial sees round circles
//!
//! The composite conversions are literal compositions of the primitive ones so
//! the forward and inverse paths round identically.

use glam::DVec2;

use crate::eye::Eye;

/// Lens placement for one headset, shared by both eyes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensGeometry {
    /// Horizontal displacement of the lens center in lens-space units
    pub lens_offset: f64,
    /// Horizontal to vertical size ratio of one eye's half of the screen
    pub eye_aspect: f64,
}

impl LensGeometry {
    pub fn new(lens_offset: f64, eye_aspect: f64) -> Self {
        Self { lens_offset, eye_aspect }
    }

    /// Centered lens over a square viewport
    pub fn centered() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Lens offset with the per-eye sign applied (left is negative)
    pub fn lens_offset(&self, eye: Eye) -> f64 {
        match eye {
            Eye::Left => -self.lens_offset,
            Eye::Right => self.lens_offset,
        }
    }

    pub fn screen_to_lens(&self, v: DVec2, eye: Eye) -> DVec2 {
        DVec2::new(v.x + self.lens_offset(eye), v.y / self.eye_aspect)
    }

    pub fn lens_to_screen(&self, v: DVec2, eye: Eye) -> DVec2 {
        DVec2::new(v.x - self.lens_offset(eye), v.y * self.eye_aspect)
    }

    pub fn texture_to_lens(&self, v: DVec2, eye: Eye) -> DVec2 {
        self.screen_to_lens(texture_to_screen(v), eye)
    }

    pub fn lens_to_texture(&self, v: DVec2, eye: Eye) -> DVec2 {
        screen_to_texture(self.lens_to_screen(v, eye))
    }
}

impl Default for LensGeometry {
    fn default() -> Self {
        Self::centered()
    }
}

pub fn texture_to_screen(v: DVec2) -> DVec2 {
    (v * 2.0) - 1.0
}

pub fn screen_to_texture(v: DVec2) -> DVec2 {
    (v + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn grid() -> impl Iterator<Item = DVec2> {
        (0..=10).flat_map(|y| (0..=10).map(move |x| DVec2::new(x as f64 / 10.0, y as f64 / 10.0)))
    }

    #[test]
    fn texture_screen_round_trip() {
        for t in grid() {
            let back = screen_to_texture(texture_to_screen(t));
            assert!((back - t).length() < EPS, "{t:?} -> {back:?}");
        }
        assert_eq!(texture_to_screen(DVec2::ZERO), DVec2::splat(-1.0));
        assert_eq!(texture_to_screen(DVec2::ONE), DVec2::ONE);
    }

    #[test]
    fn screen_lens_round_trip_for_both_eyes() {
        let geometry = LensGeometry::new(0.152, 0.8);
        for eye in Eye::BOTH {
            for t in grid() {
                let s = texture_to_screen(t);
                let back = geometry.lens_to_screen(geometry.screen_to_lens(s, eye), eye);
                assert!((back - s).length() < EPS, "{eye:?}: {s:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn lens_offset_sign_is_mirrored() {
        let geometry = LensGeometry::new(0.25, 1.0);
        assert_eq!(geometry.lens_offset(Eye::Left), -0.25);
        assert_eq!(geometry.lens_offset(Eye::Right), 0.25);

        // the lens axis lands at the lens-space origin
        let left_axis = geometry.lens_to_screen(DVec2::ZERO, Eye::Left);
        assert_eq!(left_axis, DVec2::new(0.25, 0.0));
        assert_eq!(geometry.screen_to_lens(left_axis, Eye::Left), DVec2::ZERO);
    }

    #[test]
    fn lens_space_divides_vertical_axis_by_aspect() {
        let geometry = LensGeometry::new(0.0, 0.8);
        let lens = geometry.screen_to_lens(DVec2::new(0.5, 0.4), Eye::Right);
        assert!((lens - DVec2::new(0.5, 0.5)).length() < EPS);
    }

    #[test]
    fn composites_match_explicit_chains() {
        let geometry = LensGeometry::new(0.1, 0.9);
        let t = DVec2::new(0.3, 0.7);
        assert_eq!(
            geometry.texture_to_lens(t, Eye::Left),
            geometry.screen_to_lens(texture_to_screen(t), Eye::Left)
        );
        let l = DVec2::new(-0.4, 0.2);
        assert_eq!(
            geometry.lens_to_texture(l, Eye::Right),
            screen_to_texture(geometry.lens_to_screen(l, Eye::Right))
        );
    }
}
