//! Per-pixel remap texture
//!
//! Each texel stores the undistorted texture coordinate the warp pass should
//! sample for that output pixel. Values are evaluated at texel centers and
//! stored row-major as interleaved `(u, v)` pairs, row 0 at texture-space
//! `v = 0`.

use glam::{DVec2, UVec2, Vec2};
use log::info;

use crate::error::{Error, Result};
use crate::eye::Eye;
use crate::helper::DistortionHelper;

/// Dense two-channel float image
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTexture {
    size: UVec2,
    data: Vec<f32>,
}

impl LookupTexture {
    pub const CHANNELS: usize = 2;

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    /// Interleaved `(u, v)` samples, `width * height * 2` floats
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.size.x * (Self::CHANNELS * std::mem::size_of::<f32>()) as u32
    }

    /// Stored coordinate for texel `(x, y)`, or `None` outside the image
    pub fn texel(&self, x: u32, y: u32) -> Option<Vec2> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let offset = (y as usize * self.size.x as usize + x as usize) * Self::CHANNELS;
        Some(Vec2::new(self.data[offset], self.data[offset + 1]))
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

impl DistortionHelper {
    /// Sample the direct (non-iterative) undistortion at every texel center
    pub fn create_lookup_texture(&self, size: UVec2, eye: Eye) -> Result<LookupTexture> {
        if size.x < 1 || size.y < 1 {
            return Err(Error::InvalidResolution {
                kind: "lookup texture",
                width: size.x,
                height: size.y,
                minimum: 1,
            });
        }

        let dims = size.as_dvec2();
        // texture coordinates address pixel centers
        let tex_center_offset = DVec2::splat(0.5) / dims;
        let row_size = size.x as usize * LookupTexture::CHANNELS;
        let mut data = vec![0.0f32; row_size * size.y as usize];

        for (y, row) in data.chunks_exact_mut(row_size).enumerate() {
            for (x, texel) in row.chunks_exact_mut(LookupTexture::CHANNELS).enumerate() {
                let tex_coord = DVec2::new(x as f64, y as f64) / dims + tex_center_offset;
                let lookup = self.texture_lookup_value(tex_coord, eye);
                texel[0] = lookup.x as f32;
                texel[1] = lookup.y as f32;
            }
        }

        info!("Created {}x{} lookup texture for {:?} eye", size.x, size.y, eye);
        Ok(LookupTexture { size, data })
    }
}
