//! One-shot generation of the static warp resources for both eyes

use glam::UVec2;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::eye::PerEye;
use crate::helper::DistortionHelper;
use crate::lookup::LookupTexture;
use crate::mesh::DistortionMesh;

/// Tunable resource sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionSettings {
    /// Lookup texture size in texels
    pub lookup_texture_size: UVec2,
    /// Mesh grid columns and rows. Tens per axis is enough; finer grids cost
    /// bisection work per vertex for little visible gain.
    pub mesh_resolution: UVec2,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            lookup_texture_size: UVec2::new(512, 512),
            mesh_resolution: UVec2::new(32, 32),
        }
    }
}

/// Lookup textures and meshes for both eyes
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionResources {
    pub lookup_textures: PerEye<LookupTexture>,
    pub meshes: PerEye<DistortionMesh>,
}

impl DistortionResources {
    pub fn generate(helper: &DistortionHelper, settings: &DistortionSettings) -> Result<Self> {
        let lookup_textures =
            PerEye::try_from_fn(|eye| helper.create_lookup_texture(settings.lookup_texture_size, eye))?;
        let meshes = PerEye::try_from_fn(|eye| helper.create_distortion_mesh(settings.mesh_resolution, eye))?;
        info!(
            "Distortion resources ready: {}x{} textures, {}x{} meshes",
            settings.lookup_texture_size.x,
            settings.lookup_texture_size.y,
            settings.mesh_resolution.x,
            settings.mesh_resolution.y
        );
        Ok(Self { lookup_textures, meshes })
    }
}
