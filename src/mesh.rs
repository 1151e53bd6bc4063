//! Pre-warped distortion mesh
//!
//! A regular grid whose vertex positions are moved to where the lens needs
//! them while the texture coordinates stay regular. Drawn as triangle strips,
//! one per row, separated by [`PRIMITIVE_RESTART`].

use bytemuck::{Pod, Zeroable};
use glam::{DVec2, UVec2};
use log::info;

use crate::error::{Error, Result};
use crate::eye::Eye;
use crate::helper::DistortionHelper;

/// Index value that ends the current strip
pub const PRIMITIVE_RESTART: u32 = u32::MAX;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Distorted position in screen space
    pub position: [f32; 2],
    /// Regular texture coordinate in `[0, 1]²`
    pub tex_coord: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistortionMesh {
    resolution: UVec2,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    index_count: u32,
}

impl DistortionMesh {
    /// Grid columns and rows
    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    /// Row-major, one vertex per grid point
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// `indices().len()`, known to fit the draw call's 32-bit count
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn strip_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i == PRIMITIVE_RESTART).count()
    }
}

impl DistortionHelper {
    /// Pre-warp a `resolution.x` by `resolution.y` grid for one eye
    pub fn create_distortion_mesh(&self, resolution: UVec2, eye: Eye) -> Result<DistortionMesh> {
        if resolution.x < 2 || resolution.y < 2 {
            return Err(Error::InvalidResolution {
                kind: "distortion mesh",
                width: resolution.x,
                height: resolution.y,
                minimum: 2,
            });
        }

        // every vertex number stays below the restart index and the index count fits a draw
        let vertex_count = u64::from(resolution.x) * u64::from(resolution.y);
        let index_total = u64::from(resolution.y - 1) * (u64::from(resolution.x) * 2 + 1);
        let index_count = match u32::try_from(index_total) {
            Ok(count) if vertex_count < u64::from(PRIMITIVE_RESTART) => count,
            _ => {
                return Err(Error::MeshTooLarge {
                    width: resolution.x,
                    height: resolution.y,
                })
            }
        };

        let columns = resolution.x as usize;
        let rows = resolution.y as usize;
        // grid corners land exactly on the texture edges
        let step = (resolution - UVec2::ONE).as_dvec2();

        let mut vertices = Vec::with_capacity(columns * rows);
        for y in 0..rows {
            for x in 0..columns {
                let tex_coord = DVec2::new(x as f64, y as f64) / step;
                let source = (tex_coord * 2.0) - 1.0;
                let position = self.find_distorted_vertex_position(source, eye)?;
                vertices.push(MeshVertex {
                    position: position.as_vec2().to_array(),
                    tex_coord: tex_coord.as_vec2().to_array(),
                });
            }
        }

        let mut indices = Vec::with_capacity(index_count as usize);
        for y in 0..resolution.y - 1 {
            let row_start = y * resolution.x;
            let next_row_start = row_start + resolution.x;
            for x in 0..resolution.x {
                indices.push(next_row_start + x);
                indices.push(row_start + x);
            }
            indices.push(PRIMITIVE_RESTART);
        }

        info!(
            "Created {}x{} distortion mesh for {:?} eye ({} vertices, {} indices)",
            columns,
            rows,
            eye,
            vertices.len(),
            indices.len()
        );
        Ok(DistortionMesh {
            resolution,
            vertices,
            indices,
            index_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distortion::DistortionCoefficients;
    use crate::profile::HmdInfo;
    use crate::transform::LensGeometry;

    fn assert_close(a: [f32; 2], b: [f32; 2]) {
        assert!((a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_quad() {
        let helper = DistortionHelper::new(DistortionCoefficients::IDENTITY, LensGeometry::new(0.15, 0.8));
        let mesh = helper.create_distortion_mesh(UVec2::new(2, 2), Eye::Left).unwrap();

        let positions = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];
        let tex_coords = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        assert_eq!(mesh.vertices().len(), 4);
        for (vertex, (position, tex_coord)) in mesh.vertices().iter().zip(positions.iter().zip(tex_coords)) {
            assert_close(vertex.position, *position);
            assert_eq!(vertex.tex_coord, tex_coord);
        }

        assert_eq!(mesh.indices(), &[2, 0, 3, 1, PRIMITIVE_RESTART]);
        assert_eq!(mesh.strip_count(), 1);
    }

    #[test]
    fn strips_interleave_next_and_current_rows() {
        let helper = DistortionHelper::default();
        let mesh = helper.create_distortion_mesh(UVec2::new(3, 4), Eye::Right).unwrap();

        assert_eq!(mesh.vertices().len(), 12);
        assert_eq!(mesh.indices().len(), 3 * (3 * 2 + 1));
        assert_eq!(mesh.strip_count(), 3);

        let strips: Vec<&[u32]> = mesh.indices().split(|&i| i == PRIMITIVE_RESTART).collect();
        // trailing restart leaves an empty tail
        assert_eq!(strips.len(), 4);
        assert!(strips[3].is_empty());
        assert_eq!(strips[0], &[3, 0, 4, 1, 5, 2]);
        assert_eq!(strips[1], &[6, 3, 7, 4, 8, 5]);
        assert_eq!(strips[2], &[9, 6, 10, 7, 11, 8]);
        assert!(mesh.indices().iter().all(|&i| i == PRIMITIVE_RESTART || i < 12));
    }

    #[test]
    fn texture_coordinates_stay_regular() {
        let helper = DistortionHelper::from_hmd_info(&HmdInfo::dk1()).unwrap();
        let mesh = helper.create_distortion_mesh(UVec2::new(5, 3), Eye::Left).unwrap();
        for (i, vertex) in mesh.vertices().iter().enumerate() {
            let x = (i % 5) as f32 / 4.0;
            let y = (i / 5) as f32 / 2.0;
            assert_eq!(vertex.tex_coord, [x, y]);
        }
    }

    #[test]
    fn too_coarse_meshes_are_rejected() {
        let helper = DistortionHelper::default();
        for resolution in [UVec2::new(1, 2), UVec2::new(2, 1), UVec2::new(0, 0)] {
            match helper.create_distortion_mesh(resolution, Eye::Left) {
                Err(Error::InvalidResolution { minimum, .. }) => assert_eq!(minimum, 2),
                other => panic!("expected InvalidResolution, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_converging_coefficients_abort_generation() {
        let helper = DistortionHelper::new(
            DistortionCoefficients::new(1.0, -10.0, 0.0, 0.0),
            LensGeometry::centered(),
        );
        assert!(matches!(
            helper.create_distortion_mesh(UVec2::new(4, 4), Eye::Left),
            Err(Error::NoConvergence { .. })
        ));
    }

    #[test]
    fn degenerate_axis_scale_aborts_generation() {
        // the center vertex sits on the lens axis where K0 = 0 gives scale 0
        let helper = DistortionHelper::new(
            DistortionCoefficients::new(0.0, 1.0, 0.0, 0.0),
            LensGeometry::centered(),
        );
        assert!(matches!(
            helper.create_distortion_mesh(UVec2::new(3, 3), Eye::Left),
            Err(Error::DegenerateScale { .. })
        ));
    }

    #[test]
    fn meshes_past_32_bit_indexing_are_rejected() {
        let helper = DistortionHelper::default();
        // 2^32 vertices, and separately too many indices for a 32-bit draw count
        for resolution in [UVec2::new(65536, 65536), UVec2::new(60000, 60000), UVec2::new(u32::MAX, 2)] {
            match helper.create_distortion_mesh(resolution, Eye::Left) {
                Err(Error::MeshTooLarge { width, height }) => assert_eq!(UVec2::new(width, height), resolution),
                other => panic!("expected MeshTooLarge, got {:?}", other.map(|m| m.resolution())),
            }
        }
    }

    #[test]
    fn index_count_matches_indices() {
        let mesh = DistortionHelper::default()
            .create_distortion_mesh(UVec2::new(6, 5), Eye::Right)
            .unwrap();
        assert_eq!(mesh.index_count() as usize, mesh.indices().len());
        assert_eq!(mesh.index_count(), 4 * (6 * 2 + 1));
    }

    #[test]
    fn dk1_mesh_eyes_mirror() {
        let helper = DistortionHelper::from_hmd_info(&HmdInfo::dk1()).unwrap();
        let resolution = UVec2::new(9, 7);
        let left = helper.create_distortion_mesh(resolution, Eye::Left).unwrap();
        let right = helper.create_distortion_mesh(resolution, Eye::Right).unwrap();
        assert_eq!(left.indices(), right.indices());

        let columns = resolution.x as usize;
        for (i, l) in left.vertices().iter().enumerate() {
            let (x, y) = (i % columns, i / columns);
            let r = &right.vertices()[y * columns + (columns - 1 - x)];
            assert_close(l.position, [-r.position[0], r.position[1]]);
        }
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 16);
        let vertex = MeshVertex {
            position: [1.0, 2.0],
            tex_coord: [3.0, 4.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }
}
