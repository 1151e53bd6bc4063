//! wgpu resources for the warp pass
//!
//! Uploads the generated lookup textures and meshes. Bind group layouts,
//! pipelines and shaders belong to the renderer.

use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, Queue, Sampler, Texture, TextureView};

use crate::lookup::LookupTexture;
use crate::mesh::{DistortionMesh, MeshVertex};

/// RG32F textures are only linearly filterable with this feature enabled
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::FLOAT32_FILTERABLE;

pub const LOOKUP_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;

pub fn lookup_texture_descriptor(texture: &LookupTexture) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some("Distortion Lookup Texture"),
        size: wgpu::Extent3d {
            width: texture.width(),
            height: texture.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: LOOKUP_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

/// Linear filtering, mirrored at the edges so the frame border has no seam
pub fn lookup_sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("Distortion Lookup Sampler"),
        address_mode_u: wgpu::AddressMode::MirrorRepeat,
        address_mode_v: wgpu::AddressMode::MirrorRepeat,
        address_mode_w: wgpu::AddressMode::MirrorRepeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    }
}

/// Triangle strips with `u32::MAX` restarting the strip
pub fn mesh_primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleStrip,
        strip_index_format: Some(wgpu::IndexFormat::Uint32),
        ..Default::default()
    }
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    /// Location 0 is the position, location 1 the texture coordinate
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct GpuLookupTexture {
    pub texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
}

impl LookupTexture {
    /// Create the GPU texture and copy the texels into it
    pub fn upload(&self, device: &Device, queue: &Queue) -> GpuLookupTexture {
        let descriptor = lookup_texture_descriptor(self);
        let texture = device.create_texture(&descriptor);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.bytes_per_row()),
                rows_per_image: Some(self.height()),
            },
            descriptor.size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&lookup_sampler_descriptor());
        GpuLookupTexture { texture, view, sampler }
    }
}

pub struct GpuDistortionMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl DistortionMesh {
    pub fn upload(&self, device: &Device) -> GpuDistortionMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Distortion Mesh Vertices"),
            contents: bytemuck::cast_slice(self.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Distortion Mesh Indices"),
            contents: bytemuck::cast_slice(self.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuDistortionMesh {
            vertex_buffer,
            index_buffer,
            index_count: self.index_count(),
        }
    }
}

impl GpuDistortionMesh {
    /// Draw with whatever pipeline and bind groups are already set on `pass`
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
