//! Rendering collaborator: the upload/draw seam plus its wgpu implementation.
//!
//! Pipelines, shaders and the environment cubemap belong to the host. This
//! module only owns the water geometry on the GPU and issues the draw.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::ocean::{Vertex, WaterSurface};

/// Receives geometry from a [`WaterSurface`] and draws it.
///
/// `Program` is the host's shader program handle, `Environment` its
/// reflection texture binding.
pub trait SurfaceRenderer {
    type Program;
    type Environment;

    fn upload_vertices(&mut self, vertices: &[Vertex]);

    fn upload_indices(&mut self, indices: &[u32]);

    fn draw_indexed(
        &mut self,
        program: &Self::Program,
        environment: &Self::Environment,
        index_count: u32,
    );
}

/// Uniform buffer for the water shader (group 0, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WaterUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
}

impl WaterUniforms {
    pub fn new(view_proj: Mat4, model: Mat4, camera_pos: Vec3, time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            camera_pos: camera_pos.to_array(),
            time,
        }
    }
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Vertex buffer layout: position @0, normal @1, uv @2
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Layout for the environment cubemap (group 1): cube texture + filtering sampler
pub fn environment_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Water Environment Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// GPU-side water geometry and uniforms
pub struct WaterBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    /// Capacity of the index buffer (full topology)
    index_capacity: usize,
    index_count: u32,
}

impl WaterBuffers {
    /// Create buffers sized for the surface's full topology
    pub fn new(device: &wgpu::Device, surface: &WaterSurface) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Vertex Buffer"),
            contents: bytemuck::cast_slice(surface.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        // Filtered index lists are never longer than the full one
        let full_indices = &surface.grid.indices;
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Index Buffer"),
            contents: bytemuck::cast_slice(full_indices),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniforms = WaterUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO, 0.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Water Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group_layout,
            uniform_bind_group,
            index_capacity: full_indices.len(),
            index_count: full_indices.len() as u32,
        }
    }

    /// Layout the host's pipeline must use at group 0
    pub fn uniform_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_bind_group_layout
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &WaterUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Bind the buffers to a render pass for one frame
    pub fn frame<'a, 'p>(
        &'a mut self,
        queue: &'a wgpu::Queue,
        pass: &'a mut wgpu::RenderPass<'p>,
    ) -> WgpuPass<'a, 'p> {
        WgpuPass {
            queue,
            buffers: self,
            pass,
        }
    }
}

/// [`SurfaceRenderer`] recording into a wgpu render pass
pub struct WgpuPass<'a, 'p> {
    queue: &'a wgpu::Queue,
    buffers: &'a mut WaterBuffers,
    pass: &'a mut wgpu::RenderPass<'p>,
}

impl SurfaceRenderer for WgpuPass<'_, '_> {
    type Program = wgpu::RenderPipeline;
    type Environment = wgpu::BindGroup;

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.queue.write_buffer(
            &self.buffers.vertex_buffer,
            0,
            bytemuck::cast_slice(vertices),
        );
    }

    fn upload_indices(&mut self, indices: &[u32]) {
        let count = indices.len().min(self.buffers.index_capacity);
        if count < indices.len() {
            log::error!(
                "Index list of {} exceeds buffer capacity {}, truncating",
                indices.len(),
                self.buffers.index_capacity
            );
        }
        // Whole triangles only
        let count = count - count % 3;
        if count > 0 {
            self.queue.write_buffer(
                &self.buffers.index_buffer,
                0,
                bytemuck::cast_slice(&indices[..count]),
            );
        }
        self.buffers.index_count = count as u32;
    }

    fn draw_indexed(
        &mut self,
        program: &Self::Program,
        environment: &Self::Environment,
        index_count: u32,
    ) {
        let count = index_count.min(self.buffers.index_count);
        if count == 0 {
            return;
        }

        self.pass.set_pipeline(program);
        self.pass.set_bind_group(0, &self.buffers.uniform_bind_group, &[]);
        self.pass.set_bind_group(1, environment, &[]);
        self.pass.set_vertex_buffer(0, self.buffers.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(self.buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
        assert_eq!(layout.attributes[2].shader_location, 2);
    }

    #[test]
    fn test_uniforms_are_16_byte_aligned() {
        // Two mat4 + vec3 + f32
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 144);
        assert_eq!(std::mem::size_of::<WaterUniforms>() % 16, 0);
    }

    #[test]
    fn test_uniforms_from_matrices() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = WaterUniforms::new(Mat4::IDENTITY, model, Vec3::new(0.0, 0.0, 3.0), 1.5);
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.camera_pos, [0.0, 0.0, 3.0]);
        assert_eq!(u.time, 1.5);
    }
}
