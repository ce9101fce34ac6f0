use std::f32::consts::PI;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::uniforms::ObjectUniforms;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// Indexed triangle list on the CPU, counter-clockwise front faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// UV sphere laid out like three.js `SphereGeometry`.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let direction = Vec3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                vertices.push(Vertex::new(
                    direction * radius,
                    direction.normalize_or_zero(),
                    Vec2::new(u, 1.0 - v),
                ));
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self { vertices, indices }
    }

    /// Single-quad plane in the XY plane facing +Z, UVs spanning `[0, 1]²`.
    pub fn plane(width: f32, height: f32) -> Self {
        Self::grid(Vec2::new(width, height), 1, 1, |_| 0.0)
    }

    /// Subdivided ribbon curved along z, standing in for one aurora mesh.
    pub fn curtain(index: usize) -> Self {
        let phase = index as f32 * 1.3;
        let mut mesh = Self::grid(Vec2::new(6.0, 3.0), 48, 12, |p| {
            (p.x * 0.8 + phase).sin() * 0.6
        });
        let offset = Vec3::new(
            (index as f32 - 1.5) * 0.6,
            0.5 - index as f32 * 0.25,
            -(index as f32) * 0.8,
        );
        for vertex in &mut mesh.vertices {
            vertex.position = (Vec3::from(vertex.position) + offset).to_array();
        }
        mesh
    }

    fn grid(size: Vec2, columns: u32, rows: u32, depth: impl Fn(Vec2) -> f32) -> Self {
        let half = size * 0.5;
        let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
        for iy in 0..=rows {
            let y = half.y - iy as f32 * size.y / rows as f32;
            for ix in 0..=columns {
                let x = ix as f32 * size.x / columns as f32 - half.x;
                let p = Vec2::new(x, y);
                vertices.push(Vertex::new(
                    p.extend(depth(p)),
                    Vec3::Z,
                    Vec2::new(ix as f32 / columns as f32, 1.0 - iy as f32 / rows as f32),
                ));
            }
        }

        let row = columns + 1;
        let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
        for iy in 0..rows {
            for ix in 0..columns {
                let a = iy * row + ix;
                let b = (iy + 1) * row + ix;
                let c = (iy + 1) * row + ix + 1;
                let d = iy * row + ix + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self { vertices, indices }
    }
}

/// Immutable vertex and index buffers.
pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub(crate) fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Anything that can set the pipeline and the set-2 bind group.
pub(crate) trait Material {
    fn bind(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Scene graph node: geometry, its own transform, a shared material.
pub(crate) struct MeshInstance<M> {
    mesh: GpuMesh,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    material: Rc<M>,
}

impl<M: Material> MeshInstance<M> {
    pub(crate) fn new(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        label: &str,
        data: &MeshData,
        model: Mat4,
        material: Rc<M>,
    ) -> Self {
        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} object")),
            contents: bytemuck::bytes_of(&ObjectUniforms::from_model(model)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} object bind group")),
            layout: object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });
        Self {
            mesh: GpuMesh::upload(device, label, data),
            object_buffer,
            object_bind_group,
            material,
        }
    }

    pub(crate) fn set_transform(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(
            &self.object_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::from_model(model)),
        );
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.material.bind(pass);
        pass.set_bind_group(1, &self.object_bind_group, &[]);
        self.mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &MeshData, triangle: usize) -> Vec3 {
        let corner = |i: usize| Vec3::from(mesh.vertices[mesh.indices[triangle * 3 + i] as usize].position);
        (corner(1) - corner(0)).cross(corner(2) - corner(0))
    }

    #[test]
    fn sphere_matches_three_js_counts() {
        let sphere = MeshData::sphere(0.5, 64, 64);
        assert_eq!(sphere.vertices.len(), 65 * 65);
        assert_eq!(sphere.indices.len(), (64 * 64 * 2 - 2 * 64) * 3);
        for vertex in &sphere.vertices {
            assert!((Vec3::from(vertex.position).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let sphere = MeshData::sphere(0.5, 16, 8);
        for triangle in 0..sphere.indices.len() / 3 {
            let centre = (0..3)
                .map(|i| Vec3::from(sphere.vertices[sphere.indices[triangle * 3 + i] as usize].position))
                .sum::<Vec3>();
            assert!(triangle_normal(&sphere, triangle).dot(centre) > 0.0);
        }
    }

    #[test]
    fn plane_spans_the_unit_uv_square_facing_z() {
        let plane = MeshData::plane(2.0, 1.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 6);
        let top_left = plane.vertices[0];
        assert_eq!(top_left.position, [-1.0, 0.5, 0.0]);
        assert_eq!(top_left.uv, [0.0, 1.0]);
        assert_eq!(plane.vertices[3].uv, [1.0, 0.0]);
        assert!(triangle_normal(&plane, 0).z > 0.0);
        assert!(triangle_normal(&plane, 1).z > 0.0);
    }

    #[test]
    fn curtains_keep_uvs_in_range_and_differ() {
        let first = MeshData::curtain(0);
        let second = MeshData::curtain(1);
        assert_ne!(first.vertices[0].position, second.vertices[0].position);
        for vertex in &first.vertices {
            assert!(vertex.uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert_eq!(first.indices.len(), 48 * 12 * 6);
    }
}
