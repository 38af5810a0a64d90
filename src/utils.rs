use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.pos)
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Axis-aligned bounds as (min, max), or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut vertices = self.vertices.iter().map(Vertex::position);
        let first = vertices.next()?;
        Some(vertices.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Center the mesh at the origin and scale it so the bounding box diagonal is 2.
    pub fn standardize(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let center = (min + max) / 2.0;
        let diagonal = (max - min).length();
        let scaling = if diagonal > f32::EPSILON { 2.0 / diagonal } else { 1.0 };
        for v in self.vertices.iter_mut() {
            v.pos = ((v.position() - center) * scaling).to_array();
        }
    }

    /// Smooth per-vertex normals accumulated from the (area weighted) face normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (
                self.vertices[a].position(),
                self.vertices[b].position(),
                self.vertices[c].position(),
            );
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for (v, n) in self.vertices.iter_mut().zip(normals) {
            v.normal = n.normalize_or_zero().to_array();
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex { pos: [x, y, z], normal: [0.0; 3], uv: [0.0; 2] }
    }

    #[test]
    fn test_vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn test_standardize_centers_and_scales() {
        let mut mesh = Mesh {
            vertices: vec![vertex(2.0, 2.0, 2.0), vertex(4.0, 6.0, 2.0), vertex(2.0, 6.0, 6.0)],
            indices: vec![0, 1, 2],
        };
        mesh.standardize();

        let (min, max) = mesh.bounds().unwrap();
        assert!(((min + max) / 2.0).length() < 1e-5, "Should be centered at origin");
        assert!(((max - min).length() - 2.0).abs() < 1e-5, "Diagonal should be 2");
    }

    #[test]
    fn test_compute_normals_for_flat_triangle() {
        let mut mesh = Mesh {
            vertices: vec![vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0)],
            indices: vec![0, 1, 2],
        };
        mesh.compute_normals();
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert_eq!(mesh.triangle_count(), 0);
    }
}
