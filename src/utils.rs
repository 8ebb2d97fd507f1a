use crate::model::{Part, Primitive, Visual};
use wgpu::util::DeviceExt;
use bytemuck::NoUninit;
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Flat-shaded box centered on the origin
    pub fn cuboid(size: Vec3, color: [f32; 4]) -> Self {
        let h = size * 0.5;
        // (normal, u axis, v axis) per face, u x v == normal so winding is CCW from outside
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Mesh::empty();
        for (n, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * h;
                mesh.vertices.push(Vertex { pos: p.to_array(), normal: n.to_array(), color });
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Closed cylinder along Y centered on the origin
    pub fn cylinder(radius: f32, height: f32, segments: u32, color: [f32; 4]) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let mut mesh = Mesh::empty();

        let ring = |i: u32| {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            Vec3::new(a.cos(), 0.0, -a.sin())
        };

        // Side: one quad per segment with outward normals
        for i in 0..segments {
            let base = mesh.vertices.len() as u32;
            let (d0, d1) = (ring(i), ring(i + 1));
            for (d, y) in [(d0, -half), (d1, -half), (d1, half), (d0, half)] {
                mesh.vertices.push(Vertex {
                    pos: (d * radius + Vec3::Y * y).to_array(),
                    normal: d.to_array(),
                    color,
                });
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        // Caps as triangle fans
        for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
            let center = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex { pos: [0.0, y, 0.0], normal: normal.to_array(), color });
            for i in 0..segments {
                mesh.vertices.push(Vertex {
                    pos: (ring(i) * radius + Vec3::Y * y).to_array(),
                    normal: normal.to_array(),
                    color,
                });
            }
            for i in 0..segments {
                let a = center + 1 + i;
                let b = center + 1 + (i + 1) % segments;
                if normal.y > 0.0 {
                    mesh.indices.extend_from_slice(&[center, a, b]);
                } else {
                    mesh.indices.extend_from_slice(&[center, b, a]);
                }
            }
        }
        mesh
    }

    pub fn from_part(part: &Part) -> Self {
        let color = part.color.to_array4();
        let mut mesh = match part.primitive {
            Primitive::Cuboid { size } => Mesh::cuboid(size, color),
            Primitive::Cylinder { radius, height, segments } => Mesh::cylinder(radius, height, segments, color),
        };
        mesh.transform(&part.local.matrix());
        mesh
    }

    /// Bake every part of a visual into one mesh in object space
    pub fn from_visual(visual: &Visual) -> Self {
        let mut mesh = Mesh::empty();
        for part in &visual.parts {
            mesh.append(Mesh::from_part(part));
        }
        mesh
    }

    pub fn transform(&mut self, m: &Mat4) {
        for v in self.vertices.iter_mut() {
            v.pos = m.transform_point3(Vec3::from(v.pos)).to_array();
            v.normal = m.transform_vector3(Vec3::from(v.normal)).normalize_or_zero().to_array();
        }
    }

    pub fn append(&mut self, other: Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
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
