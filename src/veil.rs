//! The translucent overlay plane between camera and subject.
//!
//! A flat black 15x15 quad hangs at z = 2, in front of the model and behind
//! the camera's near plane. Its opacity is the one material property the
//! animator drives: the farther back the model sits, the more opaque the
//! veil, which reads as atmospheric depth. The quad is rendered without
//! back-face culling so it stays visible from both sides.

use wgpu::util::DeviceExt;

use crate::model::Vertex;

/// Edge length of the square veil plane.
pub const VEIL_SIZE: f32 = 15.0;
/// Center of the plane: level with the model, between it and the camera.
pub const VEIL_POSITION: [f32; 3] = [0.0, 1.0, 2.0];
/// The veil is invisible until the model is present and the animator starts
/// writing opacities.
pub const INITIAL_VEIL_OPACITY: f32 = 0.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VeilVertex {
    pub position: [f32; 3],
}

impl Vertex for VeilVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VeilVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VeilUniform {
    // rgb = veil color (black), a = opacity
    color: [f32; 4],
}

impl VeilUniform {
    pub fn new() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, INITIAL_VEIL_OPACITY],
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.color[3] = opacity;
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}

impl Default for VeilUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The veil quad's geometry and opacity uniform, owned by the context.
#[derive(Debug)]
pub struct VeilResources {
    pub uniform: VeilUniform,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl VeilResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let (vertices, indices) = plane_geometry(VEIL_SIZE, VEIL_POSITION);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Veil Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Veil Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform = VeilUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Veil Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("veil_bind_group"),
        });

        Self {
            uniform,
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Apply the frame's opacity and upload it.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, opacity: f32) {
        self.uniform.set_opacity(opacity);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Build a camera-facing square quad with the plane's world position baked
/// into the vertices. Two triangles, counter-clockwise when seen from +z.
fn plane_geometry(size: f32, center: [f32; 3]) -> (Vec<VeilVertex>, Vec<u16>) {
    let half = size / 2.0;
    let [cx, cy, cz] = center;
    let vertices = vec![
        VeilVertex {
            position: [cx - half, cy - half, cz],
        },
        VeilVertex {
            position: [cx + half, cy - half, cz],
        },
        VeilVertex {
            position: [cx + half, cy + half, cz],
        },
        VeilVertex {
            position: [cx - half, cy + half, cz],
        },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("veil_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_spans_the_configured_size() {
        let (vertices, indices) = plane_geometry(VEIL_SIZE, VEIL_POSITION);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max - min, VEIL_SIZE);
        // all four corners sit on the veil's z plane
        assert!(vertices.iter().all(|v| v.position[2] == VEIL_POSITION[2]));
    }

    #[test]
    fn opacity_starts_at_zero() {
        assert_eq!(VeilUniform::new().opacity(), 0.0);
    }
}
