//! The light rig: a soft ambient fill plus one directional light.
//!
//! Both lights are packed into a single uniform so the model shader gets the
//! whole rig through one bind group. Nothing here changes after startup.

use wgpu::util::DeviceExt;

/// Soft fill so the scene is never fully dark. 0x404040 at 1.5x.
pub const AMBIENT_COLOR: [f32; 3] = [0.25, 0.25, 0.25];
pub const AMBIENT_INTENSITY: f32 = 1.5;
/// White directional light above and in front, for shading depth.
pub const DIRECTIONAL_POSITION: [f32; 3] = [0.0, 5.0, 5.0];
pub const DIRECTIONAL_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    ambient_color: [f32; 3],
    ambient_intensity: f32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use padding fields here
    directional_position: [f32; 3],
    _padding: u32,
    directional_color: [f32; 3],
    _padding2: u32,
}

impl LightsUniform {
    pub fn new() -> Self {
        Self {
            ambient_color: AMBIENT_COLOR,
            ambient_intensity: AMBIENT_INTENSITY,
            directional_position: DIRECTIONAL_POSITION,
            _padding: 0,
            directional_color: DIRECTIONAL_COLOR,
            _padding2: 0,
        }
    }
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightsUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("light_bind_group_layout"),
    })
}
