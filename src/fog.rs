//! Linear fog band uniform and GPU resources.
//!
//! The fog blends fragment color toward the background color between a near
//! and a far distance from the camera. Unlike the lights the band moves every
//! frame: the animator slides both distances toward the camera as the model
//! recedes, which is what makes the model appear to sink into the dark.

use wgpu::util::DeviceExt;

use crate::animator::{FOG_FAR_AT_REST, FOG_NEAR_AT_REST, FramePose};

/// Near-black, the same hue the surface is cleared with (0x0a0a0a).
pub const FOG_COLOR: [f32; 3] = [0.039, 0.039, 0.039];

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FogUniform {
    color: [f32; 4],
    // x = near distance, y = far distance, z/w unused
    params: [f32; 4],
}

impl FogUniform {
    pub fn new() -> Self {
        Self {
            color: [FOG_COLOR[0], FOG_COLOR[1], FOG_COLOR[2], 1.0],
            params: [FOG_NEAR_AT_REST as f32, FOG_FAR_AT_REST as f32, 0.0, 0.0],
        }
    }

    pub fn set_band(&mut self, near: f32, far: f32) {
        self.params[0] = near;
        self.params[1] = far;
    }

    pub fn near(&self) -> f32 {
        self.params[0]
    }

    pub fn far(&self) -> f32 {
        self.params[1]
    }
}

impl Default for FogUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct FogResources {
    pub uniform: FogUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FogResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = FogUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fog Buffer"),
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
            label: Some("fog_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Apply the frame's fog band and upload it.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, pose: &FramePose) {
        self.uniform.set_band(pose.fog_near as f32, pose.fog_far as f32);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
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
        label: Some("fog_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::pose_at;

    #[test]
    fn band_tracks_the_pose() {
        let mut uniform = FogUniform::new();
        let pose = pose_at(3.0 * std::f64::consts::FRAC_PI_2);
        uniform.set_band(pose.fog_near as f32, pose.fog_far as f32);
        assert_eq!(uniform.near(), 8.0);
        assert_eq!(uniform.far(), 16.0);
    }

    #[test]
    fn rest_band_matches_startup_state() {
        let uniform = FogUniform::new();
        assert_eq!(uniform.near(), 12.0);
        assert_eq!(uniform.far(), 20.0);
    }
}
