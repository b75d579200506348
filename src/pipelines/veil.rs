use crate::{
    model::Vertex, pipelines::model::mk_render_pipeline, texture::Texture, veil::VeilVertex,
};

/**
 * Pipeline for the translucent veil quad.
 *
 * Alpha-blended so the scene shows through at the animator's current
 * opacity, and rendered without back-face culling so the plane is visible
 * from both faces. Drawn after the model within the same render pass.
 */
pub fn mk_veil_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    veil_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Veil Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, veil_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Veil Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("veil_shader.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        &[VeilVertex::desc()],
        // double-sided
        None,
        shader,
    )
}
