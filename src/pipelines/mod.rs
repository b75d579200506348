//! Render pipeline construction.
//!
//! Two pipelines cover the whole scene: `model` draws the loaded gltf model
//! opaquely with lighting and fog, `veil` alpha-blends the overlay quad on
//! top of it.

pub mod model;
pub mod veil;

/// The fixed pipeline set, built once by the context.
#[derive(Debug)]
pub struct Pipelines {
    pub model: wgpu::RenderPipeline,
    pub veil: wgpu::RenderPipeline,
}
