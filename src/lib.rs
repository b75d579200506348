//! veilcast
//!
//! A small cross-platform scene demo built on wgpu and winit. One gltf model
//! drifts back and forth along the z axis while a translucent veil plane and
//! a linear fog band follow the motion, fading the model in and out of the
//! dark. Runs natively and in the browser (WASM).
//!
//! High-level modules
//! - `animator`: the pure per-frame animation state (time, pose, veil, fog)
//! - `app`: winit application handler, event loop and frame composition
//! - `camera`: camera, projection and the view/projection uniform
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `fog`: linear fog band uniform and GPU resources
//! - `instance`: the model's world transform as instance data
//! - `lights`: ambient + directional light rig uniform
//! - `model`: mesh, material and vertex definitions for loaded models
//! - `pipelines`: render pipeline construction (model, veil)
//! - `resources`: asset IO and gltf model loading
//! - `texture`: GPU texture wrapper and creation utilities
//! - `veil`: the translucent overlay plane between camera and subject
//!

pub mod animator;
pub mod app;
pub mod camera;
pub mod context;
pub mod fog;
pub mod instance;
pub mod lights;
pub mod model;
pub mod pipelines;
pub mod resources;
pub mod texture;
pub mod veil;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::WindowEvent;
