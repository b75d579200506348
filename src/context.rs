use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{self, Camera, CameraResources, Projection},
    fog::FogResources,
    lights::{LightResources, LightsUniform},
    pipelines::{Pipelines, model::mk_model_pipeline, veil::mk_veil_pipeline},
    texture::Texture,
    veil::VeilResources,
};

/// Near-black clear color (0x0a0a0a), shared with the fog.
pub const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.039,
    g: 0.039,
    b: 0.039,
    a: 1.0,
};

/// Central GPU and window context.
///
/// Owns the surface, device and queue plus every piece of scene state that is
/// built exactly once at startup: camera, light rig, fog band, veil plane,
/// depth texture and the two render pipelines.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub lights: LightResources,
    pub fog: FogResources,
    pub veil: VeilResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an Srgb surface texture. Using a different one
        // will result in all the colors coming out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Slightly above and in front of the model, facing down -z.
        let camera = Camera::new(camera::CAMERA_POSITION, (0.0, 0.0, -1.0));
        let projection = Projection::new(
            config.width,
            config.height,
            camera::CAMERA_FOV_Y,
            camera::CAMERA_Z_NEAR,
            camera::CAMERA_Z_FAR,
        );
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let lights = LightResources::new(&device, LightsUniform::new());
        let fog = FogResources::new(&device);
        let veil = VeilResources::new(&device);

        let pipelines = Pipelines {
            model: mk_model_pipeline(
                &device,
                &config,
                &camera.bind_group_layout,
                &lights.bind_group_layout,
                &fog.bind_group_layout,
            ),
            veil: mk_veil_pipeline(
                &device,
                &config,
                &camera.bind_group_layout,
                &veil.bind_group_layout,
            ),
        };

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            lights,
            fog,
            veil,
            pipelines,
            clear_colour: BACKGROUND_COLOR,
        })
    }
}
