//! Application event loop and frame composition.
//!
//! This module owns the winit `ApplicationHandler`: it creates the window,
//! initializes the GPU [`Context`], kicks off the one-shot model load, and
//! drives the per-frame animation/render cycle.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window (attaching to the `canvas` element on the
//!    web) and builds the context; on wasm this happens in a spawned future
//!    that reports back through a user event.
//! 2. The model load is spawned as the sole async task. Its completion
//!    crosses back to the loop thread as a [`SceneEvent::ModelLoaded`] user
//!    event, so scene state is only ever touched from this thread. A failed
//!    load is logged once and the scene keeps running without a model.
//! 3. Every `RedrawRequested`: advance the animator, apply the resulting
//!    pose (model z, veil opacity, fog band), render, and request the next
//!    redraw.
//! 4. `Resized` reconfigures the surface, projection aspect and depth
//!    texture. Nothing else.

use std::{iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    animator::{FramePose, MODEL_START_POSITION, SceneAnimator},
    context::Context,
    instance::Instance,
    model::{self, DrawModel},
    resources::{MODEL_ASSET_PATH, load_model_gltf},
    texture::Texture,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Events delivered to the loop thread from outside the winit callbacks.
pub(crate) enum SceneEvent {
    /// Wasm only: context initialization finished in a spawned future.
    #[allow(dead_code)]
    Initialized(AppState),
    /// The one-shot asset load completed successfully.
    ModelLoaded(model::Model),
}

impl std::fmt::Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::ModelLoaded(_) => f.write_str("ModelLoaded(Model)"),
        }
    }
}

/// The loaded model together with its world transform on the GPU.
#[derive(Debug)]
pub struct SceneModel {
    pub model: model::Model,
    pub instance: Instance,
    pub instance_buffer: wgpu::Buffer,
}

/// Application state bundle: GPU context, animation state, and the model
/// slot that fills in once loading completes.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    animator: SceneAnimator,
    scene_model: Option<SceneModel>,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> Self {
        let ctx = Context::new(window).await;
        let ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        Self {
            ctx,
            animator: SceneAnimator::new(),
            scene_model: None,
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx
                .camera
                .write_to_buffer(&self.ctx.queue, &self.ctx.projection);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// One-way transition from "model absent" to "model present", triggered
    /// solely by load success.
    fn attach_model(&mut self, model: model::Model) {
        let instance = Instance::from(cgmath::Vector3::from(MODEL_START_POSITION));
        let instance_buffer = instance.mk_buffer(&self.ctx.device);
        self.scene_model = Some(SceneModel {
            model,
            instance,
            instance_buffer,
        });
        self.animator.set_model_present();
        log::info!("model attached to scene at {:?}", MODEL_START_POSITION);
    }

    /// Apply one frame of animation to the GPU-side scene state.
    fn apply_pose(&mut self, pose: &FramePose) {
        if let Some(scene_model) = &mut self.scene_model {
            scene_model.instance.position.z = pose.model_z as f32;
            scene_model
                .instance
                .write_to_buffer(&self.ctx.queue, &scene_model.instance_buffer);
        }
        self.ctx
            .veil
            .write_to_buffer(&self.ctx.queue, pose.veil_opacity as f32);
        self.ctx.fog.write_to_buffer(&self.ctx.queue, pose);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            // Actual rendering: the model when present, then the veil on top.
            if let Some(scene_model) = &self.scene_model {
                render_pass.set_pipeline(&self.ctx.pipelines.model);
                render_pass.set_vertex_buffer(1, scene_model.instance_buffer.slice(..));
                render_pass.draw_model_instanced(
                    &scene_model.model,
                    0..1,
                    &self.ctx.camera.bind_group,
                    &self.ctx.lights.bind_group,
                    &self.ctx.fog.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.veil);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(1, &self.ctx.veil.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.ctx.veil.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.ctx.veil.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.ctx.veil.num_elements, 0, 0..1);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<SceneEvent>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<SceneEvent>) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
        }
    }

    /// Spawn the one-shot model load off the render loop.
    ///
    /// On success the parsed model crosses back as a user event; on failure
    /// the error is logged once and swallowed, leaving the scene to run
    /// without a model. No retry.
    fn spawn_model_load(&self) {
        let state = match &self.state {
            Some(state) => state,
            None => return,
        };
        // Device and Queue clone by bumping their internal Arcs.
        let device = state.ctx.device.clone();
        let queue = state.ctx.queue.clone();
        let proxy = self.proxy.clone();

        let load = async move {
            match load_model_gltf(MODEL_ASSET_PATH, &device, &queue).await {
                Ok(model) => {
                    if proxy.send_event(SceneEvent::ModelLoaded(model)).is_err() {
                        log::warn!("event loop closed before the model load completed");
                    }
                }
                Err(e) => {
                    log::error!(
                        "An error occurred while loading the model {}: {:#}",
                        MODEL_ASSET_PATH,
                        e
                    );
                }
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = self.async_runtime.block_on(AppState::new(window));
            let size = state.ctx.window.inner_size();
            self.state = Some(state);
            let state = self.state.as_mut().unwrap();
            state.resize(size.width, size.height);
            self.spawn_model_load();
            self.state.as_ref().unwrap().ctx.window.request_redraw();
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window).await;
                assert!(proxy.send_event(SceneEvent::Initialized(state)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            SceneEvent::Initialized(state) => {
                // This is the message from our wasm `spawn_local`
                self.state = Some(state);

                // Important: Trigger a resize and redraw now that we are initialized
                let state = self.state.as_mut().unwrap();
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                self.spawn_model_load();
                self.state.as_ref().unwrap().ctx.window.request_redraw();
            }
            SceneEvent::ModelLoaded(model) => {
                if let Some(state) = &mut self.state {
                    state.attach_model(model);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                // Advance the fixed-step animation first. With no model
                // loaded yet there is no pose to apply and the frame renders
                // the background, lights, fog and veil as-is.
                if let Some(pose) = state.animator.advance() {
                    state.apply_pose(&pose);
                }

                match state.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Build the event loop and run the scene until the window closes.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<SceneEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop);

    event_loop.run_app(&mut app)?;

    Ok(())
}
