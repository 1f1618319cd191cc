//! The windowed game loop.
//!
//! [`run`] opens a window, brings up the GPU, builds the scene through the
//! setup closure, initializes it once and then steps it on every redraw:
//!
//! ```no_run
//! use telliverse::{AppConfig, GameConfig, Scene, SceneObject, run};
//!
//! fn main() -> anyhow::Result<()> {
//!     run(AppConfig::new().title("Kitchen"), |gpu| {
//!         let game = GameConfig::new();
//!         let mut scene = Scene::new(game.camera(gpu.aspect()));
//!         scene.add(SceneObject::new("builtin:cube"));
//!         scene
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! The loop ends when the window is closed or the scene reports
//! [`exit_requested`](crate::FrameOutcome::exit_requested).

use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::draw_queue::DrawQueue;
use crate::error::SceneError;
use crate::gpu::GpuContext;
use crate::input::InputCollector;
use crate::renderer::Renderer;
use crate::resources::GpuResources;
use crate::scene::Scene;
use crate::time::{FpsCounter, FrameClock};

/// Run the game until the window closes or the scene asks to exit.
///
/// `setup` runs once the GPU is available. Any failure while creating the
/// window, the device or the scene's resources ends the loop and is returned.
pub fn run<S>(config: AppConfig, setup: S) -> Result<(), SceneError>
where
    S: FnOnce(&GpuContext) -> Scene + 'static,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TelliverseApp {
        state: AppState::Pending {
            config,
            setup: Some(Box::new(setup)),
        },
        error: None,
    };

    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&GpuContext) -> Scene>;

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    resources: GpuResources,
    renderer: Renderer,
    scene: Scene,
    input: InputCollector,
    clock: FrameClock,
    fps: FpsCounter,
    queue: DrawQueue,
    clear_color: wgpu::Color,
}

enum AppState {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Stopped,
}

struct TelliverseApp {
    state: AppState,
    error: Option<SceneError>,
}

impl TelliverseApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!("{err}");
        self.error = Some(err);
        self.state = AppState::Stopped;
        event_loop.exit();
    }
}

fn start(
    event_loop: &ActiveEventLoop,
    config: &AppConfig,
    setup: SetupFn,
) -> Result<Running, SceneError> {
    let window_attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);
    let gpu = GpuContext::new(window.clone())?;
    let mut resources = GpuResources::new(&gpu);
    let renderer = Renderer::new(&gpu, &resources);

    let mut scene = setup(&gpu);
    scene.initialize(&mut resources)?;
    info!(title = %config.title, width = gpu.width(), height = gpu.height(), "game started");

    Ok(Running {
        window,
        gpu,
        resources,
        renderer,
        scene,
        input: InputCollector::new(),
        clock: FrameClock::new(),
        fps: FpsCounter::new(),
        queue: DrawQueue::new(),
        clear_color: config.clear_color,
    })
}

impl ApplicationHandler for TelliverseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending { config, setup } = &mut self.state else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match start(event_loop, config, setup) {
            Ok(running) => {
                running.window.request_redraw();
                self.state = AppState::Running(Box::new(running));
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(app) = &mut self.state else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
                let aspect = app.gpu.aspect();
                app.scene.camera_rig_mut().camera_mut().set_aspect(aspect);
            }
            WindowEvent::RedrawRequested => {
                let time = app.clock.tick();
                if let Some(fps) = app.fps.record(&time) {
                    info!(fps, "frame rate");
                }
                let snapshot = app.input.snapshot();

                app.queue.clear();
                let outcome = app.scene.tick(snapshot, time, &mut app.queue);

                match app
                    .renderer
                    .render(&app.gpu, &app.resources, &app.queue, app.clear_color)
                {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let (width, height) = (app.gpu.width(), app.gpu.height());
                        app.gpu.resize(width, height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        let err = SceneError::Gpu("out of memory while presenting".to_string());
                        self.fail(event_loop, err);
                        return;
                    }
                    Err(e) => warn!("skipping frame: {e}"),
                }

                if outcome.exit_requested {
                    event_loop.exit();
                } else {
                    app.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
