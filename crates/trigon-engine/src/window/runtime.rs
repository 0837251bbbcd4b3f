use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::AppConfig;
use crate::core::Session;
use crate::device::Gpu;
use crate::gfx::WgpuBackend;
use crate::input::platform::translate_window_event;
use crate::input::{InputState, Key};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
    /// Key that closes the window while held.
    pub exit_key: Key,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Hello Triangle".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            resizable: true,
            exit_key: Key::Escape,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs the frame loop until it closes, then tears
    /// everything down.
    ///
    /// Errors are fatal initialization failures (event loop, window, GPU
    /// context or scene setup).
    pub fn run(config: AppConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.finish()
    }
}

#[self_referencing]
struct WindowEntry {
    input: InputState,

    window: Window,

    #[borrows(window)]
    #[not_covariant]
    session: Session<WgpuBackend<'this>>,
}

struct AppState {
    config: AppConfig,
    entry: Option<WindowEntry>,
    init_error: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            entry: None,
            init_error: None,
        }
    }

    fn open_window(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let runtime = &self.config.runtime;
        let attrs = Window::default_attributes()
            .with_title(runtime.title.clone())
            .with_inner_size(runtime.initial_size)
            .with_resizable(runtime.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let scene = &self.config.scene;
        let exit_key = runtime.exit_key;

        WindowEntry::try_new(InputState::default(), window, |window| {
            let gpu = pollster::block_on(Gpu::new(window, gpu_init))
                .context("failed to initialize the GPU context")?;
            Session::new(WgpuBackend::new(window, gpu), scene, exit_key)
        })
    }

    /// Releases GPU objects, then the context, then the window.
    fn close(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            entry.with_session_mut(|s| s.teardown());
            drop(entry);
            log::debug!("window closed");
        }
    }

    /// Keeps the first initialization error for [`Runtime::run`] to return.
    /// The caller decides how to report it.
    fn fail_init(&mut self, err: anyhow::Error) {
        if self.init_error.is_none() {
            self.init_error = Some(err);
        }
    }

    fn finish(mut self) -> Result<()> {
        self.close();
        match self.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.init_error.is_some() {
            return;
        }

        match self.open_window(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => {
                self.fail_init(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_ref() else {
            return;
        };

        if entry.with_session(|s| s.should_close()) {
            self.close();
            event_loop.exit();
            return;
        }

        // The frame is static; redraw continuously only to stay responsive.
        event_loop.set_control_flow(ControlFlow::Wait);
        entry.with_window(|w| w.request_redraw());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_input_mut(|input| input.apply_event(ev));
        }

        match &event {
            WindowEvent::CloseRequested => {
                entry.with_session_mut(|s| s.request_close());
            }

            WindowEvent::Resized(size) => {
                entry.with_session_mut(|s| s.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.with_session_mut(|s| s.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| {
                    fields.session.step(fields.input);
                });
            }

            _ => {}
        }

        if entry.with_session(|s| s.should_close()) {
            self.close();
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.close();
    }
}
