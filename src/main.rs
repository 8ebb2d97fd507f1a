use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use roadrush::{
    logging, ui,
    controller::{GameSession, InputEvent, InputProcessor, InputState, MAX_FRAME_DT},
    model::CarType,
    view::{EguiFrame, GpuContext, SceneRenderer},
    GameConfig,
};

/// Browser `KeyboardEvent.key` name for the keys the game listens to
fn key_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::ArrowLeft => Some("arrowleft"),
        KeyCode::ArrowRight => Some("arrowright"),
        KeyCode::KeyA => Some("a"),
        KeyCode::KeyD => Some("d"),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some("shift"),
        KeyCode::Space => Some(" "),
        _ => None,
    }
}

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SceneRenderer,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Game state
    session: GameSession,
    input_state: InputState,
    input_processor: InputProcessor,

    last_frame_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height)
            .await
            .context("GPU init failed")?;

        let renderer = SceneRenderer::new(
            gpu.device.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let mut session = GameSession::new(GameConfig::default(), gpu.config.width, gpu.config.height);
        session.spawn(CarType::default());

        Ok(Self {
            window,
            gpu,
            renderer,
            egui_state,
            egui_ctx,
            session,
            input_state: InputState::new(),
            input_processor: InputProcessor::default(),
            last_frame_time: Instant::now(),
        })
    }

    /// Returns true when the event was consumed
    fn input(&mut self, event: &WindowEvent) -> bool {
        if self.egui_state.on_window_event(self.window.as_ref(), event).consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else {
                    return false;
                };
                let Some(name) = key_name(*code) else {
                    return false;
                };
                let event = match state {
                    ElementState::Pressed => InputEvent::KeyDown(name.to_string()),
                    ElementState::Released => InputEvent::KeyUp(name.to_string()),
                };
                self.input_state.process_event(&event);
                true
            }
            WindowEvent::Focused(false) => {
                self.input_state.process_event(&InputEvent::FocusLost);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.input_state.process_event(&InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.gpu.resize(new_size.width, new_size.height);
        self.renderer.resize(&self.gpu.device, new_size.width, new_size.height);
        self.session.resize(new_size.width, new_size.height);
    }

    fn update(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame_time = now;

        let snapshot = self.input_processor.snapshot(&self.input_state);
        self.session.update(&snapshot, dt);
        dt
    }

    fn render_ui(&mut self, dt: f32) -> EguiFrame {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let session = &mut self.session;
        let output = self.egui_ctx.run(raw_input, |ctx| ui::draw_ui(ctx, session, dt));
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = self.window.scale_factor() as f32;
        EguiFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            pixels_per_point,
        }
    }

    fn render(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        let egui_frame = self.render_ui(dt);
        self.renderer
            .sync(&self.gpu.device, &self.gpu.queue, self.session.scene(), self.session.camera());
        self.renderer
            .draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface, Some(egui_frame))
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("RoadRush")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone()))?;
    tracing::info!("starting native frame loop");

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let dt = app.update();
                            match app.render(dt) {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory, exiting");
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!(error = %e, "frame skipped"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_keys_are_game_keys() {
        let processor = InputProcessor::default();
        for code in [KeyCode::ArrowLeft, KeyCode::ArrowRight, KeyCode::KeyA, KeyCode::KeyD, KeyCode::ShiftLeft, KeyCode::Space] {
            let name = key_name(code).unwrap();
            assert!(processor.is_game_key(name), "{name:?}");
        }
        assert_eq!(key_name(KeyCode::Escape), None);
    }

    #[test]
    fn both_shift_keys_drift() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();
        state.process_event(&InputEvent::KeyDown(key_name(KeyCode::ShiftRight).unwrap().into()));
        assert!(processor.snapshot(&state).drift);
    }
}
