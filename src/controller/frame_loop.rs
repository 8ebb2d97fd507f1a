use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Window;

use crate::controller::{GameSession, InputProcessor, InputState};
use crate::ui;
use crate::view::{EguiFrame, GpuContext, SceneRenderer};

/// Longest step fed to the simulation; longer gaps (tab switches) are cut short
pub const MAX_FRAME_DT: f32 = 0.1;

/// Seconds between two `performance.now()` readings, clamped to `[0, MAX_FRAME_DT]`
pub fn frame_dt(last_ms: f64, now_ms: f64) -> f32 {
    (((now_ms - last_ms) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT)
}

/// Device pixels backing a canvas laid out at `css_width` x `css_height`.
/// With this size one egui point is one CSS pixel, so DOM client coordinates
/// can be fed to egui unchanged.
pub fn backing_store_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
    (
        (css_width * dpr).round().max(1.0) as u32,
        (css_height * dpr).round().max(1.0) as u32,
    )
}

/// egui screen area, in points, for a backing store of `width` x `height` pixels
pub fn screen_rect_points(width: u32, height: u32, pixels_per_point: f32) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(width as f32 / pixels_per_point, height as f32 / pixels_per_point),
    )
}

/// Backing store size for the current window, falling back to 800x600 CSS px
pub fn window_backing_size(window: &Window) -> (u32, u32) {
    let css = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>, fallback: f64| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
    };
    backing_store_size(
        css(window.inner_width(), 800.0),
        css(window.inner_height(), 600.0),
        window.device_pixel_ratio(),
    )
}

/// Main game loop state and update logic
pub struct FrameLoopContext {
    pub gpu: GpuContext,
    pub renderer: SceneRenderer,
    pub session: Rc<RefCell<GameSession>>,
    pub input_state: Rc<RefCell<InputState>>,
    pub input_processor: InputProcessor,
    pub egui_ctx: egui::Context,
    pub egui_events: Rc<RefCell<Vec<egui::Event>>>,
    pub last_time: f64,
}

impl FrameLoopContext {
    /// Advance the game one frame and draw it
    pub fn tick(&mut self, window: &Window) {
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let dt = frame_dt(self.last_time, now);
        self.last_time = now;

        self.handle_resize(window);

        let snapshot = self.input_processor.snapshot(&self.input_state.borrow());
        let session_cell = Rc::clone(&self.session);
        let mut session = session_cell.borrow_mut();
        session.update(&snapshot, dt);

        let egui_frame = self.run_ui(window, &mut session, now, dt);

        self.renderer
            .sync(&self.gpu.device, &self.gpu.queue, session.scene(), session.camera());
        drop(session);

        if let Err(e) = self
            .renderer
            .draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface, Some(egui_frame))
        {
            tracing::warn!(error = %e, "frame skipped");
        }
    }

    fn run_ui(&mut self, window: &Window, session: &mut GameSession, now: f64, dt: f32) -> EguiFrame {
        let dpr = window.device_pixel_ratio() as f32;
        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(now / 1000.0);
        raw_input.screen_rect = Some(screen_rect_points(self.renderer.width, self.renderer.height, dpr));
        raw_input.events.extend(self.egui_events.borrow_mut().drain(..));
        self.egui_ctx.set_pixels_per_point(dpr);

        let full_output = self.egui_ctx.run(raw_input, |ctx| ui::draw_ui(ctx, session, dt));
        let primitives = self.egui_ctx.tessellate(full_output.shapes, dpr);

        EguiFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: dpr,
        }
    }

    fn handle_resize(&mut self, window: &Window) {
        let (nw, nh) = window_backing_size(window);
        if nw == self.renderer.width && nh == self.renderer.height {
            return;
        }

        // Canvas backing store follows the window at device resolution
        if let Some(canvas) = window
            .document()
            .and_then(|d| d.query_selector("canvas").ok().flatten())
            .and_then(|el| wasm_bindgen::JsCast::dyn_into::<web_sys::HtmlCanvasElement>(el).ok())
        {
            canvas.set_width(nw);
            canvas.set_height(nh);
        }

        self.gpu.resize(nw, nh);
        self.renderer.resize(&self.gpu.device, nw, nh);
        self.session.borrow_mut().resize(nw, nh);
        tracing::info!(width = nw, height = nh, "viewport resized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped() {
        assert_eq!(frame_dt(1000.0, 1000.0), 0.0);
        assert!((frame_dt(0.0, 16.0) - 0.016).abs() < 1e-6);
        assert_eq!(frame_dt(0.0, 5000.0), MAX_FRAME_DT);
        // clock going backwards
        assert_eq!(frame_dt(2000.0, 1000.0), 0.0);
    }

    #[test]
    fn backing_store_is_scaled_by_pixel_ratio() {
        assert_eq!(backing_store_size(800.0, 600.0, 2.0), (1600, 1200));
        assert_eq!(backing_store_size(375.0, 667.0, 1.5), (563, 1001));
        assert_eq!(backing_store_size(800.0, 600.0, 0.0), (800, 600));
        assert_eq!(backing_store_size(0.0, 0.0, 2.0), (1, 1));
    }

    #[test]
    fn css_pointer_positions_land_in_egui_points() {
        let dpr = 2.0;
        let (w, h) = backing_store_size(800.0, 600.0, dpr);
        let rect = screen_rect_points(w, h, dpr as f32);
        assert_eq!(rect.size(), egui::vec2(800.0, 600.0));
        // a tap in the middle of the page, in CSS px
        assert_eq!(rect.center(), egui::pos2(400.0, 300.0));
        assert!(rect.contains(egui::pos2(799.0, 599.0)));
    }
}
