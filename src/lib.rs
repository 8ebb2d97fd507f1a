// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{FrameRateMode, GameConfig};
pub use controller::GameSession;
pub use model::CarType;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

    use crate::config::GameConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, touch_to_input};
    use crate::controller::{window_backing_size, FrameLoopContext, GameSession, InputEvent, InputProcessor, InputState, TouchButton};
    use crate::logging;
    use crate::model::CarType;
    use crate::view::{GpuContext, SceneRenderer};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas()?;
        setup_app(&window, &document, &canvas).await
    }

    /// Main application setup for WASM
    async fn setup_app(window: &Window, document: &Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let gpu = GpuContext::new(canvas, canvas.width(), canvas.height())
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let width = gpu.config.width;
        let height = gpu.config.height;
        let renderer = SceneRenderer::new(gpu.device.as_ref(), gpu.format, gpu.config.alpha_mode, width, height);

        // A car is on the road behind the menu from the first frame
        let mut session = GameSession::new(GameConfig::default(), width, height);
        session.spawn(CarType::default());
        let session = Rc::new(RefCell::new(session));

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let input_processor = InputProcessor::default();
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));

        setup_input_listeners(document, window, canvas, &input_processor, input_state.clone(), egui_events.clone())?;

        let mut frame_ctx = FrameLoopContext {
            gpu,
            renderer,
            session,
            input_state,
            input_processor,
            egui_ctx: egui::Context::default(),
            egui_events,
            last_time: window.performance().map(|p| p.now()).unwrap_or(0.0),
        };

        tracing::info!(width, height, "starting frame loop");
        let loop_window = window.clone();
        RcCellCallback::new(window.clone(), move || frame_ctx.tick(&loop_window)).start()
    }

    /// Attach `handler` for `event` on `target` for the lifetime of the page
    fn listen<E>(target: &EventTarget, event: &str, handler: impl FnMut(E) + 'static) -> Result<(), JsValue>
    where
        E: FromWasmAbi + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Setup all input event listeners with platform-agnostic abstractions
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        input_processor: &InputProcessor,
        input_state: Rc<RefCell<InputState>>,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
    ) -> Result<(), JsValue> {
        // Keyboard
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            listen(document, "keydown", move |e: KeyboardEvent| {
                if input_processor.is_game_key(&e.key()) {
                    e.prevent_default();
                }
                input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, true));
            })?;
        }
        {
            let input_state = input_state.clone();
            listen(document, "keyup", move |e: KeyboardEvent| {
                input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, false));
            })?;
        }

        // Focus loss and hidden tabs never deliver key-ups
        {
            let input_state = input_state.clone();
            listen(window, "blur", move |_e: Event| {
                input_state.borrow_mut().process_event(&InputEvent::FocusLost);
            })?;
        }
        {
            let input_state = input_state.clone();
            let doc = document.clone();
            listen(document, "visibilitychange", move |_e: Event| {
                let visible = !doc.hidden();
                input_state.borrow_mut().process_event(&InputEvent::VisibilityChanged { visible });
            })?;
        }

        // On-screen touch buttons
        for button in TouchButton::ALL {
            let Some(element) = document.get_element_by_id(button.element_id()) else {
                tracing::warn!(id = button.element_id(), "touch button missing from page");
                continue;
            };
            for (event, pressed) in [("touchstart", true), ("touchend", false), ("touchcancel", false)] {
                let input_state = input_state.clone();
                listen(&element, event, move |e: TouchEvent| {
                    e.prevent_default();
                    input_state.borrow_mut().process_event(&touch_to_input(button, pressed));
                })?;
            }
        }

        // Pointer input for egui; client coordinates are CSS px, which are egui points
        {
            let egui_events = egui_events.clone();
            listen(document, "mousemove", move |e: MouseEvent| {
                let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
                egui_events.borrow_mut().push(egui::Event::PointerMoved(pos));
            })?;
        }
        for (event, pressed) in [("mousedown", true), ("mouseup", false)] {
            let egui_events = egui_events.clone();
            listen(canvas, event, move |e: MouseEvent| {
                let Some(button) = pointer_button(e.button()) else {
                    return;
                };
                egui_events.borrow_mut().push(egui::Event::PointerButton {
                    pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                    button,
                    pressed,
                    modifiers: egui::Modifiers::default(),
                });
            })?;
        }

        // Taps on the canvas drive the car menu on phones
        for (event, pressed) in [("touchstart", true), ("touchend", false)] {
            let egui_events = egui_events.clone();
            listen(canvas, event, move |e: TouchEvent| {
                let Some(touch) = e.changed_touches().get(0) else {
                    return;
                };
                let pos = egui::pos2(touch.client_x() as f32, touch.client_y() as f32);
                let mut events = egui_events.borrow_mut();
                events.push(egui::Event::PointerMoved(pos));
                events.push(egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    modifiers: egui::Modifiers::default(),
                });
                if !pressed {
                    events.push(egui::Event::PointerGone);
                }
            })?;
        }

        Ok(())
    }

    fn pointer_button(button: i16) -> Option<egui::PointerButton> {
        match button {
            0 => Some(egui::PointerButton::Primary),
            1 => Some(egui::PointerButton::Middle),
            2 => Some(egui::PointerButton::Secondary),
            _ => None,
        }
    }

    /// Full-window canvas appended to the page body
    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| js_error("no document on window"))?;
        let body = document.body().ok_or_else(|| js_error("no body on document"))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;

        let (width, height) = window_backing_size(&window);
        canvas.set_width(width);
        canvas.set_height(height);
        body.append_child(&canvas)?;
        Ok((window, document, canvas))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// requestAnimationFrame driver that re-arms itself after every call
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) -> Result<(), JsValue> {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(error = ?e, "requestAnimationFrame failed, loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
            Ok(())
        }
    }
}
