// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod dynamics;
pub mod camera_controller;
pub mod session;
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputSnapshot, InputState, KeyBindings, TouchButton};
pub use dynamics::VehicleDynamics;
pub use camera_controller::CameraController;
pub use session::{ActiveCar, GameSession};
pub use frame_loop::{backing_store_size, frame_dt, screen_rect_points, window_backing_size, FrameLoopContext, MAX_FRAME_DT};
