use glam::Vec3;
use crate::config::CameraConfig;
use crate::model::Camera;

/// Trailing camera that eases sideways toward the car
pub struct CameraController {
    pub follow_factor: f32,
    pub lateral_ratio: f32,
    pub height: f32,
    pub trailing_distance: f32,
    pub look_ahead: f32,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            follow_factor: config.follow_factor,
            lateral_ratio: config.lateral_ratio,
            height: config.height,
            trailing_distance: config.trailing_distance,
            look_ahead: config.look_ahead,
        }
    }

    /// Exponential smoothing on x only; height and distance are pinned.
    /// `frames` is the number of reference frames this call stands for.
    pub fn follow(&self, camera: &mut Camera, car_pos: Vec3, frames: f32) {
        camera.eye.x += (car_pos.x * self.lateral_ratio - camera.eye.x) * self.blend(frames);
        camera.eye.y = self.height;
        camera.eye.z = car_pos.z - self.trailing_distance;
        camera.set_look_at(Vec3::new(car_pos.x, car_pos.y, car_pos.z + self.look_ahead));
    }

    /// Share of the remaining gap closed over `frames` reference frames
    fn blend(&self, frames: f32) -> f32 {
        if frames == 1.0 {
            self.follow_factor
        } else {
            1.0 - (1.0 - self.follow_factor).powf(frames)
        }
    }
}
