use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        let eye = Vec3::new(0.0, 3.0, -7.0);
        Self {
            eye,
            target: eye + Vec3::Z,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).try_normalize().unwrap_or(Vec3::Z)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

// A zero-height surface (minimized window) would give an infinite aspect
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_behind_and_above_the_car() {
        let cam = Camera::new(800, 600, &CameraConfig::default());
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, -7.0));
        assert!((cam.fov_y - 70f32.to_radians()).abs() < 1e-6);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_sizes_keep_a_finite_aspect() {
        let mut cam = Camera::new(800, 600, &CameraConfig::default());
        cam.set_aspect(800, 0);
        assert!(cam.aspect.is_finite());
        assert!(cam.view_proj().is_finite());
    }

    #[test]
    fn target_in_front_projects_inside_clip_space() {
        let mut cam = Camera::new(800, 600, &CameraConfig::default());
        cam.set_look_at(Vec3::new(0.0, 0.5, 12.0));
        let clip = cam.view_proj() * Vec3::new(0.0, 0.5, 12.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
