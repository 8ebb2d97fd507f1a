//! Tuning constants for the simulation, road, camera and HUD.
//!
//! Usage:
//!   // Use default configuration
//!   let session = GameSession::new(GameConfig::default(), 800, 600);
//!
//!   // Or customize:
//!   let mut config = GameConfig::default();
//!   config.road.scroll_scale = 120.0;          // faster perceived speed
//!   config.dynamics.frame_rate = FrameRateMode::Scaled { reference_hz: 60.0 };
//!   let session = GameSession::new(config, 800, 600);

/// How per-frame constants relate to the elapsed time of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameRateMode {
    /// Acceleration, steering, damping and friction are applied once per update
    /// regardless of the frame delta. Faster displays drive faster.
    PerFrame,
    /// Per-frame terms are rescaled so one update of `1 / reference_hz` seconds
    /// matches a `PerFrame` update.
    Scaled { reference_hz: f32 },
}

impl FrameRateMode {
    /// Number of reference frames one update of `dt` seconds stands for.
    pub fn frames(&self, dt: f32) -> f32 {
        match *self {
            FrameRateMode::PerFrame => 1.0,
            FrameRateMode::Scaled { reference_hz } => (dt * reference_hz).max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DynamicsConfig {
    // Longitudinal
    pub friction: f32,
    pub stop_epsilon: f32,

    // Lateral
    pub drift_handling_multiplier: f32,
    pub drift_lateral_damping: f32,
    pub grip_lateral_damping: f32,
    pub track_half_width: f32,

    // Nitro, in seconds
    pub nitro_duration: f32,
    pub nitro_cooldown: f32,

    pub frame_rate: FrameRateMode,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            friction: 0.995,
            stop_epsilon: 0.01,
            drift_handling_multiplier: 1.4,
            drift_lateral_damping: 0.975,
            grip_lateral_damping: 0.85,
            track_half_width: 4.2,
            nitro_duration: 2.0,
            nitro_cooldown: 5.0,
            frame_rate: FrameRateMode::PerFrame,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RoadConfig {
    pub segment_count: usize,
    pub segment_length: f32,
    pub width: f32,
    pub thickness: f32,
    /// World units a segment moves per unit of forward speed each frame
    pub scroll_scale: f32,
    /// Segments past this z are recycled to the back of the pool
    pub wrap_threshold: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            segment_count: 6,
            segment_length: 60.0,
            width: 10.0,
            thickness: 0.12,
            scroll_scale: 60.0,
            wrap_threshold: 120.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub follow_factor: f32,
    pub lateral_ratio: f32,
    pub height: f32,
    pub trailing_distance: f32,
    pub look_ahead: f32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_factor: 0.08,
            lateral_ratio: 0.6,
            height: 2.6,
            trailing_distance: 7.0,
            look_ahead: 10.0,
            fov_y_degrees: 70.0,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HudConfig {
    /// Arbitrary factor from forward speed to the km/h readout
    pub kmh_scale: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self { kmh_scale: 300.0 }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GameConfig {
    pub dynamics: DynamicsConfig,
    pub road: RoadConfig,
    pub camera: CameraConfig,
    pub hud: HudConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_frame_mode_ignores_delta() {
        let mode = FrameRateMode::PerFrame;
        assert_eq!(mode.frames(0.0), 1.0);
        assert_eq!(mode.frames(0.5), 1.0);
    }

    #[test]
    fn scaled_mode_counts_reference_frames() {
        let mode = FrameRateMode::Scaled { reference_hz: 60.0 };
        assert!((mode.frames(1.0 / 30.0) - 2.0).abs() < 1e-5);
        assert_eq!(mode.frames(0.0), 0.0);
        assert_eq!(mode.frames(-1.0), 0.0);
    }
}
