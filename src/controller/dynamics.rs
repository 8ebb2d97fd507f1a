use crate::config::DynamicsConfig;
use crate::model::{Nitro, VehicleProfile, VehicleState};

use super::input::InputSnapshot;

/// Per-frame vehicle dynamics: speed, steering, drift, lateral integration and nitro.
///
/// In [`FrameRateMode::PerFrame`](crate::config::FrameRateMode::PerFrame) every
/// constant is applied once per call, so the car behaves differently at 60 Hz
/// and 144 Hz. The nitro timers always use `dt`.
pub struct VehicleDynamics {
    pub config: DynamicsConfig,
}

impl VehicleDynamics {
    pub fn new(config: DynamicsConfig) -> Self {
        Self { config }
    }

    /// Full update: motion followed by the nitro timers
    pub fn update(&self, state: &mut VehicleState, profile: &VehicleProfile, input: &InputSnapshot, dt: f32) {
        self.apply_motion(state, profile, input, dt);
        self.advance_nitro(&mut state.nitro, input.nitro, dt);
    }

    /// Speed, steering, drift and lateral integration
    pub fn apply_motion(&self, state: &mut VehicleState, profile: &VehicleProfile, input: &InputSnapshot, dt: f32) {
        let cfg = &self.config;
        let frames = cfg.frame_rate.frames(dt);

        // Longitudinal: accelerate toward the target, coast above it
        let boost = if state.nitro.is_active() { profile.nitro_boost } else { 1.0 };
        let target = profile.max_speed * boost;
        if state.forward_speed < target {
            state.forward_speed = (state.forward_speed + profile.acceleration * frames).min(target);
        } else {
            state.forward_speed *= per_frames(cfg.friction, frames);
            if state.forward_speed < cfg.stop_epsilon {
                state.forward_speed = 0.0;
            }
        }

        // Steering; both directions held cancel out
        let handling = profile.handling
            * if input.drift { cfg.drift_handling_multiplier } else { 1.0 }
            * frames;
        if input.steer_left {
            state.lateral_velocity -= handling;
        }
        if input.steer_right {
            state.lateral_velocity += handling;
        }

        // Drift keeps more sideways momentum but bleeds forward speed
        state.is_drifting = input.drift;
        if state.is_drifting {
            state.lateral_velocity *= per_frames(cfg.drift_lateral_damping, frames);
            state.forward_speed *= per_frames(profile.drift_factor, frames);
        } else {
            state.lateral_velocity *= per_frames(cfg.grip_lateral_damping, frames);
        }

        state.lateral_position = (state.lateral_position + state.lateral_velocity * frames)
            .clamp(-cfg.track_half_width, cfg.track_half_width);
    }

    /// Ready -> Active on request, Active -> Cooldown when the boost runs out,
    /// Cooldown -> Ready when recharged. Requests outside Ready are dropped.
    pub fn advance_nitro(&self, nitro: &mut Nitro, requested: bool, dt: f32) {
        if requested && nitro.is_ready() {
            *nitro = Nitro::Active { timer: self.config.nitro_duration };
            tracing::info!("nitro engaged");
        }

        match *nitro {
            Nitro::Active { timer } => {
                let timer = timer - dt;
                *nitro = if timer <= 0.0 {
                    tracing::debug!("nitro depleted, cooling down");
                    Nitro::Cooldown { remaining: self.config.nitro_cooldown }
                } else {
                    Nitro::Active { timer }
                };
            }
            Nitro::Cooldown { remaining } => {
                let remaining = remaining - dt;
                *nitro = if remaining <= 0.0 {
                    tracing::debug!("nitro recharged");
                    Nitro::Ready
                } else {
                    Nitro::Cooldown { remaining }
                };
            }
            Nitro::Ready => {}
        }
    }
}

/// Multiplicative factor compounded over `frames` reference frames
fn per_frames(factor: f32, frames: f32) -> f32 {
    if frames == 1.0 {
        factor
    } else {
        factor.powf(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameRateMode;
    use crate::model::{CarType, NitroPhase};

    const DT: f32 = 1.0 / 60.0;

    fn dynamics() -> VehicleDynamics {
        VehicleDynamics::new(DynamicsConfig::default())
    }

    fn audi() -> VehicleProfile {
        CarType::Audi.profile()
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn accelerates_linearly_up_to_max_speed() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState::new();
        for n in 1..=45 {
            dyn_.update(&mut state, &profile, &idle(), DT);
            let expected = (0.012 * n as f32).min(0.55);
            assert!(approx(state.forward_speed, expected), "frame {n}: {} != {expected}", state.forward_speed);
        }
        // 0.012 * 46 > 0.55, clamped exactly
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert_eq!(state.forward_speed, 0.55);
    }

    #[test]
    fn at_max_speed_friction_takes_over() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState { forward_speed: 0.55, ..VehicleState::new() };
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert!(approx(state.forward_speed, 0.55 * 0.995));
        // back below target, so the next frame accelerates and clamps
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert_eq!(state.forward_speed, 0.55);
    }

    #[test]
    fn coasting_snaps_to_zero_below_epsilon() {
        let dyn_ = dynamics();
        let profile = VehicleProfile { max_speed: 0.0, ..audi() };
        let mut state = VehicleState { forward_speed: 0.01, ..VehicleState::new() };
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert_eq!(state.forward_speed, 0.0);
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert_eq!(state.forward_speed, 0.0);
    }

    #[test]
    fn speed_stays_within_bounds_under_any_input() {
        let dyn_ = dynamics();
        for car in CarType::ALL {
            let profile = car.profile();
            let mut state = VehicleState::new();
            for frame in 0..3000 {
                let input = InputSnapshot {
                    steer_left: frame % 7 == 0,
                    steer_right: frame % 5 == 0,
                    drift: frame % 400 < 90,
                    nitro: frame % 11 == 0,
                };
                dyn_.update(&mut state, &profile, &input, DT);
                assert!(state.forward_speed >= 0.0);
                assert!(state.forward_speed <= profile.boosted_max_speed() + 1e-6);
            }
        }
    }

    #[test]
    fn nitro_raises_the_speed_cap() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState { forward_speed: 0.55, ..VehicleState::new() };
        let boost = InputSnapshot { nitro: true, ..idle() };
        dyn_.update(&mut state, &profile, &boost, DT);
        // motion runs before nitro, so this frame still coasts at the old cap
        assert!(state.nitro.is_active());
        assert!(approx(state.forward_speed, 0.55 * 0.995));
        // target is now 0.55 * 1.7
        dyn_.update(&mut state, &profile, &idle(), DT);
        assert!(approx(state.forward_speed, 0.55 * 0.995 + 0.012));
    }

    #[test]
    fn lateral_position_stays_on_track() {
        let dyn_ = dynamics();
        let profile = CarType::Mercedes.profile();
        let mut state = VehicleState::new();
        let hard_left = InputSnapshot { steer_left: true, drift: true, ..idle() };
        for _ in 0..500 {
            dyn_.update(&mut state, &profile, &hard_left, DT);
            assert!(state.lateral_position >= -4.2 && state.lateral_position <= 4.2);
        }
        assert_eq!(state.lateral_position, -4.2);

        let hard_right = InputSnapshot { steer_right: true, ..idle() };
        for _ in 0..500 {
            dyn_.update(&mut state, &profile, &hard_right, DT);
            assert!(state.lateral_position >= -4.2 && state.lateral_position <= 4.2);
        }
        assert_eq!(state.lateral_position, 4.2);
    }

    #[test]
    fn opposite_steering_cancels() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState { lateral_velocity: 0.1, ..VehicleState::new() };
        let mut reference = state;
        let both = InputSnapshot { steer_left: true, steer_right: true, ..idle() };
        dyn_.update(&mut state, &profile, &both, DT);
        dyn_.update(&mut reference, &profile, &idle(), DT);
        assert!(approx(state.lateral_velocity, reference.lateral_velocity));
        assert!(approx(state.lateral_position, reference.lateral_position));
    }

    #[test]
    fn steering_applies_handling_then_grip_damping() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState::new();
        let right = InputSnapshot { steer_right: true, ..idle() };
        dyn_.update(&mut state, &profile, &right, DT);
        assert!(approx(state.lateral_velocity, 0.04 * 0.85));
        assert!(approx(state.lateral_position, 0.04 * 0.85));
        assert!(!state.is_drifting);
    }

    #[test]
    fn drifting_steers_harder_and_bleeds_speed() {
        let dyn_ = dynamics();
        let profile = audi();
        let mut state = VehicleState { forward_speed: 0.3, ..VehicleState::new() };
        let drift_left = InputSnapshot { steer_left: true, drift: true, ..idle() };
        dyn_.update(&mut state, &profile, &drift_left, DT);
        assert!(state.is_drifting);
        assert!(approx(state.lateral_velocity, -0.04 * 1.4 * 0.975));
        assert!(approx(state.forward_speed, (0.3 + 0.012) * 0.96));
    }

    #[test]
    fn zero_delta_leaves_a_parked_car_untouched() {
        let dyn_ = dynamics();
        let profile = VehicleProfile { max_speed: 0.0, ..audi() };
        let mut state = VehicleState::new();
        let before = state;
        dyn_.update(&mut state, &profile, &idle(), 0.0);
        assert_eq!(state, before);
    }

    #[test]
    fn zero_delta_does_not_advance_nitro_timers() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Active { timer: 1.0 };
        dyn_.advance_nitro(&mut nitro, false, 0.0);
        assert_eq!(nitro, Nitro::Active { timer: 1.0 });

        let mut nitro = Nitro::Cooldown { remaining: 2.0 };
        dyn_.advance_nitro(&mut nitro, false, 0.0);
        assert_eq!(nitro, Nitro::Cooldown { remaining: 2.0 });
    }

    #[test]
    fn per_frame_constants_ignore_delta() {
        let dyn_ = dynamics();
        let profile = audi();
        let input = InputSnapshot { steer_left: true, ..idle() };
        let mut fast = VehicleState::new();
        let mut slow = VehicleState::new();
        dyn_.update(&mut fast, &profile, &input, 1.0 / 144.0);
        dyn_.update(&mut slow, &profile, &input, 1.0 / 30.0);
        assert_eq!(fast.forward_speed, slow.forward_speed);
        assert_eq!(fast.lateral_velocity, slow.lateral_velocity);
    }

    #[test]
    fn scaled_mode_matches_per_frame_at_reference_rate() {
        let per_frame = dynamics();
        let scaled = VehicleDynamics::new(DynamicsConfig {
            frame_rate: FrameRateMode::Scaled { reference_hz: 60.0 },
            ..DynamicsConfig::default()
        });
        let profile = audi();
        let input = InputSnapshot { steer_right: true, ..idle() };
        let mut a = VehicleState::new();
        let mut b = VehicleState::new();
        for _ in 0..30 {
            per_frame.update(&mut a, &profile, &input, DT);
            scaled.update(&mut b, &profile, &input, DT);
        }
        assert!(approx(a.forward_speed, b.forward_speed));
        assert!(approx(a.lateral_velocity, b.lateral_velocity));
        assert!(approx(a.lateral_position, b.lateral_position));
    }

    #[test]
    fn scaled_mode_with_zero_delta_freezes_motion() {
        let scaled = VehicleDynamics::new(DynamicsConfig {
            frame_rate: FrameRateMode::Scaled { reference_hz: 60.0 },
            ..DynamicsConfig::default()
        });
        let mut state = VehicleState { forward_speed: 0.3, lateral_velocity: 0.05, ..VehicleState::new() };
        let before = state;
        let input = InputSnapshot { steer_left: true, ..idle() };
        scaled.update(&mut state, &audi(), &input, 0.0);
        assert_eq!(state.forward_speed, before.forward_speed);
        assert_eq!(state.lateral_velocity, before.lateral_velocity);
        assert_eq!(state.lateral_position, before.lateral_position);
    }

    #[test]
    fn nitro_cycles_ready_active_cooldown_ready() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Ready;
        let mut phases = vec![nitro.phase()];
        dyn_.advance_nitro(&mut nitro, true, 0.25);
        for _ in 0..40 {
            // keep requesting: must not interrupt or re-trigger
            dyn_.advance_nitro(&mut nitro, true, 0.25);
            if phases.last() != Some(&nitro.phase()) {
                phases.push(nitro.phase());
            }
            if nitro.is_ready() {
                break;
            }
        }
        assert_eq!(
            phases,
            vec![NitroPhase::Ready, NitroPhase::Active, NitroPhase::Cooldown, NitroPhase::Ready]
        );
    }

    #[test]
    fn activation_frame_already_consumes_delta() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Ready;
        dyn_.advance_nitro(&mut nitro, true, 0.5);
        assert_eq!(nitro, Nitro::Active { timer: 1.5 });
    }

    #[test]
    fn cooldown_is_entered_at_full_length() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Active { timer: 0.1 };
        dyn_.advance_nitro(&mut nitro, false, 0.5);
        assert_eq!(nitro, Nitro::Cooldown { remaining: 5.0 });
    }

    #[test]
    fn cooldown_reports_exactly_zero_once_ready() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Cooldown { remaining: 0.05 };
        dyn_.advance_nitro(&mut nitro, false, 0.1);
        assert_eq!(nitro, Nitro::Ready);
        assert_eq!(nitro.cooldown(), 0.0);
    }

    #[test]
    fn nitro_request_ignored_while_cooling_down() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Cooldown { remaining: 3.0 };
        dyn_.advance_nitro(&mut nitro, true, 1.0);
        assert_eq!(nitro, Nitro::Cooldown { remaining: 2.0 });
    }

    #[test]
    fn cooldown_after_two_point_one_seconds() {
        let dyn_ = dynamics();
        let mut nitro = Nitro::Ready;
        // press at t = 0
        dyn_.advance_nitro(&mut nitro, true, 0.0);
        assert_eq!(nitro, Nitro::Active { timer: 2.0 });
        for _ in 0..4 {
            dyn_.advance_nitro(&mut nitro, false, 0.5);
        }
        assert!(matches!(nitro, Nitro::Cooldown { .. }));
        dyn_.advance_nitro(&mut nitro, false, 0.1);
        assert!(approx(nitro.cooldown(), 4.9), "cooldown {}", nitro.cooldown());
    }
}
