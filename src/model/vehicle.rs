use glam::Vec3;

/// Nitro boost phase.
///
/// Holding the timers inside the variants keeps the flag view consistent:
/// a boost is never both ready and active, and a running cooldown is never ready.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nitro {
    Ready,
    /// Boost engaged, `timer` seconds of boost left
    Active { timer: f32 },
    /// Recharging, `remaining` seconds until ready
    Cooldown { remaining: f32 },
}

/// Phase without its timer, for display and logging
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NitroPhase {
    Ready,
    Active,
    Cooldown,
}

impl Default for Nitro {
    fn default() -> Self {
        Nitro::Ready
    }
}

impl Nitro {
    pub fn phase(&self) -> NitroPhase {
        match self {
            Nitro::Ready => NitroPhase::Ready,
            Nitro::Active { .. } => NitroPhase::Active,
            Nitro::Cooldown { .. } => NitroPhase::Cooldown,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Nitro::Ready)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Nitro::Active { .. })
    }

    /// Boost seconds left, 0 unless active
    pub fn timer(&self) -> f32 {
        match *self {
            Nitro::Active { timer } => timer,
            _ => 0.0,
        }
    }

    /// Cooldown seconds left, 0 unless recharging
    pub fn cooldown(&self) -> f32 {
        match *self {
            Nitro::Cooldown { remaining } => remaining,
            _ => 0.0,
        }
    }
}

/// Live state of the player car
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    pub lateral_position: f32,
    pub lateral_velocity: f32,
    pub forward_speed: f32,
    pub is_drifting: bool,
    pub nitro: Nitro,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleState {
    /// Car height above the road and its fixed forward position
    pub const RIDE_HEIGHT: f32 = 0.5;
    pub const FORWARD_POSITION: f32 = 2.0;

    /// A freshly spawned car: centered, standing still, nitro ready
    pub fn new() -> Self {
        Self {
            lateral_position: 0.0,
            lateral_velocity: 0.0,
            forward_speed: 0.0,
            is_drifting: false,
            nitro: Nitro::Ready,
        }
    }

    /// World position of the car group origin
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.lateral_position, Self::RIDE_HEIGHT, Self::FORWARD_POSITION)
    }
}
