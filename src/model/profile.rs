use std::fmt;

/// Selectable car types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CarType {
    #[default]
    Audi,
    Bugatti,
    Ferrari,
    Mercedes,
}

/// Fixed tuning parameters for one car type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleProfile {
    pub max_speed: f32,
    pub acceleration: f32,
    pub handling: f32,
    /// Forward speed multiplier applied every frame while drifting (< 1)
    pub drift_factor: f32,
    /// Max speed multiplier while nitro is active
    pub nitro_boost: f32,
}

impl CarType {
    pub const ALL: [CarType; 4] = [CarType::Audi, CarType::Bugatti, CarType::Ferrari, CarType::Mercedes];

    /// Parse a car identifier as sent by the selection menu.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "audi" => Some(CarType::Audi),
            "bugatti" => Some(CarType::Bugatti),
            "ferrari" => Some(CarType::Ferrari),
            "mercedes" => Some(CarType::Mercedes),
            _ => None,
        }
    }

    /// Like [`CarType::from_id`], but unknown identifiers select the default car.
    pub fn from_id_or_default(id: &str) -> Self {
        Self::from_id(id).unwrap_or_else(|| {
            tracing::warn!(car_id = id, "unknown car id, falling back to {}", CarType::default());
            CarType::default()
        })
    }

    pub fn id(&self) -> &'static str {
        match self {
            CarType::Audi => "audi",
            CarType::Bugatti => "bugatti",
            CarType::Ferrari => "ferrari",
            CarType::Mercedes => "mercedes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CarType::Audi => "Audi",
            CarType::Bugatti => "Bugatti",
            CarType::Ferrari => "Ferrari",
            CarType::Mercedes => "Mercedes",
        }
    }

    pub fn profile(&self) -> VehicleProfile {
        match self {
            CarType::Audi => VehicleProfile {
                max_speed: 0.55,
                acceleration: 0.012,
                handling: 0.04,
                drift_factor: 0.96,
                nitro_boost: 1.7,
            },
            CarType::Bugatti => VehicleProfile {
                max_speed: 0.85,
                acceleration: 0.016,
                handling: 0.035,
                drift_factor: 0.93,
                nitro_boost: 1.9,
            },
            CarType::Ferrari => VehicleProfile {
                max_speed: 0.75,
                acceleration: 0.015,
                handling: 0.045,
                drift_factor: 0.94,
                nitro_boost: 1.8,
            },
            CarType::Mercedes => VehicleProfile {
                max_speed: 0.65,
                acceleration: 0.013,
                handling: 0.05,
                drift_factor: 0.97,
                nitro_boost: 1.6,
            },
        }
    }

    /// Body paint as 0xRRGGBB
    pub fn body_color(&self) -> u32 {
        match self {
            CarType::Audi => 0x3b82f6,
            CarType::Bugatti => 0xf97316,
            CarType::Ferrari => 0xef4444,
            CarType::Mercedes => 0x9ca3af,
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl VehicleProfile {
    /// Top speed reachable with nitro engaged
    pub fn boosted_max_speed(&self) -> f32 {
        self.max_speed * self.nitro_boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_for_every_car() {
        for car in CarType::ALL {
            assert_eq!(CarType::from_id(car.id()), Some(car));
        }
    }

    #[test]
    fn ids_are_case_insensitive() {
        assert_eq!(CarType::from_id("Ferrari"), Some(CarType::Ferrari));
        assert_eq!(CarType::from_id(" BUGATTI "), Some(CarType::Bugatti));
    }

    #[test]
    fn unknown_id_falls_back_to_audi() {
        assert_eq!(CarType::from_id("lada"), None);
        assert_eq!(CarType::from_id_or_default("lada"), CarType::Audi);
        assert_eq!(CarType::from_id_or_default(""), CarType::Audi);
    }

    #[test]
    fn profiles_are_positive_and_drift_penalizes() {
        for car in CarType::ALL {
            let p = car.profile();
            assert!(p.max_speed > 0.0 && p.acceleration > 0.0 && p.handling > 0.0);
            assert!(p.drift_factor > 0.0 && p.drift_factor < 1.0, "{car}: drift must slow the car");
            assert!(p.nitro_boost > 1.0);
            assert!(p.boosted_max_speed() > p.max_speed);
        }
    }
}
