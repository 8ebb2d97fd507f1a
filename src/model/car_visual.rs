use glam::{Quat, Vec3};

use super::profile::CarType;
use super::scene::{Color, Part, Primitive, Transform, Visual};

const TRIM: u32 = 0x111111;
const TIRE: u32 = 0x000000;

const WHEEL_RADIUS: f32 = 0.28;
const WHEEL_WIDTH: f32 = 0.35;
const WHEEL_SEGMENTS: u32 = 12;
const WHEEL_OFFSETS: [(f32, f32); 4] = [(0.7, 1.05), (-0.7, 1.05), (0.7, -1.05), (-0.7, -1.05)];

/// Body, cabin, four wheels and a small spoiler, relative to the car origin.
pub fn car_visual(car: CarType) -> Visual {
    let trim = Color::from_hex(TRIM);

    let mut parts = vec![
        // body
        Part::cuboid(Vec3::new(1.4, 0.5, 2.6), Color::from_hex(car.body_color()), Vec3::new(0.0, 0.5, 0.0)),
        // cabin
        Part::cuboid(Vec3::new(1.0, 0.38, 1.2), trim, Vec3::new(0.0, 0.88, -0.15)),
    ];

    // Cylinders stand on Y; roll them onto their side
    let wheel_roll = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    parts.extend(WHEEL_OFFSETS.iter().map(|&(x, z)| Part {
        primitive: Primitive::Cylinder {
            radius: WHEEL_RADIUS,
            height: WHEEL_WIDTH,
            segments: WHEEL_SEGMENTS,
        },
        color: Color::from_hex(TIRE),
        local: Transform::from_position(Vec3::new(x, 0.25, z)).with_rotation(wheel_roll),
    }));

    // spoiler
    parts.push(Part::cuboid(Vec3::new(0.8, 0.05, 0.15), trim, Vec3::new(0.0, 0.75, 1.1)));

    Visual { parts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_car_has_seven_parts() {
        for car in CarType::ALL {
            let visual = car_visual(car);
            assert_eq!(visual.parts.len(), 7);
            let wheels = visual
                .parts
                .iter()
                .filter(|p| matches!(p.primitive, Primitive::Cylinder { .. }))
                .count();
            assert_eq!(wheels, 4);
        }
    }

    #[test]
    fn only_body_color_differs_between_cars() {
        let audi = car_visual(CarType::Audi);
        let ferrari = car_visual(CarType::Ferrari);
        assert_ne!(audi.parts[0].color, ferrari.parts[0].color);
        assert_eq!(audi.parts[1..], ferrari.parts[1..]);
    }

    #[test]
    fn wheels_lie_on_their_side() {
        let visual = car_visual(CarType::Mercedes);
        for part in visual.parts.iter().filter(|p| matches!(p.primitive, Primitive::Cylinder { .. })) {
            let axis = part.local.rotation * Vec3::Y;
            assert!(axis.y.abs() < 1e-6, "wheel axle should be horizontal");
        }
    }
}
