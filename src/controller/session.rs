use glam::Vec3;

use crate::config::GameConfig;
use crate::model::{
    car_visual, Camera, CarType, Color, ObjectId, Part, RoadTrack, Scene, Transform,
    VehicleProfile, VehicleState, Visual,
};
use crate::ui::HudReadout;

use super::camera_controller::CameraController;
use super::dynamics::VehicleDynamics;
use super::input::InputSnapshot;

const GROUND_COLOR: u32 = 0x1f8a3d;
const ROAD_COLOR: u32 = 0x333333;

/// The car currently driven by the player
pub struct ActiveCar {
    pub car: CarType,
    pub profile: VehicleProfile,
    pub state: VehicleState,
    object: ObjectId,
}

/// Everything one game needs between frames: the world, the car and the camera.
pub struct GameSession {
    pub config: GameConfig,
    dynamics: VehicleDynamics,
    camera_controller: CameraController,
    road: RoadTrack,
    road_objects: Vec<ObjectId>,
    scene: Scene,
    camera: Camera,
    vehicle: Option<ActiveCar>,
    /// Car selection menu visible
    pub menu_open: bool,
}

impl GameSession {
    /// Build the static world. No car is spawned yet.
    pub fn new(config: GameConfig, width: u32, height: u32) -> Self {
        let mut scene = Scene::new();

        scene.add(
            Visual::single(Part::cuboid(
                Vec3::new(400.0, 1.0, 400.0),
                Color::from_hex(GROUND_COLOR),
                Vec3::ZERO,
            )),
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
        );

        let road = RoadTrack::new(&config.road);
        let tile = Visual::single(Part::cuboid(
            Vec3::new(config.road.width, config.road.thickness, config.road.segment_length),
            Color::from_hex(ROAD_COLOR),
            Vec3::ZERO,
        ));
        let road_objects = road
            .segments()
            .iter()
            .map(|&z| scene.add(tile.clone(), Transform::from_position(Vec3::new(0.0, 0.0, z))))
            .collect();

        Self {
            dynamics: VehicleDynamics::new(config.dynamics),
            camera_controller: CameraController::new(&config.camera),
            camera: Camera::new(width, height, &config.camera),
            road,
            road_objects,
            scene,
            vehicle: None,
            menu_open: true,
            config,
        }
    }

    /// Spawn by menu identifier; unknown ids get the default car.
    pub fn spawn_car(&mut self, car_id: &str) -> CarType {
        let car = CarType::from_id_or_default(car_id);
        self.spawn(car);
        car
    }

    /// Replace the current car (if any) with a fresh one of type `car`.
    pub fn spawn(&mut self, car: CarType) {
        if let Some(old) = self.vehicle.take() {
            self.scene.remove(old.object);
        }
        let state = VehicleState::new();
        let object = self
            .scene
            .add(car_visual(car), Transform::from_position(state.world_position()));
        tracing::info!(car = %car, "car spawned");
        self.vehicle = Some(ActiveCar { car, profile: car.profile(), state, object });
    }

    /// Pick a car from the menu and close it
    pub fn select_car(&mut self, car: CarType) {
        self.spawn(car);
        self.menu_open = false;
    }

    /// Advance one frame. Does nothing until a car has been spawned.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        let Some(active) = self.vehicle.as_mut() else {
            return;
        };

        let frames = self.config.dynamics.frame_rate.frames(dt);

        // speed, steering, drift, lateral position
        self.dynamics.apply_motion(&mut active.state, &active.profile, input, dt);
        let car_pos = active.state.world_position();
        self.scene.set_position(active.object, car_pos);

        // scroll the road under the car
        self.road.advance(active.state.forward_speed * frames);
        for (&id, &z) in self.road_objects.iter().zip(self.road.segments()) {
            self.scene.set_position(id, Vec3::new(0.0, 0.0, z));
        }

        self.camera_controller.follow(&mut self.camera, car_pos, frames);

        self.dynamics.advance_nitro(&mut active.state.nitro, input.nitro, dt);
    }

    /// HUD values for the current frame, `None` before the first spawn
    pub fn hud(&self) -> Option<HudReadout> {
        self.vehicle
            .as_ref()
            .map(|active| HudReadout::project(&active.state, &self.config.hud))
    }

    /// Projection only; simulation state is untouched
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn vehicle(&self) -> Option<&ActiveCar> {
        self.vehicle.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn road(&self) -> &RoadTrack {
        &self.road
    }
}
