// MODEL: Game state and data
pub mod profile;
pub mod vehicle;
pub mod road;
pub mod scene;
pub mod car_visual;
pub mod camera;

pub use profile::{CarType, VehicleProfile};
pub use vehicle::{Nitro, NitroPhase, VehicleState};
pub use road::RoadTrack;
pub use scene::{Color, ObjectId, Part, Primitive, Scene, SceneObject, Transform, Visual};
pub use car_visual::car_visual;
pub use camera::Camera;
