use std::collections::BTreeMap;

use glam::{Quat, Vec3};

/// Linear RGB color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    /// Convert an sRGB 0xRRGGBB value to linear space
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| {
            let c = ((hex >> shift) & 0xff) as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Color([channel(16), channel(8), channel(0)])
    }

    pub fn to_array4(self) -> [f32; 4] {
        [self.0[0], self.0[1], self.0[2], 1.0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self { position: Vec3::ZERO, rotation: Quat::IDENTITY };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Geometry of a single part, centered on its local origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Cuboid { size: Vec3 },
    /// Axis along local Y
    Cylinder { radius: f32, height: f32, segments: u32 },
}

/// One colored primitive placed inside an object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub primitive: Primitive,
    pub color: Color,
    pub local: Transform,
}

impl Part {
    pub fn cuboid(size: Vec3, color: Color, offset: Vec3) -> Self {
        Self {
            primitive: Primitive::Cuboid { size },
            color,
            local: Transform::from_position(offset),
        }
    }
}

/// A group of parts that moves as a unit
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visual {
    pub parts: Vec<Part>,
}

impl Visual {
    pub fn single(part: Part) -> Self {
        Self { parts: vec![part] }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

pub struct SceneObject {
    pub visual: Visual,
    pub transform: Transform,
}

#[derive(Clone, Copy, Debug)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    /// Position the light shines from, toward the origin
    pub position: Vec3,
    pub intensity: f32,
    pub ambient: f32,
}

impl DirectionalLight {
    /// Unit vector from the scene toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Y)
    }
}

/// Scene graph handed to the renderer every frame.
///
/// Object ids are never reused, so the renderer can tell a replaced object
/// from a moved one.
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    pub sky: Color,
    pub fog: Fog,
    pub light: DirectionalLight,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let sky = Color::from_hex(0x87ceeb);
        Self {
            objects: BTreeMap::new(),
            next_id: 0,
            sky,
            fog: Fog { color: sky, near: 5.0, far: 120.0 },
            light: DirectionalLight {
                position: Vec3::new(5.0, 10.0, 5.0),
                intensity: 1.0,
                ambient: 0.35,
            },
        }
    }

    pub fn add(&mut self, visual: Visual, transform: Transform) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, SceneObject { visual, transform });
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Returns false if the object no longer exists
    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.transform.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_rotation(&mut self, id: ObjectId, rotation: Quat) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
