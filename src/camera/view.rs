use glamx::Vec3;
use serde::{Deserialize, Serialize};

/// A named viewpoint: where the camera stands and what it looks at.
///
/// Views are authored in page markup (`data-camera-position`) or produced by scroll
/// progress. Both vectors deserialize from either `[x, y, z]` or `{ "x": .., "y": .., "z": .. }`.
///
/// ```
/// # use showroom::camera::CameraView;
/// let view: CameraView =
///     serde_json::from_str(r#"{ "position": [0, 2, 8], "target": { "x": 0, "y": 1, "z": 0 } }"#)
///         .unwrap();
/// assert_eq!(view.position.z, 8.0);
/// assert_eq!(view.target.y, 1.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    #[serde(with = "xyz")]
    pub position: Vec3,
    #[serde(with = "xyz", default)]
    pub target: Vec3,
}

impl CameraView {
    /// A view from `position` towards `target`.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        CameraView { position, target }
    }

    /// Distance between the eye and the target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

mod xyz {
    use glamx::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Array([f32; 3]),
        Object {
            #[serde(default)]
            x: f32,
            #[serde(default)]
            y: f32,
            #[serde(default)]
            z: f32,
        },
    }

    pub fn serialize<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        Repr::Object {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Array(a) => Vec3::from(a),
            Repr::Object { x, y, z } => Vec3::new(x, y, z),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_is_the_origin() {
        let view: CameraView = serde_json::from_str(r#"{ "position": [3, 4, 0] }"#).unwrap();
        assert_eq!(view.target, Vec3::ZERO);
        assert_eq!(view.distance(), 5.0);
    }

    #[test]
    fn serializes_as_objects() {
        let view = CameraView::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains(r#""x":1.0"#));
        let back: CameraView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
