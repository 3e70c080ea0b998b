mod engine;
mod frame;
mod logger;
mod results;

pub use engine::{
    Delegate, FaceLandmarkerEngine, FaceMeshEngine, FaceMeshOptions, FaceMeshResultHandler,
    LandmarkerOptions, RunningMode, VideoSource, DEFAULT_ASSET_BASE, DEFAULT_WASM_BASE,
    LANDMARKER_MODEL_FILE,
};
pub use frame::{RasterFrame, FRAME_HEIGHT, FRAME_WIDTH};
pub use logger::{LogCallback, LogLevel, ModuleLogger};
pub use results::{
    Category, Classifications, FaceGeometry, FaceLandmarkerResult, FaceMeshResults,
    NormalizedLandmark, TransformMatrix,
};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of one scheduler tick. Monotonic for the lifetime of a tracker.
pub type TickId = u64;

/// Number of values in a packed 4x4 transformation matrix.
pub const MATRIX_LEN: usize = 16;

/// Which inference backend produced a session's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Face mesh with face geometry, results pushed through a handler.
    #[default]
    Legacy,
    /// Face landmarker with blendshapes, results returned per call.
    Modern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blendshape {
    pub name: String,
    pub score: f32,
}

impl Blendshape {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Backend-agnostic record produced for a tick that yielded a result.
///
/// `rotation` and `translation` are only present when `transformation` is,
/// so a missed detection never looks like a face sitting at the origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    pub frame_id: TickId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<[f32; MATRIX_LEN]>,
    /// Euler angles in radians, XYZ order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blendshapes: Option<Vec<Blendshape>>,
}

impl TrackingResult {
    pub fn empty(frame_id: TickId) -> Self {
        Self {
            frame_id,
            ..Default::default()
        }
    }

    pub fn has_pose(&self) -> bool {
        self.transformation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_value(TrackingResult::empty(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "frameId": 7 }));
    }

    #[test]
    fn blendshapes_serialize_as_name_score_pairs() {
        let result = TrackingResult {
            blendshapes: Some(vec![Blendshape::new("jawOpen", 0.8)]),
            ..TrackingResult::empty(1)
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["blendshapes"][0]["name"], "jawOpen");
        assert!((json["blendshapes"][0]["score"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn camel_case_keys_round_trip() {
        let json = r#"{"frameId":3,"rotation":[0.1,0.2,0.3],"translation":[1.0,2.0,3.0]}"#;
        let result: TrackingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.frame_id, 3);
        assert_eq!(result.translation, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert!(result.transformation.is_none());
    }
}
