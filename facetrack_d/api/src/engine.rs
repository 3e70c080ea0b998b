//! Contracts for the inference engines and the camera stream.
//!
//! Engines are black boxes supplied by the host. The face mesh engine pushes
//! its results through a handler at some later point; the face landmarker
//! answers each call directly.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{FaceLandmarkerResult, FaceMeshResults, RasterFrame};

pub const DEFAULT_ASSET_BASE: &str =
    "https://storage.googleapis.com/mediapipe-models/face_landmarker/face_landmarker/float16/1";
pub const DEFAULT_WASM_BASE: &str =
    "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@latest/wasm";
pub const LANDMARKER_MODEL_FILE: &str = "face_landmarker.task";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMeshOptions {
    pub max_num_faces: u32,
    pub enable_face_geometry: bool,
    pub refine_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Where the engine should fetch its assets from. `None` keeps the
    /// engine's own default.
    pub asset_base: Option<String>,
}

impl Default for FaceMeshOptions {
    fn default() -> Self {
        Self {
            max_num_faces: 1,
            enable_face_geometry: true,
            refine_landmarks: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            asset_base: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunningMode {
    Image,
    #[default]
    Video,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delegate {
    Cpu,
    #[default]
    Gpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkerOptions {
    pub model_asset_path: String,
    pub wasm_base: String,
    pub delegate: Delegate,
    pub running_mode: RunningMode,
    pub num_faces: u32,
    pub output_face_blendshapes: bool,
    pub output_facial_transformation_matrixes: bool,
}

impl LandmarkerOptions {
    /// Options for a video-mode, single-face landmarker. `asset_base`
    /// overrides both the model and the runtime location.
    pub fn new(asset_base: Option<&str>, blendshapes: bool) -> Self {
        let (model_base, wasm_base) = match asset_base {
            Some(base) => (base.trim_end_matches('/'), base.trim_end_matches('/')),
            None => (DEFAULT_ASSET_BASE, DEFAULT_WASM_BASE),
        };
        Self {
            model_asset_path: format!("{}/{}", model_base, LANDMARKER_MODEL_FILE),
            wasm_base: wasm_base.to_string(),
            delegate: Delegate::default(),
            running_mode: RunningMode::Video,
            num_faces: 1,
            output_face_blendshapes: blendshapes,
            output_facial_transformation_matrixes: true,
        }
    }
}

impl Default for LandmarkerOptions {
    fn default() -> Self {
        Self::new(None, false)
    }
}

/// Receives face mesh results whenever the engine finishes a frame.
pub type FaceMeshResultHandler = Box<dyn FnMut(FaceMeshResults) + Send>;

/// Push-style engine: frames go in through `send`, results come back
/// through the handler registered with `on_results`.
pub trait FaceMeshEngine: Send {
    fn configure(&mut self, options: &FaceMeshOptions) -> Result<()>;
    fn on_results(&mut self, handler: FaceMeshResultHandler);
    fn send(&mut self, frame: &RasterFrame) -> Result<()>;
    fn close(&mut self) {}
}

/// Pull-style engine: every call returns the result for the given frame.
pub trait FaceLandmarkerEngine: Send {
    fn configure(&mut self, options: &LandmarkerOptions) -> Result<()>;
    fn detect_for_video(
        &mut self,
        frame: &RasterFrame,
        timestamp_ms: f64,
    ) -> Result<FaceLandmarkerResult>;
    fn close(&mut self) {}
}

/// A live camera stream handed over by the host.
pub trait VideoSource: Send {
    fn label(&self) -> &str;

    /// Whether the stream's metadata (dimensions, first frame) is available.
    fn is_ready(&self) -> bool;

    /// Draw the current video frame into `frame`, scaling as needed.
    fn draw_into(&mut self, frame: &mut RasterFrame) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_mesh_defaults_track_one_face_with_geometry() {
        let opts = FaceMeshOptions::default();
        assert_eq!(opts.max_num_faces, 1);
        assert!(opts.enable_face_geometry);
        assert!(!opts.refine_landmarks);
        assert_eq!(opts.min_detection_confidence, 0.5);
        assert_eq!(opts.min_tracking_confidence, 0.5);
    }

    #[test]
    fn landmarker_uses_asset_override() {
        let opts = LandmarkerOptions::new(Some("https://example.org/assets/"), true);
        assert_eq!(
            opts.model_asset_path,
            "https://example.org/assets/face_landmarker.task"
        );
        assert_eq!(opts.wasm_base, "https://example.org/assets");
        assert!(opts.output_face_blendshapes);
        assert!(opts.output_facial_transformation_matrixes);
        assert_eq!(opts.running_mode, RunningMode::Video);
    }

    #[test]
    fn landmarker_defaults_point_at_hosted_assets() {
        let opts = LandmarkerOptions::default();
        assert!(opts.model_asset_path.starts_with(DEFAULT_ASSET_BASE));
        assert_eq!(opts.wasm_base, DEFAULT_WASM_BASE);
        assert_eq!(opts.num_faces, 1);
        assert!(!opts.output_face_blendshapes);
    }
}
