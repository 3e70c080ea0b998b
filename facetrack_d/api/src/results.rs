//! Raw result shapes as the engines report them, before normalization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceGeometry {
    /// Pose transform, packed column-major.
    pub pose_transform_matrix: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMeshResults {
    #[serde(default)]
    pub multi_face_geometry: Vec<FaceGeometry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub index: i32,
    pub score: f32,
    pub category_name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classifications {
    pub categories: Vec<Category>,
    #[serde(default)]
    pub head_index: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformMatrix {
    pub rows: u32,
    pub columns: u32,
    /// Column-major values.
    pub data: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarkerResult {
    #[serde(default)]
    pub face_landmarks: Vec<Vec<NormalizedLandmark>>,
    #[serde(default)]
    pub face_blendshapes: Vec<Classifications>,
    #[serde(default)]
    pub facial_transformation_matrixes: Vec<TransformMatrix>,
}
