use anyhow::Result;
use api::{FaceLandmarkerEngine, FaceMeshEngine, FaceMeshOptions, LandmarkerOptions};
use async_trait::async_trait;

/// Creates inference engines on demand. Loading may involve fetching model
/// assets, so it is asynchronous; configuration happens afterwards.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    async fn load_face_mesh(&self, options: &FaceMeshOptions) -> Result<Box<dyn FaceMeshEngine>>;

    async fn load_face_landmarker(
        &self,
        options: &LandmarkerOptions,
    ) -> Result<Box<dyn FaceLandmarkerEngine>>;
}
