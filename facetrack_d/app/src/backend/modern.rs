use anyhow::{Context, Result};
use api::{Blendshape, FaceLandmarkerEngine, FaceLandmarkerResult, LandmarkerOptions, RasterFrame};

use super::{packed_matrix, Detection, DetectionAdapter};

/// Face landmarker behind the per-tick contract. Detection runs inline on
/// the tick, so every tick yields a detection, with or without a face.
pub struct ModernAdapter {
    engine: Box<dyn FaceLandmarkerEngine>,
    blendshapes: bool,
}

impl ModernAdapter {
    pub fn new(engine: Box<dyn FaceLandmarkerEngine>) -> Self {
        Self {
            engine,
            blendshapes: false,
        }
    }

    pub fn configure(&mut self, options: &LandmarkerOptions) -> Result<()> {
        self.engine
            .configure(options)
            .context("Face landmarker rejected its options")?;
        self.blendshapes = options.output_face_blendshapes;
        Ok(())
    }

    fn normalize(&self, result: FaceLandmarkerResult) -> Detection {
        let transformation = result
            .facial_transformation_matrixes
            .first()
            .and_then(|m| packed_matrix(&m.data));

        let blendshapes = if self.blendshapes {
            result.face_blendshapes.into_iter().next().map(|face| {
                face.categories
                    .into_iter()
                    .map(|c| Blendshape::new(c.category_name, c.score))
                    .collect()
            })
        } else {
            None
        };

        Detection {
            transformation,
            blendshapes,
        }
    }
}

impl DetectionAdapter for ModernAdapter {
    fn detect_on_frame(
        &mut self,
        frame: &RasterFrame,
        timestamp_ms: f64,
    ) -> Result<Option<Detection>> {
        let result = self
            .engine
            .detect_for_video(frame, timestamp_ms)
            .context("Face landmarker detection failed")?;
        Ok(Some(self.normalize(result)))
    }
}

impl Drop for ModernAdapter {
    fn drop(&mut self) {
        self.engine.close();
    }
}
