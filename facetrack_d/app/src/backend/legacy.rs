use anyhow::{Context, Result};
use api::{FaceMeshEngine, FaceMeshOptions, FaceMeshResults, RasterFrame};
use log::{debug, trace};
use std::sync::mpsc::{sync_channel, Receiver, TrySendError};

use super::{packed_matrix, Detection, DetectionAdapter};

/// Face mesh engine behind the per-tick contract.
///
/// The engine pushes results through its handler, possibly from another
/// thread and possibly long after the frame was sent. The handler writes
/// into a single-slot channel that each tick drains; a result arriving
/// while the slot is still full is dropped.
///
/// A tick reports whatever is in the slot when it runs, so a result is
/// stamped with the tick that collected it. That is usually the tick after
/// the one whose frame produced it; consumers lining up `frameId` with
/// captured frames should expect that lag.
pub struct LegacyAdapter {
    engine: Box<dyn FaceMeshEngine>,
    slot: Option<Receiver<FaceMeshResults>>,
}

impl LegacyAdapter {
    pub fn new(engine: Box<dyn FaceMeshEngine>) -> Self {
        Self { engine, slot: None }
    }

    pub fn configure(&mut self, options: &FaceMeshOptions) -> Result<()> {
        self.engine
            .configure(options)
            .context("Face mesh engine rejected its options")
    }

    /// Install a fresh result handler. The previous slot, and anything in
    /// it, is dropped; handlers still holding the old sender fail silently.
    pub fn bind_results(&mut self) {
        let (tx, rx) = sync_channel::<FaceMeshResults>(1);
        self.engine.on_results(Box::new(move |results| {
            match tx.try_send(results) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => trace!("Face mesh result dropped, slot full"),
                Err(TrySendError::Disconnected(_)) => {
                    trace!("Face mesh result arrived after the session ended")
                }
            }
        }));
        self.slot = Some(rx);
    }

    fn normalize(results: FaceMeshResults) -> Detection {
        let transformation = results
            .multi_face_geometry
            .first()
            .and_then(|geometry| packed_matrix(&geometry.pose_transform_matrix));
        if transformation.is_none() {
            debug!("Face mesh result without usable face geometry");
        }
        Detection {
            transformation,
            blendshapes: None,
        }
    }
}

impl DetectionAdapter for LegacyAdapter {
    fn detect_on_frame(
        &mut self,
        frame: &RasterFrame,
        _timestamp_ms: f64,
    ) -> Result<Option<Detection>> {
        self.engine
            .send(frame)
            .context("Failed to submit frame to face mesh engine")?;
        Ok(self.take_pending())
    }

    fn take_pending(&mut self) -> Option<Detection> {
        let results = self.slot.as_ref()?.try_recv().ok()?;
        Some(Self::normalize(results))
    }
}

impl Drop for LegacyAdapter {
    fn drop(&mut self) {
        self.engine.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{FaceGeometry, FaceMeshResultHandler};
    use std::sync::{Arc, Mutex};

    /// Holds the handler so the test decides when results arrive.
    #[derive(Default, Clone)]
    struct ManualFaceMesh {
        handler: Arc<Mutex<Option<FaceMeshResultHandler>>>,
        sent: Arc<Mutex<usize>>,
    }

    impl ManualFaceMesh {
        fn push(&self, results: FaceMeshResults) {
            if let Some(handler) = self.handler.lock().unwrap().as_mut() {
                handler(results);
            }
        }
    }

    impl FaceMeshEngine for ManualFaceMesh {
        fn configure(&mut self, _options: &FaceMeshOptions) -> Result<()> {
            Ok(())
        }

        fn on_results(&mut self, handler: FaceMeshResultHandler) {
            *self.handler.lock().unwrap() = Some(handler);
        }

        fn send(&mut self, _frame: &RasterFrame) -> Result<()> {
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn geometry(matrix: Vec<f32>) -> FaceMeshResults {
        FaceMeshResults {
            multi_face_geometry: vec![FaceGeometry {
                pose_transform_matrix: matrix,
            }],
        }
    }

    fn identity() -> Vec<f32> {
        glam::Mat4::IDENTITY.to_cols_array().to_vec()
    }

    #[test]
    fn tick_without_pushed_result_yields_nothing() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();

        let frame = RasterFrame::new();
        assert!(adapter.detect_on_frame(&frame, 0.0).unwrap().is_none());
        assert_eq!(*engine.sent.lock().unwrap(), 1);
    }

    #[test]
    fn pushed_result_is_collected_by_next_tick() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();

        engine.push(geometry(identity()));

        let detection = adapter
            .detect_on_frame(&RasterFrame::new(), 0.0)
            .unwrap()
            .unwrap();
        assert_eq!(detection.transformation.unwrap().len(), 16);
        assert!(detection.blendshapes.is_none());
    }

    #[test]
    fn slot_holds_one_result() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();

        let mut first = identity();
        first[12] = 1.0;
        let mut second = identity();
        second[12] = 2.0;
        engine.push(geometry(first));
        engine.push(geometry(second));

        let detection = adapter.take_pending().unwrap();
        assert_eq!(detection.transformation.unwrap()[12], 1.0);
        assert!(adapter.take_pending().is_none());
    }

    #[test]
    fn missing_geometry_is_a_detection_without_pose() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();

        engine.push(FaceMeshResults::default());

        let detection = adapter.take_pending().unwrap();
        assert!(detection.transformation.is_none());
    }

    #[test]
    fn rebinding_discards_queued_result() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();
        engine.push(geometry(identity()));

        adapter.bind_results();
        assert!(adapter.take_pending().is_none());
    }

    #[test]
    fn results_after_adapter_is_gone_are_ignored() {
        let engine = ManualFaceMesh::default();
        let mut adapter = LegacyAdapter::new(Box::new(engine.clone()));
        adapter.bind_results();
        drop(adapter);

        engine.push(geometry(identity()));
    }
}
