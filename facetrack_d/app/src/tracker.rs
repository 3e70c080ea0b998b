//! Lifecycle controller consumed by the experiment runner.

use api::{BackendKind, FaceMeshOptions, LandmarkerOptions, TickId, TrackingResult, VideoSource};
use common::{
    decompose, InitOptions, ListenerId, RecordingOptions, ResultFanout, ResultListener,
    SessionRecorder, StaleResultPolicy,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::backend::legacy::LegacyAdapter;
use crate::backend::modern::ModernAdapter;
use crate::backend::{BackendAdapter, Detection, DetectionAdapter};
use crate::error::TrackerError;
use crate::provider::EngineProvider;
use crate::scheduler::{FrameScheduler, SchedulerState};

/// State of one tracking session, created by `initialize`.
#[derive(Debug)]
pub struct Session {
    pub active_backend: BackendKind,
    pub full_tracking: bool,
    pub recorder: SessionRecorder,
}

/// What `finish` hands back to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingReport {
    pub tracking_log: Vec<TrackingResult>,
}

pub struct FaceTracker {
    // Engines and the stream may come from the provider's library, so they
    // are declared (and dropped) before it.
    backend: Option<BackendAdapter>,
    scheduler: FrameScheduler,
    session: Option<Session>,
    fanout: ResultFanout,
    stale_policy: StaleResultPolicy,
    log_cap: Option<usize>,
    provider: Box<dyn EngineProvider>,
}

impl FaceTracker {
    pub fn new(provider: impl EngineProvider + 'static) -> Self {
        Self {
            backend: None,
            scheduler: FrameScheduler::new(),
            session: None,
            fanout: ResultFanout::new(),
            stale_policy: StaleResultPolicy::default(),
            log_cap: None,
            provider: Box::new(provider),
        }
    }

    pub fn with_stale_policy(mut self, policy: StaleResultPolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Cap the number of results recorded per session.
    pub fn with_log_cap(mut self, cap: Option<usize>) -> Self {
        self.log_cap = cap;
        self
    }

    /// Create and configure the backend chosen by `options`. Must complete
    /// before `start`. A failure leaves the tracker uninitialized; nothing
    /// is retried.
    pub async fn initialize(&mut self, options: InitOptions) -> Result<(), TrackerError> {
        if let Some(backend) = &self.backend {
            return Err(TrackerError::AlreadyInitialized(backend.kind()));
        }

        let kind = options.backend();
        let asset_base = options.asset_location_override.as_deref();
        info!(
            "Initializing {:?} backend (full tracking: {})",
            kind, options.use_full_tracking
        );

        let backend = match kind {
            BackendKind::Legacy => {
                let engine_options = FaceMeshOptions {
                    asset_base: asset_base.map(str::to_string),
                    ..Default::default()
                };
                let engine = self
                    .provider
                    .load_face_mesh(&engine_options)
                    .await
                    .map_err(|e| TrackerError::initialization(kind, e))?;
                let mut adapter = LegacyAdapter::new(engine);
                adapter
                    .configure(&engine_options)
                    .map_err(|e| TrackerError::initialization(kind, e))?;
                BackendAdapter::Legacy(adapter)
            }
            BackendKind::Modern => {
                let engine_options =
                    LandmarkerOptions::new(asset_base, options.wants_blendshapes());
                let engine = self
                    .provider
                    .load_face_landmarker(&engine_options)
                    .await
                    .map_err(|e| TrackerError::initialization(kind, e))?;
                let mut adapter = ModernAdapter::new(engine);
                adapter
                    .configure(&engine_options)
                    .map_err(|e| TrackerError::initialization(kind, e))?;
                BackendAdapter::Modern(adapter)
            }
        };

        self.backend = Some(backend);
        self.session = Some(Session {
            active_backend: kind,
            full_tracking: options.use_full_tracking,
            recorder: SessionRecorder::new(self.log_cap),
        });
        info!("✓ {:?} backend ready", kind);
        Ok(())
    }

    /// Start capturing from the host's camera stream. A missing stream is
    /// not an error: the tracker stays idle and `finish` reports nothing.
    pub fn start(&mut self, stream: Option<Box<dyn VideoSource>>) -> Result<(), TrackerError> {
        let backend = self.backend.as_mut().ok_or(TrackerError::NotInitialized)?;
        backend.bind_results();
        self.scheduler.start(stream);
        Ok(())
    }

    /// Forward the stream's metadata-ready notification.
    pub fn stream_ready(&mut self) {
        self.scheduler.stream_ready();
    }

    /// Reset the log and arm recording for the upcoming trial.
    pub fn configure_recording(&mut self, options: RecordingOptions) -> Result<(), TrackerError> {
        let session = self.session.as_mut().ok_or(TrackerError::NotInitialized)?;
        session.recorder.reset(options.record);
        debug!("Recording {}", if options.record { "on" } else { "off" });
        Ok(())
    }

    /// The tick the host should deliver on its next display refresh.
    pub fn pending_tick(&self) -> Option<TickId> {
        self.scheduler.pending_tick()
    }

    /// Display refresh callback. Runs one capture, detect and emit cycle if
    /// `tick` is still the outstanding request.
    pub fn on_refresh(&mut self, tick: TickId, timestamp_ms: f64) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        let fanout = &mut self.fanout;
        let session = &mut self.session;

        self.scheduler.run_tick(tick, |frame_id, frame| {
            match backend.detect_on_frame(frame, timestamp_ms) {
                Ok(Some(detection)) => {
                    emit(fanout, session, assemble(frame_id, detection));
                }
                Ok(None) => {}
                Err(e) => warn!("Detection failed on tick {}: {:#}", frame_id, e),
            }
        })
    }

    /// Stop capturing and hand the recorded log to the host. Callable at
    /// any point, including before `start` or twice in a row.
    pub fn finish(&mut self) -> TrackingReport {
        self.scheduler.stop();

        if let Some(backend) = self.backend.as_mut() {
            if let Some(detection) = backend.take_pending() {
                match self.stale_policy {
                    StaleResultPolicy::Deliver => {
                        let frame_id = self.scheduler.reserve_tick();
                        debug!("Delivering result that arrived after stop as tick {}", frame_id);
                        emit(
                            &mut self.fanout,
                            &mut self.session,
                            assemble(frame_id, detection),
                        );
                    }
                    StaleResultPolicy::Drop => debug!("Dropping result that arrived after stop"),
                }
            }
        }

        let tracking_log = match self.session.as_mut() {
            Some(session) => {
                session.recorder.stop_recording();
                session.recorder.drain()
            }
            None => Vec::new(),
        };
        info!("Session finished with {} recorded results", tracking_log.len());
        TrackingReport { tracking_log }
    }

    pub fn register_result_listener(&mut self, listener: ResultListener) -> ListenerId {
        self.fanout.register(listener)
    }

    /// Returns whether the listener was registered. Unknown ids are ignored.
    pub fn unregister_result_listener(&mut self, id: ListenerId) -> bool {
        self.fanout.unregister(id)
    }

    pub fn active_media_stream(&self) -> Option<&dyn VideoSource> {
        self.scheduler.stream()
    }

    pub fn active_backend(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(BackendAdapter::kind)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }
}

/// Build the normalized record for one detection.
fn assemble(frame_id: TickId, detection: Detection) -> TrackingResult {
    let mut result = TrackingResult {
        blendshapes: detection.blendshapes,
        ..TrackingResult::empty(frame_id)
    };

    if let Some(matrix) = detection.transformation {
        match decompose(&matrix) {
            Some(pose) => {
                result.transformation = Some(matrix);
                result.rotation = Some(pose.rotation);
                result.translation = Some(pose.translation);
            }
            None => debug!("Discarding degenerate transform on tick {}", frame_id),
        }
    }
    result
}

fn emit(fanout: &mut ResultFanout, session: &mut Option<Session>, result: TrackingResult) {
    fanout.deliver(&result);
    if let Some(session) = session {
        session.recorder.append(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::Blendshape;

    #[test]
    fn assemble_without_transform_omits_pose() {
        let result = assemble(5, Detection::default());
        assert_eq!(result, TrackingResult::empty(5));
    }

    #[test]
    fn assemble_decomposes_transform() {
        let matrix = glam::Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -40.0)).to_cols_array();
        let result = assemble(
            2,
            Detection {
                transformation: Some(matrix),
                blendshapes: Some(vec![Blendshape::new("jawOpen", 0.8)]),
            },
        );

        assert_eq!(result.transformation, Some(matrix));
        assert_eq!(result.translation, Some(glam::Vec3::new(0.0, 0.0, -40.0)));
        assert!(result.rotation.is_some());
        assert_eq!(result.blendshapes.unwrap()[0].name, "jawOpen");
    }

    #[test]
    fn assemble_drops_degenerate_transform_entirely() {
        let result = assemble(
            3,
            Detection {
                transformation: Some([0.0; 16]),
                blendshapes: None,
            },
        );
        assert!(result.transformation.is_none());
        assert!(result.rotation.is_none());
        assert!(result.translation.is_none());
    }
}
