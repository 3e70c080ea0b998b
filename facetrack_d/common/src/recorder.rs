use log::{info, warn};

use crate::TrackingResult;

/// Ordered log of the results produced while recording is on.
///
/// Unbounded unless a cap is set. Once a capped log is full, later results
/// are counted but not kept.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    log: Vec<TrackingResult>,
    recording: bool,
    cap: Option<usize>,
    dropped: usize,
}

impl SessionRecorder {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            cap,
            ..Default::default()
        }
    }

    /// Clear the log and arm (or disarm) recording for the next trial.
    pub fn reset(&mut self, recording: bool) {
        self.log.clear();
        self.dropped = 0;
        self.recording = recording;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn stop_recording(&mut self) {
        self.recording = false;
    }

    pub fn append(&mut self, result: TrackingResult) {
        if !self.recording {
            return;
        }

        if let Some(cap) = self.cap {
            if self.log.len() >= cap {
                if self.dropped == 0 {
                    warn!(
                        "Tracking log reached its cap of {} results; further results are not recorded",
                        cap
                    );
                }
                self.dropped += 1;
                return;
            }
        }

        self.log.push(result);
    }

    /// Hand over everything recorded so far, leaving the log empty.
    pub fn drain(&mut self) -> Vec<TrackingResult> {
        if self.dropped > 0 {
            info!(
                "Tracking log kept {} results, dropped {} past the cap",
                self.log.len(),
                self.dropped
            );
        }
        self.dropped = 0;
        std::mem::take(&mut self.log)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
