//! Uniform per-tick detection over the two engine styles.

pub mod legacy;
pub mod modern;

use anyhow::Result;
use api::{BackendKind, Blendshape, RasterFrame, MATRIX_LEN};
use log::debug;

use legacy::LegacyAdapter;
use modern::ModernAdapter;

/// What an engine reported for one frame, before decomposition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub transformation: Option<[f32; MATRIX_LEN]>,
    pub blendshapes: Option<Vec<Blendshape>>,
}

pub trait DetectionAdapter {
    /// Called once per tick with the freshly drawn frame. Returns a
    /// detection if one is available for this tick.
    fn detect_on_frame(&mut self, frame: &RasterFrame, timestamp_ms: f64)
        -> Result<Option<Detection>>;

    /// A detection that arrived but has not been collected by a tick yet.
    fn take_pending(&mut self) -> Option<Detection> {
        None
    }
}

pub enum BackendAdapter {
    Legacy(LegacyAdapter),
    Modern(ModernAdapter),
}

impl BackendAdapter {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Legacy(_) => BackendKind::Legacy,
            Self::Modern(_) => BackendKind::Modern,
        }
    }

    /// Route engine results to this session. Only meaningful for engines
    /// that push results; rebinding discards anything still queued.
    pub fn bind_results(&mut self) {
        if let Self::Legacy(adapter) = self {
            adapter.bind_results();
        }
    }
}

impl DetectionAdapter for BackendAdapter {
    fn detect_on_frame(
        &mut self,
        frame: &RasterFrame,
        timestamp_ms: f64,
    ) -> Result<Option<Detection>> {
        match self {
            Self::Legacy(a) => a.detect_on_frame(frame, timestamp_ms),
            Self::Modern(a) => a.detect_on_frame(frame, timestamp_ms),
        }
    }

    fn take_pending(&mut self) -> Option<Detection> {
        match self {
            Self::Legacy(a) => a.take_pending(),
            Self::Modern(a) => a.take_pending(),
        }
    }
}

/// Accept a transform only if it is a full 4x4 of finite values.
pub(crate) fn packed_matrix(values: &[f32]) -> Option<[f32; MATRIX_LEN]> {
    let Ok(matrix) = <[f32; MATRIX_LEN]>::try_from(values) else {
        debug!(
            "Ignoring transform with {} values, expected {}",
            values.len(),
            MATRIX_LEN
        );
        return None;
    };
    if matrix.iter().any(|v| !v.is_finite()) {
        debug!("Ignoring transform with non-finite values");
        return None;
    }
    Some(matrix)
}
