use api::BackendKind;

/// Failures surfaced to the host through the lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Failed to initialize {backend:?} backend: {source:#}")]
    Initialization {
        backend: BackendKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("Tracker has not been initialized")]
    NotInitialized,
    #[error("Tracker is already initialized with the {0:?} backend")]
    AlreadyInitialized(BackendKind),
}

impl TrackerError {
    pub(crate) fn initialization(backend: BackendKind, source: anyhow::Error) -> Self {
        Self::Initialization { backend, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};
    use std::error::Error;

    #[test]
    fn initialization_keeps_its_cause() {
        let cause = Err::<(), _>(anyhow!("model file missing"))
            .context("Face landmarker rejected its options")
            .unwrap_err();
        let err = TrackerError::initialization(BackendKind::Modern, cause);

        let source = err.source().expect("initialization error has a source");
        assert_eq!(source.to_string(), "Face landmarker rejected its options");
        assert!(err.to_string().contains("model file missing"));

        match err {
            TrackerError::Initialization { source, .. } => {
                assert_eq!(source.root_cause().to_string(), "model file missing");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
