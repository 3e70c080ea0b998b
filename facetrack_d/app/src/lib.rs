//! Face pose and blendshape tracking over interchangeable inference backends.
//!
//! A [`FaceTracker`] owns one backend for its lifetime, drives a
//! refresh-synchronized capture loop, and fans each normalized
//! [`TrackingResult`](api::TrackingResult) out to listeners and, while
//! recording, into the session log.

pub mod backend;
mod error;
pub mod plugins;
mod provider;
pub mod scheduler;
pub mod tracker;

pub use error::TrackerError;
pub use provider::EngineProvider;
pub use scheduler::{FrameScheduler, SchedulerState};
pub use tracker::{FaceTracker, Session, TrackingReport};
