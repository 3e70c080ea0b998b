pub use api::{Blendshape, TickId, TrackingResult};

mod config;
mod decompose;
mod fanout;
pub mod presentation;
mod recorder;

pub use config::{
    load_config, InitOptions, Presentation, RecordingOptions, StaleResultPolicy, TrackerConfig,
};
pub use decompose::{decompose, euler_xyz, Pose};
pub use fanout::{ListenerId, ResultFanout, ResultListener};
pub use recorder::SessionRecorder;
