//! Engines and camera streams provided by a native plugin library.
//!
//! A plugin exports any of these factories:
//!
//! - `create_face_mesh(ModuleLogger) -> Box<dyn FaceMeshEngine>`
//! - `create_face_landmarker(ModuleLogger) -> Box<dyn FaceLandmarkerEngine>`
//! - `create_video_source(ModuleLogger) -> Box<dyn VideoSource>`

use anyhow::{Context, Result};
use api::{
    FaceLandmarkerEngine, FaceMeshEngine, FaceMeshOptions, LandmarkerOptions, LogLevel,
    ModuleLogger, VideoSource,
};
use async_trait::async_trait;
use libloading::{Library, Symbol};
use log::{debug, error, info, trace, warn};
use std::ffi::{c_char, CStr};
use std::path::Path;

use crate::provider::EngineProvider;

type FaceMeshFactory = unsafe extern "C" fn(ModuleLogger) -> Box<dyn FaceMeshEngine>;
type LandmarkerFactory = unsafe extern "C" fn(ModuleLogger) -> Box<dyn FaceLandmarkerEngine>;
type VideoSourceFactory = unsafe extern "C" fn(ModuleLogger) -> Box<dyn VideoSource>;

pub(crate) extern "C" fn module_log_callback(
    level: LogLevel,
    target: *const c_char,
    message: *const c_char,
) {
    if target.is_null() || message.is_null() {
        return;
    }
    unsafe {
        let target_str = CStr::from_ptr(target).to_str().unwrap_or("unknown");
        let message_str = CStr::from_ptr(message).to_str().unwrap_or("");

        match level {
            LogLevel::Error => error!(target: target_str, "{}", message_str),
            LogLevel::Warn => warn!(target: target_str, "{}", message_str),
            LogLevel::Info => info!(target: target_str, "{}", message_str),
            LogLevel::Debug => debug!(target: target_str, "{}", message_str),
            LogLevel::Trace => trace!(target: target_str, "{}", message_str),
        }
    }
}

pub struct PluginEngines {
    name: String,
    // Leaked: objects created by the plugin may outlive this provider.
    library: &'static Library,
}

impl PluginEngines {
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!("Loading plugin: {:?}", path);
        let library = unsafe { Library::new(path) }
            .with_context(|| format!("Failed to load plugin {:?}", path))?;

        Ok(Self {
            name,
            library: Box::leak(Box::new(library)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn logger(&self, component: &str) -> ModuleLogger {
        let target = format!("facetrack_d::plugins::{}::{}", self.name, component);
        ModuleLogger::new(module_log_callback, &target)
    }

    /// The plugin's camera stream, if it ships one.
    pub fn video_source(&self) -> Option<Box<dyn VideoSource>> {
        unsafe {
            let factory: Symbol<VideoSourceFactory> =
                match self.library.get(b"create_video_source") {
                    Ok(factory) => factory,
                    Err(e) => {
                        debug!("Plugin {} provides no video source: {}", self.name, e);
                        return None;
                    }
                };
            Some(factory(self.logger("camera")))
        }
    }
}

#[async_trait]
impl EngineProvider for PluginEngines {
    async fn load_face_mesh(&self, _options: &FaceMeshOptions) -> Result<Box<dyn FaceMeshEngine>> {
        unsafe {
            let factory: Symbol<FaceMeshFactory> = self
                .library
                .get(b"create_face_mesh")
                .with_context(|| format!("Plugin {} has no face mesh engine", self.name))?;
            Ok(factory(self.logger("face_mesh")))
        }
    }

    async fn load_face_landmarker(
        &self,
        _options: &LandmarkerOptions,
    ) -> Result<Box<dyn FaceLandmarkerEngine>> {
        unsafe {
            let factory: Symbol<LandmarkerFactory> = self
                .library
                .get(b"create_face_landmarker")
                .with_context(|| format!("Plugin {} has no face landmarker", self.name))?;
            Ok(factory(self.logger("face_landmarker")))
        }
    }
}
