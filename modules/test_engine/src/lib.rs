// Synthetic plugin for running the daemon without a camera or a real model.
//
// The camera paints a moving gradient; both engines report a head slowly
// turning left and right in front of the camera, losing the face once every
// `MISS_EVERY` frames.

use anyhow::{bail, Result};
use api::{
    Category, Classifications, FaceGeometry, FaceLandmarkerEngine, FaceLandmarkerResult,
    FaceMeshEngine, FaceMeshOptions, FaceMeshResultHandler, FaceMeshResults, LandmarkerOptions,
    ModuleLogger, RasterFrame, TransformMatrix, VideoSource,
};
use glam::{Mat4, Vec3};
use image::Rgba;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

pub const MISS_EVERY: u64 = 30;
const HEAD_DISTANCE: f32 = 40.0;

/// Head pose for synthetic frame `n`: yaw sweeps ±0.5 rad, 40 units away.
pub fn head_pose(n: u64) -> Mat4 {
    let yaw = 0.5 * (n as f32 * 0.05).sin();
    Mat4::from_translation(Vec3::new(0.0, 0.0, -HEAD_DISTANCE)) * Mat4::from_rotation_y(yaw)
}

fn face_visible(n: u64) -> bool {
    (n + 1) % MISS_EVERY != 0
}

fn jaw_open(n: u64) -> f32 {
    (n as f32 * 0.1).sin().powi(2)
}

pub struct GradientCamera {
    frame: u64,
    logger: Option<ModuleLogger>,
}

impl GradientCamera {
    pub fn new(logger: Option<ModuleLogger>) -> Self {
        Self { frame: 0, logger }
    }
}

impl VideoSource for GradientCamera {
    fn label(&self) -> &str {
        "Synthetic gradient camera"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn draw_into(&mut self, frame: &mut RasterFrame) -> Result<()> {
        let shift = (self.frame % 256) as u32;
        let width = frame.width();
        for (x, _y, pixel) in frame.image_mut().enumerate_pixels_mut() {
            let v = ((x * 255 / width + shift) % 256) as u8;
            *pixel = Rgba([v, v / 2, 255 - v, 255]);
        }
        self.frame += 1;
        if self.frame == 1 {
            if let Some(logger) = &self.logger {
                logger.info("First synthetic frame drawn");
            }
        }
        Ok(())
    }
}

pub struct SweepLandmarker {
    frame_count: u64,
    blendshapes: bool,
    configured: bool,
    last_timestamp: f64,
    logger: Option<ModuleLogger>,
}

impl SweepLandmarker {
    pub fn new(logger: Option<ModuleLogger>) -> Self {
        Self {
            frame_count: 0,
            blendshapes: false,
            configured: false,
            last_timestamp: f64::NEG_INFINITY,
            logger,
        }
    }
}

impl FaceLandmarkerEngine for SweepLandmarker {
    fn configure(&mut self, options: &LandmarkerOptions) -> Result<()> {
        if options.num_faces != 1 {
            bail!("synthetic landmarker tracks exactly one face");
        }
        self.blendshapes = options.output_face_blendshapes;
        self.configured = true;
        if let Some(logger) = &self.logger {
            logger.info(&format!(
                "Configured with model {} (blendshapes: {})",
                options.model_asset_path, self.blendshapes
            ));
        }
        Ok(())
    }

    fn detect_for_video(
        &mut self,
        _frame: &RasterFrame,
        timestamp_ms: f64,
    ) -> Result<FaceLandmarkerResult> {
        if !self.configured {
            bail!("detect called before configure");
        }
        if timestamp_ms < self.last_timestamp {
            bail!(
                "timestamps must not go backwards ({} < {})",
                timestamp_ms,
                self.last_timestamp
            );
        }
        self.last_timestamp = timestamp_ms;

        let n = self.frame_count;
        self.frame_count += 1;
        if let Some(logger) = &self.logger {
            if n > 0 && n % 1000 == 0 {
                logger.debug(&format!("Frame {} milestone", n));
            }
        }

        if !face_visible(n) {
            return Ok(FaceLandmarkerResult::default());
        }

        let face_blendshapes = if self.blendshapes {
            vec![Classifications {
                categories: vec![Category {
                    index: 25,
                    score: jaw_open(n),
                    category_name: "jawOpen".to_string(),
                    display_name: String::new(),
                }],
                head_index: 0,
            }]
        } else {
            Vec::new()
        };

        Ok(FaceLandmarkerResult {
            face_landmarks: Vec::new(),
            face_blendshapes,
            facial_transformation_matrixes: vec![TransformMatrix {
                rows: 4,
                columns: 4,
                data: head_pose(n).to_cols_array().to_vec(),
            }],
        })
    }

    fn close(&mut self) {
        if let Some(logger) = &self.logger {
            logger.info(&format!(
                "Tearing down synthetic landmarker. Total frames processed: {}",
                self.frame_count
            ));
        }
    }
}

/// Face mesh that answers from a worker thread, so results arrive after
/// `send` has returned.
pub struct SweepFaceMesh {
    handler: Arc<Mutex<Option<FaceMeshResultHandler>>>,
    frames: Option<Sender<u64>>,
    worker: Option<JoinHandle<()>>,
    sent: u64,
    logger: Option<ModuleLogger>,
}

impl SweepFaceMesh {
    pub fn new(logger: Option<ModuleLogger>) -> Self {
        Self {
            handler: Arc::new(Mutex::new(None)),
            frames: None,
            worker: None,
            sent: 0,
            logger,
        }
    }
}

impl FaceMeshEngine for SweepFaceMesh {
    fn configure(&mut self, options: &FaceMeshOptions) -> Result<()> {
        if !options.enable_face_geometry {
            bail!("synthetic face mesh only reports face geometry");
        }

        let (tx, rx) = channel::<u64>();
        let handler = self.handler.clone();
        self.worker = Some(thread::spawn(move || {
            for n in rx {
                let results = if face_visible(n) {
                    FaceMeshResults {
                        multi_face_geometry: vec![FaceGeometry {
                            pose_transform_matrix: head_pose(n).to_cols_array().to_vec(),
                        }],
                    }
                } else {
                    FaceMeshResults::default()
                };
                if let Ok(mut guard) = handler.lock() {
                    if let Some(handler) = guard.as_mut() {
                        handler(results);
                    }
                }
            }
        }));
        self.frames = Some(tx);

        if let Some(logger) = &self.logger {
            logger.info("Synthetic face mesh worker started");
        }
        Ok(())
    }

    fn on_results(&mut self, handler: FaceMeshResultHandler) {
        if let Ok(mut guard) = self.handler.lock() {
            *guard = Some(handler);
        }
    }

    fn send(&mut self, _frame: &RasterFrame) -> Result<()> {
        let Some(frames) = &self.frames else {
            bail!("send called before configure");
        };
        frames.send(self.sent)?;
        self.sent += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.frames = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if let Some(logger) = &self.logger {
            logger.info(&format!(
                "Tearing down synthetic face mesh. Total frames sent: {}",
                self.sent
            ));
        }
    }
}

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_video_source(logger: ModuleLogger) -> Box<dyn VideoSource> {
    Box::new(GradientCamera::new(Some(logger)))
}

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_face_landmarker(logger: ModuleLogger) -> Box<dyn FaceLandmarkerEngine> {
    Box::new(SweepLandmarker::new(Some(logger)))
}

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_face_mesh(logger: ModuleLogger) -> Box<dyn FaceMeshEngine> {
    Box::new(SweepFaceMesh::new(Some(logger)))
}
