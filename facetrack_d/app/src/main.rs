use anyhow::{Context, Result};
use common::{load_config, TrackerConfig};
use facetrack_d::plugins::PluginEngines;
use facetrack_d::{FaceTracker, TrackingReport};
use log::{debug, error, info, trace};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn plugin_dir() -> PathBuf {
    let native = Path::new("plugins/native");
    if !native.exists() {
        let parent_native = Path::new("../plugins/native");
        if parent_native.exists() {
            return parent_native.to_path_buf();
        }
    }
    native.to_path_buf()
}

fn write_report(path: &Path, report: &TrackingReport) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let config = load_config(Path::new("config.json")).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        TrackerConfig::default()
    });
    info!("Loaded Config: {:?}", config);

    let plugin_path = plugin_dir().join(&config.plugin);
    let engines = PluginEngines::load(&plugin_path)?;
    let stream = engines.video_source();

    let mut tracker = FaceTracker::new(engines)
        .with_stale_policy(config.stale_results)
        .with_log_cap(config.max_log_len);

    #[cfg(feature = "xtralog")]
    tracker.register_result_listener(Box::new(|result| {
        match (result.rotation, result.translation) {
            (Some(rotation), Some(translation)) => trace!(
                "Frame {}: rotation {:?}, translation {:?}",
                result.frame_id,
                rotation,
                translation
            ),
            _ => trace!("Frame {}: no face", result.frame_id),
        }
        Ok(())
    }));

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    if let Err(e) = rt.block_on(tracker.initialize(config.init.clone())) {
        error!("✗ {}", e);
        return Err(e.into());
    }

    tracker.start(stream)?;
    tracker.configure_recording(config.recording.clone())?;

    info!("Entering refresh loop at {} FPS...", config.max_fps);
    let frame_duration = Duration::from_secs_f32(1.0 / config.max_fps.max(1.0));
    let epoch = Instant::now();

    while running.load(Ordering::SeqCst) {
        let refresh_start = Instant::now();

        match tracker.pending_tick() {
            Some(tick) => {
                let timestamp_ms = epoch.elapsed().as_secs_f64() * 1000.0;
                tracker.on_refresh(tick, timestamp_ms);
            }
            None if tracker
                .active_media_stream()
                .is_some_and(|stream| stream.is_ready()) =>
            {
                tracker.stream_ready();
            }
            None => {}
        }

        let elapsed = refresh_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    info!("Shutting down...");
    let report = tracker.finish();
    let presented = TrackingReport {
        tracking_log: config.presentation.present_all(&report.tracking_log),
    };
    write_report(&config.output_path, &presented)?;
    info!(
        "Wrote {} results to {:?}",
        presented.tracking_log.len(),
        config.output_path
    );
    Ok(())
}
