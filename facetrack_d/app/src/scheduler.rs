//! Refresh-driven capture loop.
//!
//! The host owns the display refresh signal. The scheduler keeps at most one
//! outstanding tick request; the host answers it by calling back with that
//! tick's id. Cancelling clears the request, so a refresh that was already
//! on its way for an older id is ignored when it lands.

use api::{RasterFrame, TickId, VideoSource};
use log::{debug, info, trace, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Stream acquired, waiting for its metadata before the first tick.
    AwaitingMetadata,
    Capturing,
}

pub struct FrameScheduler {
    state: SchedulerState,
    stream: Option<Box<dyn VideoSource>>,
    surface: Option<RasterFrame>,
    pending: Option<TickId>,
    next_tick: TickId,
    last_tick: Option<TickId>,

    frame_count: u64,
    log_interval: u64,
    last_log: Instant,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            stream: None,
            surface: None,
            pending: None,
            next_tick: 0,
            last_tick: None,
            frame_count: 0,
            log_interval: 1000,
            last_log: Instant::now(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The tick the host should deliver on the next refresh, if any.
    pub fn pending_tick(&self) -> Option<TickId> {
        self.pending
    }

    /// The most recent tick that actually ran.
    pub fn last_tick(&self) -> Option<TickId> {
        self.last_tick
    }

    pub fn stream(&self) -> Option<&dyn VideoSource> {
        self.stream.as_deref()
    }

    /// Begin capturing from `stream`. Any running loop is cancelled first
    /// and the capture surface is recreated. Without a stream the scheduler
    /// stays idle. Returns whether a stream was acquired.
    pub fn start(&mut self, stream: Option<Box<dyn VideoSource>>) -> bool {
        self.stop();

        let Some(stream) = stream else {
            warn!("No camera stream available; face tracking stays idle");
            return false;
        };

        info!("Acquired camera stream '{}'", stream.label());
        let ready = stream.is_ready();
        self.stream = Some(stream);
        self.surface = Some(RasterFrame::new());
        self.frame_count = 0;
        self.log_interval = 1000;
        self.last_log = Instant::now();

        if ready {
            self.begin();
        } else {
            debug!("Waiting for stream metadata");
            self.state = SchedulerState::AwaitingMetadata;
        }
        true
    }

    /// Stream metadata became available.
    pub fn stream_ready(&mut self) {
        if self.state == SchedulerState::AwaitingMetadata {
            self.begin();
        }
    }

    /// Cancel the outstanding tick and release the stream. Safe to call
    /// when already idle.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Idle {
            info!("Stopping capture after {} frames", self.frame_count);
        }
        self.pending = None;
        self.state = SchedulerState::Idle;
        self.stream = None;
        self.surface = None;
    }

    /// Run tick `tick` if it is the outstanding request: draw the current
    /// video frame and hand it to `process`, then request the next tick.
    /// Returns whether the tick ran.
    pub fn run_tick<F>(&mut self, tick: TickId, process: F) -> bool
    where
        F: FnOnce(TickId, &RasterFrame),
    {
        if self.pending != Some(tick) {
            trace!("Ignoring tick {} (pending: {:?})", tick, self.pending);
            return false;
        }
        self.pending = None;

        let (Some(stream), Some(surface)) = (self.stream.as_mut(), self.surface.as_mut()) else {
            return false;
        };

        match stream.draw_into(surface) {
            Ok(()) => process(tick, surface),
            Err(e) => warn!("Failed to capture frame for tick {}: {:#}", tick, e),
        }

        self.last_tick = Some(tick);
        self.count_frame();
        self.request_tick();
        true
    }

    fn begin(&mut self) {
        self.state = SchedulerState::Capturing;
        let tick = self.request_tick();
        debug!("Capture loop started at tick {}", tick);
    }

    /// Take an id no tick has used or will use, without scheduling it.
    /// Results that outlive the loop are stamped with one of these.
    pub fn reserve_tick(&mut self) -> TickId {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn request_tick(&mut self) -> TickId {
        let tick = self.reserve_tick();
        self.pending = Some(tick);
        tick
    }

    fn count_frame(&mut self) {
        self.frame_count += 1;
        if self.frame_count % self.log_interval == 0 {
            let elapsed = self.last_log.elapsed().as_secs_f32();
            let fps = self.log_interval as f32 / elapsed;
            info!(
                "Tracking Active: Processed {} frames (approx {:.1} FPS)",
                self.frame_count, fps
            );
            self.last_log = Instant::now();

            if self.frame_count >= 1_000_000 {
                self.log_interval = 1_000_000;
            } else if self.frame_count >= 100_000 {
                self.log_interval = 100_000;
            } else if self.frame_count >= 10_000 {
                self.log_interval = 10_000;
            }
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
