// src/guidance.rs

//! Event loop joining the position stream, the heading stream and the frame
//! clock into a sequence of [`GuidanceUpdate`]s.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::config::WayfindConfig;
use crate::error::WayfindError;
use crate::frame::{FrameClock, FrameCoalescer};
use crate::geo::GeoPoint;
use crate::heading::{HeadingConvention, HeadingSource, PermissionState};
use crate::location::{FixStatus, LocationSession, PositionSample, PositionSource};
use crate::navigation::{GuidanceReadout, GuideEvent, NavState, NavigationGuide};
use crate::subscription::Subscription;

/// Something the guidance view should react to.
#[derive(Debug)]
pub enum GuidanceUpdate {
    /// Fresh readout for this frame.
    Frame(GuidanceReadout),
    Event(GuideEvent),
    /// A fix was accepted with poor accuracy.
    LowAccuracy { accuracy_meters: f64 },
    /// A sample was discarded; the previous fix is still in use.
    SampleRejected(WayfindError),
    /// The heading sensor is unavailable; guidance continues without a pointer.
    HeadingUnavailable(WayfindError),
    /// The position source hung up. No more updates will follow.
    PositionLost,
}

enum Wake {
    Position(Option<PositionSample>),
    Heading(Option<f64>),
    Frame,
}

/// One guidance run toward a destination.
///
/// Owns both sensor subscriptions. [`GuidanceSession::close`] (or dropping the
/// session) releases them before any guide state is discarded, and samples
/// pushed afterwards are refused by the closed channels.
#[derive(Debug)]
pub struct GuidanceSession {
    heading_subscription: Option<Subscription>,
    heading_samples: Option<mpsc::UnboundedReceiver<f64>>,
    location: LocationSession,
    guide: NavigationGuide,
    convention: HeadingConvention,
    coalescer: FrameCoalescer<f64>,
    clock: FrameClock,
    dirty: bool,
    pending: VecDeque<GuidanceUpdate>,
    closed: bool,
}

impl GuidanceSession {
    /// Starts guidance toward `destination`.
    ///
    /// Subscribes to the position source, settles heading permission (asking
    /// once if undetermined) and subscribes to headings when allowed. Must be
    /// called from within a Tokio runtime.
    pub fn start<P, H>(
        destination: GeoPoint,
        positions: &mut P,
        headings: &mut H,
        config: &WayfindConfig,
    ) -> Result<Self, WayfindError>
    where
        P: PositionSource + ?Sized,
        H: HeadingSource + ?Sized,
    {
        let guide =
            NavigationGuide::new(destination)?.with_heading_smoothing(config.heading_smoothing);
        let location = LocationSession::start(positions)?;

        let mut session = GuidanceSession {
            heading_subscription: None,
            heading_samples: None,
            location,
            guide,
            convention: headings.convention(),
            coalescer: FrameCoalescer::new(),
            clock: FrameClock::new(config.frame_interval()),
            dirty: true,
            pending: VecDeque::new(),
            closed: false,
        };

        let mut permission = headings.permission();
        if let Err(e) = session.guide.activate(permission) {
            session.pending.push_back(GuidanceUpdate::HeadingUnavailable(e));
        }
        if permission == PermissionState::Undetermined {
            permission = headings.request_permission();
            if let Err(e) = session.guide.resolve_permission(permission) {
                session.pending.push_back(GuidanceUpdate::HeadingUnavailable(e));
            }
        }

        if session.guide.state() == NavState::Tracking {
            let (sink, samples) = mpsc::unbounded_channel();
            match headings.subscribe(sink) {
                Ok(subscription) => {
                    session.heading_subscription = Some(subscription);
                    session.heading_samples = Some(samples);
                }
                Err(e) => {
                    session.guide.heading_lost();
                    session.pending.push_back(GuidanceUpdate::HeadingUnavailable(e));
                }
            }
        }

        log::debug!(
            "Guidance started toward ({}, {}) in state {:?}",
            destination.latitude,
            destination.longitude,
            session.guide.state()
        );
        Ok(session)
    }

    pub fn guide(&self) -> &NavigationGuide {
        &self.guide
    }

    pub fn location(&self) -> &LocationSession {
        &self.location
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Waits for the next update. Returns `None` once the session is closed.
    pub async fn next_update(&mut self) -> Option<GuidanceUpdate> {
        loop {
            if let Some(update) = self.pending.pop_front() {
                return Some(update);
            }
            if self.closed {
                return None;
            }

            let heading_live = self.heading_samples.is_some();
            let wake = tokio::select! {
                sample = self.location.recv_sample() => Wake::Position(sample),
                heading = recv_heading(&mut self.heading_samples), if heading_live => {
                    Wake::Heading(heading)
                }
                _ = self.clock.tick() => Wake::Frame,
            };

            match wake {
                Wake::Position(Some(sample)) => self.on_sample(sample),
                Wake::Position(None) => {
                    log::warn!("Position source ended, closing guidance");
                    self.teardown();
                    self.pending.push_back(GuidanceUpdate::PositionLost);
                }
                Wake::Heading(Some(raw)) => self.coalescer.offer(raw),
                Wake::Heading(None) => {
                    self.release_heading();
                    self.guide.heading_lost();
                    self.dirty = true;
                    self.pending.push_back(GuidanceUpdate::HeadingUnavailable(
                        WayfindError::SourceUnavailable("heading stream ended".to_string()),
                    ));
                }
                Wake::Frame => {
                    if let Some(raw) = self.coalescer.take() {
                        self.guide.update_heading(raw, self.convention);
                        self.dirty = true;
                    }
                    if self.dirty {
                        self.dirty = false;
                        return Some(GuidanceUpdate::Frame(self.guide.readout()));
                    }
                }
            }
        }
    }

    fn on_sample(&mut self, sample: PositionSample) {
        match self.location.apply_sample(sample) {
            Ok(status) => {
                if let FixStatus::LowAccuracy { accuracy_meters } = status {
                    self.pending
                        .push_back(GuidanceUpdate::LowAccuracy { accuracy_meters });
                }
                if let Some(fix) = self.location.current_fix() {
                    if let Some(event) = self.guide.update_fix(fix) {
                        self.pending.push_back(GuidanceUpdate::Event(event));
                    }
                }
                self.dirty = true;
            }
            Err(e) => self.pending.push_back(GuidanceUpdate::SampleRejected(e)),
        }
    }

    /// Ends guidance, releasing both sensor streams.
    pub fn close(mut self) {
        self.teardown();
    }

    fn release_heading(&mut self) {
        if let Some(subscription) = self.heading_subscription.take() {
            subscription.cancel();
        }
        self.heading_samples = None;
        self.coalescer.clear();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        // Unsubscribe first so no callback can reach state being discarded.
        self.release_heading();
        self.location.close();
        self.closed = true;
        log::debug!("Guidance session closed");
    }
}

impl Drop for GuidanceSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn recv_heading(samples: &mut Option<mpsc::UnboundedReceiver<f64>>) -> Option<f64> {
    match samples.as_mut() {
        Some(samples) => samples.recv().await,
        None => None,
    }
}
