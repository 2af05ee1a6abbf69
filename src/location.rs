// src/location.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::error::WayfindError;
use crate::geo::{is_valid_point, GeoPoint};
use crate::subscription::Subscription;

/// Fixes reported with a worse accuracy than this are accepted but flagged.
pub const LOW_ACCURACY_THRESHOLD_M: f64 = 50.0;

/// A raw reading as delivered by the platform position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub timestamp: DateTime<Utc>,
}

/// A validated device position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
    pub point: GeoPoint,
    pub accuracy_meters: f64,
    pub captured_at: DateTime<Utc>,
}

/// How an accepted sample should be trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixStatus {
    Accepted,
    /// Accepted, but the reported accuracy exceeds [`LOW_ACCURACY_THRESHOLD_M`].
    LowAccuracy { accuracy_meters: f64 },
}

impl FixStatus {
    pub fn is_low_accuracy(&self) -> bool {
        matches!(self, FixStatus::LowAccuracy { .. })
    }
}

/// A platform stream of position readings.
pub trait PositionSource {
    /// Starts pushing samples into `sink` until the returned handle is released.
    fn subscribe(
        &mut self,
        sink: mpsc::UnboundedSender<PositionSample>,
    ) -> Result<Subscription, WayfindError>;
}

/// Holds the latest accepted fix from a position stream.
///
/// A session is constructed explicitly and handed to whichever search or
/// guidance flow needs it; there is no process-wide location cache.
#[derive(Debug)]
pub struct LocationSession {
    current: Option<LocationFix>,
    publisher: watch::Sender<Option<LocationFix>>,
    samples: Option<mpsc::UnboundedReceiver<PositionSample>>,
    subscription: Option<Subscription>,
}

impl Default for LocationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSession {
    /// Creates a session that is not attached to any source.
    ///
    /// Samples can still be fed manually with [`LocationSession::apply_sample`].
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(None);
        LocationSession {
            current: None,
            publisher,
            samples: None,
            subscription: None,
        }
    }

    /// Creates a session and subscribes it to `source`.
    pub fn start<S>(source: &mut S) -> Result<Self, WayfindError>
    where
        S: PositionSource + ?Sized,
    {
        let (sink, samples) = mpsc::unbounded_channel();
        let subscription = source.subscribe(sink)?;
        log::debug!("Location session started");

        let mut session = LocationSession::new();
        session.samples = Some(samples);
        session.subscription = Some(subscription);
        Ok(session)
    }

    /// The latest accepted fix, or `None` before the first one arrives.
    pub fn current_fix(&self) -> Option<LocationFix> {
        self.current
    }

    /// Watches fix updates. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Option<LocationFix>> {
        self.publisher.subscribe()
    }

    /// True while the session is attached to a live source.
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Validates a raw sample and, if usable, makes it the current fix.
    ///
    /// Invalid coordinates are rejected and the previous fix is kept. Poor
    /// accuracy never blocks acceptance; it is only reported through
    /// [`FixStatus::LowAccuracy`].
    pub fn apply_sample(&mut self, sample: PositionSample) -> Result<FixStatus, WayfindError> {
        let point = GeoPoint {
            latitude: sample.latitude,
            longitude: sample.longitude,
        };
        if !is_valid_point(&point) {
            log::warn!(
                "Rejected position sample ({}, {})",
                sample.latitude,
                sample.longitude
            );
            return Err(WayfindError::invalid_coordinates(
                sample.latitude,
                sample.longitude,
            ));
        }

        // An unknown accuracy is treated as the worst possible one.
        let accuracy_meters = if sample.accuracy_meters >= 0.0 {
            sample.accuracy_meters
        } else {
            f64::INFINITY
        };

        let fix = LocationFix {
            point,
            accuracy_meters,
            captured_at: sample.timestamp,
        };
        self.current = Some(fix);
        self.publisher.send_replace(Some(fix));

        if accuracy_meters > LOW_ACCURACY_THRESHOLD_M {
            log::debug!("Accepted low accuracy fix ({} m)", accuracy_meters);
            Ok(FixStatus::LowAccuracy { accuracy_meters })
        } else {
            Ok(FixStatus::Accepted)
        }
    }

    /// Waits for the next raw sample from the source.
    ///
    /// Returns `None` once the session is closed or the source hangs up.
    pub async fn recv_sample(&mut self) -> Option<PositionSample> {
        match self.samples.as_mut() {
            Some(samples) => samples.recv().await,
            None => None,
        }
    }

    /// Waits for the next sample and applies it.
    pub async fn next_fix(&mut self) -> Option<Result<FixStatus, WayfindError>> {
        let sample = self.recv_sample().await?;
        Some(self.apply_sample(sample))
    }

    /// Releases the source subscription. The last fix stays readable.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            log::debug!("Location session closed");
        }
        self.samples = None;
    }
}

impl Drop for LocationSession {
    fn drop(&mut self) {
        self.close();
    }
}
