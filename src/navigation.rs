// src/navigation.rs

//! Live guidance toward a single destination.
//!
//! [`NavigationGuide`] is a plain state machine: it is fed fixes and headings
//! and answers with a [`GuidanceReadout`]. It owns no streams and no timers;
//! see [`crate::guidance`] for the event loop that drives it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Sensor, WayfindError};
use crate::geo::{distance_meters, initial_bearing_degrees, is_valid_point, wrap_180, GeoPoint};
use crate::heading::{normalize_heading, HeadingConvention, HeadingFilter, PermissionState};
use crate::location::LocationFix;

/// Distance at or below which the destination counts as reached.
pub const ARRIVAL_THRESHOLD_M: f64 = 10.0;

/// Default smoothing factor for device headings.
pub const DEFAULT_HEADING_SMOOTHING: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavState {
    Idle,
    AwaitingPermission,
    /// Heading permission refused: distance-only guidance, no pointer.
    Denied,
    Tracking,
    Arrived,
}

/// Everything known about one guidance run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSession {
    pub destination: GeoPoint,
    pub current_fix: Option<LocationFix>,
    pub device_heading_degrees: Option<f64>,
    pub state: NavState,
    pub arrived_at: Option<DateTime<Utc>>,
}

/// Arrival changes worth telling the user about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideEvent {
    Arrived { at: DateTime<Utc> },
    /// Moved back outside the arrival radius.
    Departed,
}

/// What the guidance view should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceReadout {
    pub state: NavState,
    pub distance_meters: Option<f64>,
    pub bearing_degrees: Option<f64>,
    /// Rotation of the on-screen arrow relative to the device, unwrapped so
    /// consecutive values never jump by more than 180°.
    pub pointer_degrees: Option<f64>,
    pub arrived: bool,
    /// True when running without a heading sensor.
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct NavigationGuide {
    session: NavigationSession,
    distance: Option<f64>,
    bearing: Option<f64>,
    pointer: Option<f64>,
    within_radius: bool,
    filter: HeadingFilter,
}

impl NavigationGuide {
    /// Creates an idle guide toward `destination`.
    pub fn new(destination: GeoPoint) -> Result<Self, WayfindError> {
        if !is_valid_point(&destination) {
            return Err(WayfindError::invalid_coordinates(
                destination.latitude,
                destination.longitude,
            ));
        }
        Ok(NavigationGuide {
            session: NavigationSession {
                destination,
                current_fix: None,
                device_heading_degrees: None,
                state: NavState::Idle,
                arrived_at: None,
            },
            distance: None,
            bearing: None,
            pointer: None,
            within_radius: false,
            filter: HeadingFilter::new(DEFAULT_HEADING_SMOOTHING),
        })
    }

    /// Replaces the heading smoothing factor (1.0 disables smoothing).
    pub fn with_heading_smoothing(mut self, alpha: f64) -> Self {
        self.filter = HeadingFilter::new(alpha);
        self
    }

    pub fn state(&self) -> NavState {
        self.session.state
    }

    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    /// Starts guidance given the heading permission known at activation time.
    ///
    /// Only meaningful from `Idle`; later calls are ignored.
    pub fn activate(&mut self, permission: PermissionState) -> Result<(), WayfindError> {
        if self.session.state != NavState::Idle {
            log::debug!("Ignoring activate in state {:?}", self.session.state);
            return Ok(());
        }
        match permission {
            PermissionState::Undetermined => {
                self.transition(NavState::AwaitingPermission);
                Ok(())
            }
            granted_or_denied => {
                self.transition(NavState::AwaitingPermission);
                self.resolve_permission(granted_or_denied)
            }
        }
    }

    /// Applies the outcome of a permission prompt.
    ///
    /// A refusal moves the guide into `Denied` and is also returned as
    /// `SensorPermissionDenied` so the caller can log it; guidance keeps
    /// working in distance-only mode either way.
    pub fn resolve_permission(&mut self, permission: PermissionState) -> Result<(), WayfindError> {
        if self.session.state != NavState::AwaitingPermission {
            log::debug!(
                "Ignoring permission {:?} in state {:?}",
                permission,
                self.session.state
            );
            return Ok(());
        }
        match permission {
            PermissionState::Granted => {
                self.transition(NavState::Tracking);
                self.recompute();
                Ok(())
            }
            PermissionState::Denied => {
                self.enter_denied();
                Err(WayfindError::SensorPermissionDenied(Sensor::Heading))
            }
            PermissionState::Undetermined => Ok(()),
        }
    }

    /// Drops to distance-only mode because the heading sensor went away.
    pub fn heading_lost(&mut self) {
        if self.session.state != NavState::Denied {
            log::warn!("Heading source lost, continuing without pointer");
            self.enter_denied();
        }
    }

    /// Takes a new validated fix and re-evaluates arrival.
    pub fn update_fix(&mut self, fix: LocationFix) -> Option<GuideEvent> {
        self.session.current_fix = Some(fix);
        self.recompute()
    }

    /// Takes a raw device heading in the platform's convention.
    ///
    /// Headings are ignored in `Denied` and for non-finite readings.
    pub fn update_heading(&mut self, raw_degrees: f64, convention: HeadingConvention) {
        if self.session.state == NavState::Denied {
            return;
        }
        let Some(heading) = normalize_heading(raw_degrees, convention) else {
            log::debug!("Ignoring non-finite heading {}", raw_degrees);
            return;
        };
        self.session.device_heading_degrees = Some(self.filter.apply(heading));
        self.recompute();
    }

    pub fn readout(&self) -> GuidanceReadout {
        let degraded = self.session.state == NavState::Denied;
        GuidanceReadout {
            state: self.session.state,
            distance_meters: self.distance,
            bearing_degrees: self.bearing,
            pointer_degrees: if degraded { None } else { self.pointer },
            arrived: self.within_radius,
            degraded,
        }
    }

    fn is_guiding(&self) -> bool {
        matches!(
            self.session.state,
            NavState::Tracking | NavState::Arrived | NavState::Denied
        )
    }

    fn recompute(&mut self) -> Option<GuideEvent> {
        let fix = self.session.current_fix?;
        let destination = self.session.destination;

        self.distance = Some(distance_meters(&fix.point, &destination));
        match initial_bearing_degrees(&fix.point, &destination) {
            Ok(bearing) => self.bearing = Some(bearing),
            // Standing on the destination: keep the last direction shown.
            Err(e) => log::debug!("Keeping previous bearing: {}", e),
        }

        if self.session.state != NavState::Denied {
            self.update_pointer();
        }

        if !self.is_guiding() {
            return None;
        }
        self.evaluate_arrival(fix)
    }

    fn update_pointer(&mut self) {
        let (Some(bearing), Some(heading)) = (self.bearing, self.session.device_heading_degrees)
        else {
            return;
        };
        let target = bearing - heading;
        // Unwrap against the previous value so the arrow rotates the short
        // way across north instead of spinning a full turn.
        self.pointer = Some(match self.pointer {
            Some(previous) => previous + wrap_180(target - previous),
            None => wrap_180(target),
        });
    }

    fn evaluate_arrival(&mut self, fix: LocationFix) -> Option<GuideEvent> {
        let within = self.distance? <= ARRIVAL_THRESHOLD_M;
        if within == self.within_radius {
            return None;
        }
        self.within_radius = within;

        if within {
            self.session.arrived_at = Some(fix.captured_at);
            if self.session.state == NavState::Tracking {
                self.transition(NavState::Arrived);
            }
            Some(GuideEvent::Arrived {
                at: fix.captured_at,
            })
        } else {
            self.session.arrived_at = None;
            if self.session.state == NavState::Arrived {
                self.transition(NavState::Tracking);
            }
            Some(GuideEvent::Departed)
        }
    }

    fn enter_denied(&mut self) {
        self.transition(NavState::Denied);
        self.session.device_heading_degrees = None;
        self.pointer = None;
        self.filter.reset();
        self.recompute();
    }

    fn transition(&mut self, next: NavState) {
        log::debug!("Navigation state {:?} -> {:?}", self.session.state, next);
        self.session.state = next;
    }
}
