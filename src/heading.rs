// src/heading.rs

//! Device heading normalization and smoothing.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::WayfindError;
use crate::geo::{wrap_180, wrap_360};
use crate::subscription::Subscription;

/// How a platform reports compass heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingConvention {
    /// Degrees clockwise from true north (e.g. a native compass heading).
    #[default]
    TrueNorthClockwise,
    /// Degrees counter-clockwise from north, as the raw orientation `alpha`
    /// angle is reported on most browsers.
    CounterClockwise,
}

/// Converts a raw heading into degrees clockwise from true north, in `[0, 360)`.
///
/// Returns `None` for non-finite readings.
pub fn normalize_heading(raw_degrees: f64, convention: HeadingConvention) -> Option<f64> {
    if !raw_degrees.is_finite() {
        return None;
    }
    let clockwise = match convention {
        HeadingConvention::TrueNorthClockwise => raw_degrees,
        HeadingConvention::CounterClockwise => 360.0 - raw_degrees,
    };
    Some(wrap_360(clockwise))
}

/// Heading sensor permission as last reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Granted,
    Denied,
    Undetermined,
}

/// A platform stream of compass headings.
///
/// The source may be permanently unavailable; guidance then runs in
/// distance-only mode.
pub trait HeadingSource {
    /// Convention of the raw values pushed by [`HeadingSource::subscribe`].
    fn convention(&self) -> HeadingConvention {
        HeadingConvention::TrueNorthClockwise
    }

    fn permission(&self) -> PermissionState;

    /// Prompts for permission if it is still undetermined.
    fn request_permission(&mut self) -> PermissionState;

    /// Starts pushing raw headings into `sink` until the handle is released.
    fn subscribe(&mut self, sink: mpsc::UnboundedSender<f64>)
        -> Result<Subscription, WayfindError>;
}

/// Exponential moving average filter for heading values.
///
/// Interpolates along the shortest arc, so a 350° → 10° change moves through
/// north instead of sweeping back across south.
///
/// - `alpha = 1.0`: no filtering
/// - `alpha = 0.0`: holds the first heading forever
#[derive(Debug, Clone)]
pub struct HeadingFilter {
    alpha: f64,
    prev_heading: Option<f64>,
}

impl HeadingFilter {
    /// Alpha is clamped to [0.0, 1.0]. Lower alpha = more smoothing.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            prev_heading: None,
        }
    }

    /// Smooths a heading in `[0, 360)`. The first call returns it unchanged.
    pub fn apply(&mut self, heading: f64) -> f64 {
        let smoothed = match self.prev_heading {
            None => heading,
            Some(prev) => wrap_360(prev + self.alpha * wrap_180(heading - prev)),
        };
        self.prev_heading = Some(smoothed);
        smoothed
    }

    pub fn reset(&mut self) {
        self.prev_heading = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_clockwise_is_mirrored() {
        assert_eq!(
            normalize_heading(90.0, HeadingConvention::CounterClockwise),
            Some(270.0)
        );
        assert_eq!(
            normalize_heading(0.0, HeadingConvention::CounterClockwise),
            Some(0.0)
        );
        assert_eq!(
            normalize_heading(-10.0, HeadingConvention::TrueNorthClockwise),
            Some(350.0)
        );
        assert_eq!(
            normalize_heading(f64::NAN, HeadingConvention::TrueNorthClockwise),
            None
        );
    }

    #[test]
    fn test_filter_wraps_through_north() {
        let mut filter = HeadingFilter::new(0.3);
        filter.apply(350.0);
        let smoothed = filter.apply(10.0);
        // 350 + 0.3 * 20
        assert!((smoothed - 356.0).abs() < 1e-9, "got {}", smoothed);
    }

    #[test]
    fn test_filter_reset() {
        let mut filter = HeadingFilter::new(0.3);
        filter.apply(90.0);
        filter.apply(100.0);
        filter.reset();
        assert_eq!(filter.apply(200.0), 200.0);
    }
}
