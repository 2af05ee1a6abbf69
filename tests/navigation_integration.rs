use chrono::Duration;
use wayfind_rs::heading::{HeadingConvention, PermissionState};
use wayfind_rs::navigation::{GuideEvent, NavState, NavigationGuide, ARRIVAL_THRESHOLD_M};
use wayfind_rs::{GeoPoint, LocationFix, Sensor, WayfindError};

use test_utils::shared::*;

fn destination() -> GeoPoint {
    north_of(ORIGIN, 200.0)
}

fn fix_at_distance(meters: f64, seconds: i64) -> LocationFix {
    // Walking north toward the destination; `meters` is what is left.
    let mut f = fix(north_of(destination(), -meters));
    f.captured_at = base_time() + Duration::seconds(seconds);
    f
}

fn tracking_guide() -> NavigationGuide {
    let mut guide = NavigationGuide::new(destination())
        .unwrap()
        .with_heading_smoothing(1.0);
    guide.activate(PermissionState::Granted).unwrap();
    guide
}

#[test]
fn test_activation_with_undetermined_permission_waits() {
    initialize_logger_once();
    let mut guide = NavigationGuide::new(destination()).unwrap();
    assert_eq!(guide.state(), NavState::Idle);

    guide.activate(PermissionState::Undetermined).unwrap();
    assert_eq!(guide.state(), NavState::AwaitingPermission);

    guide.resolve_permission(PermissionState::Granted).unwrap();
    assert_eq!(guide.state(), NavState::Tracking);
}

#[test]
fn test_denied_permission_degrades_to_distance_only() {
    initialize_logger_once();
    let mut guide = NavigationGuide::new(destination()).unwrap();
    guide.activate(PermissionState::Undetermined).unwrap();

    let err = guide
        .resolve_permission(PermissionState::Denied)
        .unwrap_err();
    assert!(matches!(
        err,
        WayfindError::SensorPermissionDenied(Sensor::Heading)
    ));
    assert_eq!(guide.state(), NavState::Denied);

    guide.update_fix(fix_at_distance(150.0, 0));
    guide.update_heading(45.0, HeadingConvention::TrueNorthClockwise);

    let readout = guide.readout();
    assert!(readout.degraded);
    assert_eq!(readout.pointer_degrees, None);
    let distance = readout.distance_meters.unwrap();
    assert!((distance - 150.0).abs() < 1.0, "got {}", distance);
    assert!(readout.bearing_degrees.is_some());
    assert_eq!(guide.session().device_heading_degrees, None);
}

#[test]
fn test_denied_mode_still_reports_arrival() {
    initialize_logger_once();
    let mut guide = NavigationGuide::new(destination()).unwrap();
    let _ = guide.activate(PermissionState::Denied);
    assert_eq!(guide.state(), NavState::Denied);

    assert_eq!(guide.update_fix(fix_at_distance(50.0, 0)), None);
    let event = guide.update_fix(fix_at_distance(3.0, 10));
    assert!(matches!(event, Some(GuideEvent::Arrived { .. })));
    assert!(guide.readout().arrived);
    assert_eq!(guide.state(), NavState::Denied);
}

#[test]
fn test_arrival_is_reentrant() {
    initialize_logger_once();
    let mut guide = tracking_guide();

    assert_eq!(guide.update_fix(fix_at_distance(80.0, 0)), None);
    assert_eq!(guide.state(), NavState::Tracking);

    assert_eq!(guide.update_fix(fix_at_distance(10.5, 10)), None);
    assert_eq!(guide.state(), NavState::Tracking);

    let arrived = guide.update_fix(fix_at_distance(9.5, 20));
    assert_eq!(
        arrived,
        Some(GuideEvent::Arrived {
            at: base_time() + Duration::seconds(20)
        })
    );
    assert_eq!(guide.state(), NavState::Arrived);
    assert_eq!(
        guide.session().arrived_at,
        Some(base_time() + Duration::seconds(20))
    );

    // Still inside: no new event.
    assert_eq!(guide.update_fix(fix_at_distance(4.0, 25)), None);
    assert_eq!(guide.state(), NavState::Arrived);

    assert_eq!(
        guide.update_fix(fix_at_distance(12.0, 30)),
        Some(GuideEvent::Departed)
    );
    assert_eq!(guide.state(), NavState::Tracking);
    assert_eq!(guide.session().arrived_at, None);

    assert!(matches!(
        guide.update_fix(fix_at_distance(2.0, 40)),
        Some(GuideEvent::Arrived { .. })
    ));
    assert_eq!(guide.state(), NavState::Arrived);
}

#[test]
fn test_threshold_is_inclusive() {
    initialize_logger_once();
    let mut guide = tracking_guide();
    guide.update_fix(fix_at_distance(30.0, 0));

    // Find a fix whose computed distance sits at the threshold or just below.
    let mut f = fix_at_distance(ARRIVAL_THRESHOLD_M, 1);
    let d = wayfind_rs::distance_meters(&f.point, &destination());
    if d > ARRIVAL_THRESHOLD_M {
        f = fix_at_distance(ARRIVAL_THRESHOLD_M - 1e-6, 1);
    }
    assert!(guide.update_fix(f).is_some());
    assert_eq!(guide.state(), NavState::Arrived);
}

#[test]
fn test_pointer_follows_bearing_minus_heading() {
    initialize_logger_once();
    let mut guide = tracking_guide();
    guide.update_fix(fix_at_distance(100.0, 0));

    // No heading yet: distance but no pointer.
    let readout = guide.readout();
    assert!(readout.distance_meters.is_some());
    assert_eq!(readout.pointer_degrees, None);

    // Destination is due north; facing east the arrow points left.
    guide.update_heading(90.0, HeadingConvention::TrueNorthClockwise);
    let pointer = guide.readout().pointer_degrees.unwrap();
    assert!((pointer - -90.0).abs() < 1e-3, "got {}", pointer);

    // Raw orientation alpha of 90 means the device faces west.
    guide.update_heading(90.0, HeadingConvention::CounterClockwise);
    let pointer = guide.readout().pointer_degrees.unwrap();
    assert!(
        (pointer - 90.0).abs() < 1e-3 || (pointer - -270.0).abs() < 1e-3,
        "got {}",
        pointer
    );
    assert_eq!(guide.session().device_heading_degrees, Some(270.0));
}

#[test]
fn test_standing_on_destination_keeps_last_bearing() {
    initialize_logger_once();
    let mut guide = tracking_guide();
    guide.update_fix(fix_at_distance(50.0, 0));
    guide.update_heading(0.0, HeadingConvention::TrueNorthClockwise);
    let before = guide.readout();

    let event = guide.update_fix(fix(destination()));
    assert!(matches!(event, Some(GuideEvent::Arrived { .. })));

    let after = guide.readout();
    assert_eq!(after.distance_meters, Some(0.0));
    assert_eq!(after.bearing_degrees, before.bearing_degrees);
    assert_eq!(after.pointer_degrees, before.pointer_degrees);
}

#[test]
fn test_non_finite_heading_is_ignored() {
    initialize_logger_once();
    let mut guide = tracking_guide();
    guide.update_fix(fix_at_distance(50.0, 0));
    guide.update_heading(30.0, HeadingConvention::TrueNorthClockwise);
    let before = guide.readout().pointer_degrees;

    guide.update_heading(f64::NAN, HeadingConvention::TrueNorthClockwise);
    assert_eq!(guide.readout().pointer_degrees, before);
}

#[test]
fn test_heading_smoothing_damps_jitter() {
    initialize_logger_once();
    let mut guide = NavigationGuide::new(destination())
        .unwrap()
        .with_heading_smoothing(0.3);
    guide.activate(PermissionState::Granted).unwrap();
    guide.update_fix(fix_at_distance(100.0, 0));

    guide.update_heading(0.0, HeadingConvention::TrueNorthClockwise);
    guide.update_heading(20.0, HeadingConvention::TrueNorthClockwise);
    let heading = guide.session().device_heading_degrees.unwrap();
    assert!((heading - 6.0).abs() < 1e-9, "got {}", heading);
}

#[test]
fn test_late_permission_answers_are_ignored() {
    initialize_logger_once();
    let mut guide = tracking_guide();
    guide.resolve_permission(PermissionState::Denied).unwrap();
    assert_eq!(guide.state(), NavState::Tracking);

    guide.activate(PermissionState::Denied).unwrap();
    assert_eq!(guide.state(), NavState::Tracking);
}
