//! Proximity-aware campus entity search and live walking guidance.
//!
//! ```rust
//! use wayfind_rs::{search, Catalog};
//! # use wayfind_rs::WayfindError;
//! # fn main() -> Result<(), WayfindError> {
//! let catalog = Catalog::from_json(
//!     r#"{"buildings": [{"id": "b1", "name": "Casa Central", "acronym": "CC",
//!          "location": {"latitude": -33.0367, "longitude": -71.5963}}]}"#,
//! )?;
//! let results = search(&catalog, "cc", "all", None)?;
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod entity;
pub mod error;
pub mod frame;
pub mod geo;
pub mod guidance;
pub mod heading;
pub mod location;
pub mod navigation;
pub mod route;
pub mod search;
pub mod subscription;

pub use catalog::Catalog;
pub use config::WayfindConfig;
pub use debounce::{Debouncer, SearchDebouncer, SearchOutcome};
pub use entity::{Bathroom, Building, EntityKind, Faculty, Room, SearchableEntity};
pub use error::{Sensor, WayfindError};
pub use geo::{distance_meters, initial_bearing_degrees, is_valid_point, GeoPoint};
pub use guidance::{GuidanceSession, GuidanceUpdate};
pub use heading::{HeadingConvention, HeadingSource, PermissionState};
pub use location::{FixStatus, LocationFix, LocationSession, PositionSample, PositionSource};
pub use navigation::{GuidanceReadout, GuideEvent, NavState, NavigationGuide, ARRIVAL_THRESHOLD_M};
pub use route::{plan_waypoints, request_route, RoutingEngine};
pub use search::{search, search_typed, RankedResult, TypeFilter};
pub use subscription::Subscription;
