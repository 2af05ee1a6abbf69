// src/route.rs

use std::future::Future;

use crate::catalog::Catalog;
use crate::entity::SearchableEntity;
use crate::error::WayfindError;
use crate::geo::{is_valid_point, GeoPoint};

/// An external service that turns waypoints into a walkable path.
pub trait RoutingEngine {
    /// Returns the path through `waypoints`, in order.
    fn route(
        &self,
        waypoints: &[GeoPoint],
    ) -> impl Future<Output = Result<Vec<GeoPoint>, WayfindError>> + Send;
}

/// Assembles the waypoint list for walking from `origin` to `destination`.
///
/// The list is `[origin, entrance, destination]` when the destination is a
/// building with a known entrance, or sits inside one; otherwise
/// `[origin, destination]`. An entrance equal to either end is left out.
pub fn plan_waypoints(
    catalog: &Catalog,
    origin: &GeoPoint,
    destination: &SearchableEntity,
) -> Result<Vec<GeoPoint>, WayfindError> {
    if !is_valid_point(origin) {
        return Err(WayfindError::invalid_coordinates(
            origin.latitude,
            origin.longitude,
        ));
    }
    let target = catalog.resolve_location(destination).ok_or_else(|| {
        WayfindError::DegenerateInput(format!(
            "{} {:?} has no location to route to",
            destination.category(),
            destination.display_name()
        ))
    })?;

    let building = match destination {
        SearchableEntity::Building(b) => Some(b),
        other => catalog.parent_building(other),
    };
    let entrance = building
        .and_then(|b| b.entrance)
        .filter(|e| is_valid_point(e) && e != origin && *e != target);

    let mut waypoints = Vec::with_capacity(3);
    waypoints.push(*origin);
    waypoints.extend(entrance);
    waypoints.push(target);
    Ok(waypoints)
}

/// Plans waypoints toward `destination` and asks `engine` for the path.
pub async fn request_route<R>(
    engine: &R,
    catalog: &Catalog,
    origin: &GeoPoint,
    destination: &SearchableEntity,
) -> Result<Vec<GeoPoint>, WayfindError>
where
    R: RoutingEngine,
{
    let waypoints = plan_waypoints(catalog, origin, destination)?;
    log::debug!(
        "Requesting route through {} waypoints to {:?}",
        waypoints.len(),
        destination.display_name()
    );
    engine.route(&waypoints).await
}
