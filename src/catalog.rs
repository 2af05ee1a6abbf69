// src/catalog.rs

use std::collections::HashMap;

use serde::Deserialize;

use crate::entity::{Bathroom, Building, EntityKind, Faculty, Room, SearchableEntity};
use crate::error::WayfindError;
use crate::geo::{is_valid_point, GeoPoint};

/// Raw catalog document as exported by the admin panel.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogDocument {
    buildings: Vec<Building>,
    rooms: Vec<Room>,
    bathrooms: Vec<Bathroom>,
    faculties: Vec<Faculty>,
}

/// In-memory, read-only view of the four searchable collections.
///
/// Every record is validated on the way in: a record carrying out-of-range
/// coordinates never enters the catalog, and `(0, 0)` points are stored as
/// unknown, so everything held here passes [`is_valid_point`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    buildings: Vec<SearchableEntity>,
    rooms: Vec<SearchableEntity>,
    bathrooms: Vec<SearchableEntity>,
    faculties: Vec<SearchableEntity>,
    building_index: HashMap<String, usize>,
    rejected: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalog from a JSON document with `buildings`, `rooms`,
    /// `bathrooms` and `faculties` arrays (each optional).
    ///
    /// Records with invalid coordinates are skipped and counted in
    /// [`Catalog::rejected`]; only malformed JSON fails the whole load.
    pub fn from_json(json: &str) -> Result<Self, WayfindError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let mut catalog = Catalog::new();

        let entities = document
            .buildings
            .into_iter()
            .map(SearchableEntity::Building)
            .chain(document.rooms.into_iter().map(SearchableEntity::Room))
            .chain(document.bathrooms.into_iter().map(SearchableEntity::Bathroom))
            .chain(document.faculties.into_iter().map(SearchableEntity::Faculty));

        for entity in entities {
            if let Err(e) = catalog.insert(entity) {
                log::warn!("Skipping catalog record: {}", e);
            }
        }

        log::debug!(
            "Loaded catalog: {} buildings, {} rooms, {} bathrooms, {} faculties ({} rejected)",
            catalog.buildings.len(),
            catalog.rooms.len(),
            catalog.bathrooms.len(),
            catalog.faculties.len(),
            catalog.rejected
        );
        Ok(catalog)
    }

    /// Adds an entity after validating its coordinates.
    ///
    /// Out-of-range or NaN coordinates reject the whole record. A `(0, 0)`
    /// location or entrance only means "not set": the record is kept with
    /// that point cleared.
    pub fn insert(&mut self, entity: SearchableEntity) -> Result<(), WayfindError> {
        let entity = match sanitize_record(entity) {
            Ok(entity) => entity,
            Err(e) => {
                self.rejected += 1;
                return Err(e);
            }
        };

        match entity.kind() {
            EntityKind::Building => {
                self.building_index
                    .insert(entity.id().to_string(), self.buildings.len());
                self.buildings.push(entity);
            }
            EntityKind::Room => self.rooms.push(entity),
            EntityKind::Bathroom => self.bathrooms.push(entity),
            EntityKind::Faculty => self.faculties.push(entity),
        }
        Ok(())
    }

    /// All entities of one kind, in insertion order.
    pub fn of_kind(&self, kind: EntityKind) -> &[SearchableEntity] {
        match kind {
            EntityKind::Building => &self.buildings,
            EntityKind::Room => &self.rooms,
            EntityKind::Bathroom => &self.bathrooms,
            EntityKind::Faculty => &self.faculties,
        }
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        let index = *self.building_index.get(id)?;
        match &self.buildings[index] {
            SearchableEntity::Building(b) => Some(b),
            _ => None,
        }
    }

    /// The building that contains `entity`, if it references one we know about.
    pub fn parent_building(&self, entity: &SearchableEntity) -> Option<&Building> {
        entity.building_id().and_then(|id| self.building(id))
    }

    /// Where an entity physically is.
    ///
    /// Rooms and bathrooms without coordinates of their own fall back to their
    /// building's location. Faculties without coordinates have no location.
    pub fn resolve_location(&self, entity: &SearchableEntity) -> Option<GeoPoint> {
        entity
            .location()
            .or_else(|| self.parent_building(entity).and_then(|b| b.location))
            .filter(is_valid_point)
    }

    pub fn len(&self) -> usize {
        self.buildings.len() + self.rooms.len() + self.bathrooms.len() + self.faculties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records refused because of invalid coordinates.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

fn sanitize_record(mut entity: SearchableEntity) -> Result<SearchableEntity, WayfindError> {
    let (location, entrance) = match &mut entity {
        SearchableEntity::Building(b) => (&mut b.location, Some(&mut b.entrance)),
        SearchableEntity::Room(r) => (&mut r.location, None),
        SearchableEntity::Bathroom(b) => (&mut b.location, None),
        SearchableEntity::Faculty(f) => (&mut f.location, None),
    };
    clear_unset(location)?;
    if let Some(entrance) = entrance {
        clear_unset(entrance)?;
    }
    Ok(entity)
}

/// Fails on out-of-range points and drops the `(0, 0)` sentinel.
fn clear_unset(slot: &mut Option<GeoPoint>) -> Result<(), WayfindError> {
    let Some(point) = *slot else {
        return Ok(());
    };
    GeoPoint::new(point.latitude, point.longitude)?;
    if !is_valid_point(&point) {
        log::debug!("Clearing unset coordinates ({}, {})", point.latitude, point.longitude);
        *slot = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_skips_out_of_range_records() {
        let json = r#"{
            "buildings": [
                {
                    "id": "b1",
                    "name": "Casa Central",
                    "location": {"latitude": -33.04, "longitude": -71.60}
                },
                {
                    "id": "b2",
                    "name": "Fuera de rango",
                    "location": {"latitude": 120.0, "longitude": -71.60}
                }
            ],
            "faculties": [{"id": "f1", "name": "Ingenieria"}]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.of_kind(EntityKind::Building).len(), 1);
        assert_eq!(catalog.of_kind(EntityKind::Faculty).len(), 1);
        assert_eq!(catalog.rejected(), 1);
        assert!(catalog.building("b2").is_none());
    }

    #[test]
    fn test_unset_coordinates_are_cleared_not_rejected() {
        let json = r#"{
            "buildings": [{
                "id": "b1",
                "name": "Gimnasio",
                "location": {"latitude": 0.0, "longitude": 0.0},
                "entrance": {"latitude": 0.0, "longitude": 0.0}
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.rejected(), 0);
        let building = catalog.building("b1").unwrap();
        assert_eq!(building.location, None);
        assert_eq!(building.entrance, None);
    }

    #[test]
    fn test_room_falls_back_to_building_location() {
        let json = r#"{
            "buildings": [{
                "id": "b1",
                "name": "Edificio A",
                "location": {"latitude": -33.04, "longitude": -71.60}
            }],
            "rooms": [{"id": "r1", "name": "A-101", "buildingId": "b1"}]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let room = &catalog.of_kind(EntityKind::Room)[0];
        let location = catalog.resolve_location(room).unwrap();
        assert_eq!(location.latitude, -33.04);
    }
}
