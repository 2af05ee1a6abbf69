// src/entity.rs

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// The four kinds of campus entity a visitor can search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Building,
    Room,
    Bathroom,
    Faculty,
}

impl EntityKind {
    /// All kinds, in the order results are merged for an "all" search.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Building,
        EntityKind::Room,
        EntityKind::Bathroom,
        EntityKind::Faculty,
    ];

    /// Human-facing category label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Building => "edificio",
            EntityKind::Room => "sala",
            EntityKind::Bathroom => "bano",
            EntityKind::Faculty => "facultad",
        }
    }
}

/// A campus building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Walking entrance, used as an intermediate routing waypoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrance: Option<GeoPoint>,
}

/// A room (classroom, lab, office) that usually sits inside a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bathroom {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// An academic faculty. Most faculty records carry no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Any searchable campus entity, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchableEntity {
    Building(Building),
    Room(Room),
    Bathroom(Bathroom),
    Faculty(Faculty),
}

impl SearchableEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            SearchableEntity::Building(_) => EntityKind::Building,
            SearchableEntity::Room(_) => EntityKind::Room,
            SearchableEntity::Bathroom(_) => EntityKind::Bathroom,
            SearchableEntity::Faculty(_) => EntityKind::Faculty,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SearchableEntity::Building(b) => &b.id,
            SearchableEntity::Room(r) => &r.id,
            SearchableEntity::Bathroom(b) => &b.id,
            SearchableEntity::Faculty(f) => &f.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            SearchableEntity::Building(b) => &b.name,
            SearchableEntity::Room(r) => &r.name,
            SearchableEntity::Bathroom(b) => &b.name,
            SearchableEntity::Faculty(f) => &f.name,
        }
    }

    pub fn category(&self) -> &'static str {
        self.kind().label()
    }

    /// The secondary searchable name. Only buildings and rooms have one.
    pub fn acronym(&self) -> Option<&str> {
        match self {
            SearchableEntity::Building(b) => b.acronym.as_deref(),
            SearchableEntity::Room(r) => r.acronym.as_deref(),
            SearchableEntity::Bathroom(_) | SearchableEntity::Faculty(_) => None,
        }
    }

    /// The entity's own coordinates, without any parent-building fallback.
    pub fn location(&self) -> Option<GeoPoint> {
        match self {
            SearchableEntity::Building(b) => b.location,
            SearchableEntity::Room(r) => r.location,
            SearchableEntity::Bathroom(b) => b.location,
            SearchableEntity::Faculty(f) => f.location,
        }
    }

    /// The id of the building containing this entity, if any.
    pub fn building_id(&self) -> Option<&str> {
        match self {
            SearchableEntity::Room(r) => r.building_id.as_deref(),
            SearchableEntity::Bathroom(b) => b.building_id.as_deref(),
            SearchableEntity::Building(_) | SearchableEntity::Faculty(_) => None,
        }
    }
}
