//! Geographic reference data for the village map display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WGS-84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A named polygon covering part of the village.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapArea {
    pub id: Uuid,
    pub name: String,
    /// Boundary vertices in draw order.
    pub polygon: Vec<GeoPoint>,
    /// Display color as a CSS hex string.
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a map area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMapArea {
    pub name: String,
    pub polygon: Vec<GeoPoint>,
    pub color: Option<String>,
}

/// Partial update for a map area. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapAreaUpdate {
    pub name: Option<String>,
    pub polygon: Option<Vec<GeoPoint>>,
    pub color: Option<String>,
}

impl MapAreaUpdate {
    /// Merge the supplied fields over `area`.
    pub fn apply(self, area: &mut MapArea) {
        if let Some(name) = self.name {
            area.name = name;
        }
        if let Some(polygon) = self.polygon {
            area.polygon = polygon;
        }
        if let Some(color) = self.color {
            area.color = Some(color);
        }
    }
}

/// What a point location on the map represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    HealthPost,
    Clinic,
    Pharmacy,
    PatientHome,
    Other,
}

/// A named point of interest on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub id: Uuid,
    pub name: String,
    pub kind: LocationKind,
    pub point: GeoPoint,
    /// The area this location sits in, when known.
    pub area_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a map location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMapLocation {
    pub name: String,
    pub kind: LocationKind,
    pub point: GeoPoint,
    pub area_id: Option<Uuid>,
}

/// Partial update for a map location. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapLocationUpdate {
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub point: Option<GeoPoint>,
    pub area_id: Option<Option<Uuid>>,
}

impl MapLocationUpdate {
    /// Merge the supplied fields over `location`.
    pub fn apply(self, location: &mut MapLocation) {
        if let Some(name) = self.name {
            location.name = name;
        }
        if let Some(kind) = self.kind {
            location.kind = kind;
        }
        if let Some(point) = self.point {
            location.point = point;
        }
        if let Some(area_id) = self.area_id {
            location.area_id = area_id;
        }
    }
}
