//! Geographic reference data: map areas and point locations.
//!
//! Static display data with the same CRUD surface as every other table;
//! content normally ships in the seed dataset.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::map::{
    MapArea, MapAreaUpdate, MapLocation, MapLocationUpdate, NewMapArea, NewMapLocation,
};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore};

impl RecordStore {
    // ── Areas ─────────────────────────────────────────────────────────────────

    /// Create a map area.
    pub fn create_map_area(&self, new: NewMapArea) -> StoreResult<MapArea> {
        if new.name.trim().is_empty() {
            return Err(StoreError::validation("area name is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let area = MapArea {
            id: Uuid::new_v4(),
            name: new.name,
            polygon: new.polygon,
            color: new.color,
            created_at: now,
            updated_at: now,
        };

        state.data.map_areas.push(area.clone());
        self.persist(keys::MAP_AREAS, &state.data.map_areas)?;

        debug!(area_id = %area.id, name = %area.name, "map area created");
        Ok(area)
    }

    /// Plain lookup; `None` when absent.
    pub fn map_area_by_id(&self, id: Uuid) -> Option<MapArea> {
        self.lock().area_by_id(id)
    }

    /// Every area, sorted by name.
    pub fn list_map_areas(&self) -> Vec<MapArea> {
        let mut areas = self.lock().data.map_areas.clone();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        areas
    }

    /// Merge `update` over the area.
    pub fn update_map_area(&self, id: Uuid, update: MapAreaUpdate) -> StoreResult<MapArea> {
        let mut state = self.lock();
        let area = state
            .data
            .map_areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("map area", id))?;

        let prev_updated = area.updated_at;
        update.apply(area);
        area.updated_at = touch_after(prev_updated);
        let area = area.clone();

        self.persist(keys::MAP_AREAS, &state.data.map_areas)?;
        Ok(area)
    }

    /// Hard delete. Locations and profiles pointing at the area keep their
    /// reference; joins resolve to `None`.
    pub fn delete_map_area(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.map_areas.len();
        state.data.map_areas.retain(|a| a.id != id);
        if state.data.map_areas.len() == before {
            return Err(StoreError::not_found("map area", id));
        }
        self.persist(keys::MAP_AREAS, &state.data.map_areas)
    }

    // ── Locations ─────────────────────────────────────────────────────────────

    /// Create a point location.
    pub fn create_map_location(&self, new: NewMapLocation) -> StoreResult<MapLocation> {
        if new.name.trim().is_empty() {
            return Err(StoreError::validation("location name is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let location = MapLocation {
            id: Uuid::new_v4(),
            name: new.name,
            kind: new.kind,
            point: new.point,
            area_id: new.area_id,
            created_at: now,
            updated_at: now,
        };

        state.data.map_locations.push(location.clone());
        self.persist(keys::MAP_LOCATIONS, &state.data.map_locations)?;

        debug!(location_id = %location.id, name = %location.name, "map location created");
        Ok(location)
    }

    /// Every location, sorted by name.
    pub fn list_map_locations(&self) -> Vec<MapLocation> {
        let mut locations = self.lock().data.map_locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        locations
    }

    /// The locations inside one area, sorted by name.
    pub fn map_locations_in_area(&self, area_id: Uuid) -> Vec<MapLocation> {
        self.list_map_locations()
            .into_iter()
            .filter(|l| l.area_id == Some(area_id))
            .collect()
    }

    /// Merge `update` over the location.
    pub fn update_map_location(
        &self,
        id: Uuid,
        update: MapLocationUpdate,
    ) -> StoreResult<MapLocation> {
        let mut state = self.lock();
        let location = state
            .data
            .map_locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::not_found("map location", id))?;

        let prev_updated = location.updated_at;
        update.apply(location);
        location.updated_at = touch_after(prev_updated);
        let location = location.clone();

        self.persist(keys::MAP_LOCATIONS, &state.data.map_locations)?;
        Ok(location)
    }

    /// Hard delete.
    pub fn delete_map_location(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.map_locations.len();
        state.data.map_locations.retain(|l| l.id != id);
        if state.data.map_locations.len() == before {
            return Err(StoreError::not_found("map location", id));
        }
        self.persist(keys::MAP_LOCATIONS, &state.data.map_locations)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use carelink_contracts::map::{
        GeoPoint, LocationKind, MapAreaUpdate, NewMapArea, NewMapLocation,
    };

    use crate::testutil::open_store;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    #[test]
    fn areas_and_locations_round_trip_sorted_by_name() {
        let store = open_store();
        let north = store
            .create_map_area(NewMapArea {
                name: "North Village".to_string(),
                polygon: vec![point(18.80, 98.98), point(18.81, 98.98), point(18.81, 98.99)],
                color: Some("#4caf50".to_string()),
            })
            .unwrap();
        store
            .create_map_area(NewMapArea {
                name: "East Fields".to_string(),
                polygon: vec![point(18.79, 99.00), point(18.80, 99.00), point(18.80, 99.01)],
                color: None,
            })
            .unwrap();

        let areas = store.list_map_areas();
        assert_eq!(areas[0].name, "East Fields");
        assert_eq!(areas[1].name, "North Village");

        store
            .create_map_location(NewMapLocation {
                name: "Health Post 1".to_string(),
                kind: LocationKind::HealthPost,
                point: point(18.805, 98.985),
                area_id: Some(north.id),
            })
            .unwrap();
        store
            .create_map_location(NewMapLocation {
                name: "River Pharmacy".to_string(),
                kind: LocationKind::Pharmacy,
                point: point(18.795, 99.005),
                area_id: None,
            })
            .unwrap();

        assert_eq!(store.map_locations_in_area(north.id).len(), 1);
        assert_eq!(store.list_map_locations().len(), 2);
    }

    #[test]
    fn area_update_merges_and_refreshes_updated_at() {
        let store = open_store();
        let area = store
            .create_map_area(NewMapArea {
                name: "North Village".to_string(),
                polygon: vec![point(18.80, 98.98)],
                color: None,
            })
            .unwrap();

        let updated = store
            .update_map_area(
                area.id,
                MapAreaUpdate {
                    color: Some("#ff9800".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, area.name);
        assert_eq!(updated.color.as_deref(), Some("#ff9800"));
        assert!(updated.updated_at > area.updated_at);
    }

    #[test]
    fn deleting_an_area_leaves_its_locations_dangling() {
        let store = open_store();
        let area = store
            .create_map_area(NewMapArea {
                name: "North Village".to_string(),
                polygon: vec![point(18.80, 98.98)],
                color: None,
            })
            .unwrap();
        let location = store
            .create_map_location(NewMapLocation {
                name: "Health Post 1".to_string(),
                kind: LocationKind::HealthPost,
                point: point(18.805, 98.985),
                area_id: Some(area.id),
            })
            .unwrap();

        store.delete_map_area(area.id).unwrap();

        let kept = store.list_map_locations();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].area_id, Some(area.id));
        assert_eq!(store.map_area_by_id(area.id), None);
        assert_eq!(location.kind, LocationKind::HealthPost);
    }
}
