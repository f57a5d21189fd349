/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::tools::error::AppError;
use chrono::Utc;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::warn;

/// Process-local system of record for vehicles and trips. Every write is a
/// full-record field update; concurrent dashboard readers and the single
/// position-writer task share it under last-write-wins semantics.
pub struct FleetStore {
    vehicles: RwLock<FxHashMap<VehicleId, Vehicle>>,
    trips: RwLock<FxHashMap<TripId, Trip>>,
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetStore {
    pub fn new() -> Self {
        FleetStore {
            vehicles: RwLock::new(FxHashMap::default()),
            trips: RwLock::new(FxHashMap::default()),
        }
    }

    pub async fn upsert_vehicle(&self, vehicle: Vehicle) {
        self.vehicles
            .write()
            .await
            .insert(vehicle.vehicle_id.to_owned(), vehicle);
    }

    pub async fn vehicle(&self, vehicle_id: &VehicleId) -> Result<Vehicle, AppError> {
        self.vehicles
            .read()
            .await
            .get(vehicle_id)
            .cloned()
            .ok_or_else(|| AppError::VehicleNotFound(vehicle_id.inner()))
    }

    pub async fn set_vehicle_status(
        &self,
        vehicle_id: &VehicleId,
        status: VehicleStatus,
    ) -> Result<(), AppError> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| AppError::VehicleNotFound(vehicle_id.inner()))?;
        vehicle.status = status;
        Ok(())
    }

    /// Snapshot of all vehicles in marker shape, sorted by id so polling
    /// clients see a stable order.
    pub async fn vehicle_markers(&self) -> Vec<VehicleMarker> {
        let mut markers: Vec<VehicleMarker> = self
            .vehicles
            .read()
            .await
            .values()
            .map(Vehicle::marker)
            .collect();
        markers.sort_by(|a, b| a.id.cmp(&b.id));
        markers
    }

    pub async fn create_trip(&self, trip: Trip) -> Result<(), AppError> {
        self.vehicle(&trip.vehicle_id).await?;

        let mut trips = self.trips.write().await;
        let open_trip = trips.values().any(|existing| {
            existing.vehicle_id == trip.vehicle_id
                && matches!(existing.status, TripStatus::NEW | TripStatus::INPROGRESS)
        });
        if open_trip {
            return Err(AppError::ActiveTripExists(trip.vehicle_id.inner()));
        }

        trips.insert(trip.trip_id.to_owned(), trip);
        Ok(())
    }

    pub async fn trip(&self, trip_id: &TripId) -> Result<Trip, AppError> {
        self.trips
            .read()
            .await
            .get(trip_id)
            .cloned()
            .ok_or_else(|| AppError::TripNotFound(trip_id.inner()))
    }

    /// NEW -> INPROGRESS. The trip's start coordinates, when known, seed
    /// its current position so the route is drawable before the first fix.
    pub async fn start_trip(&self, trip_id: &TripId) -> Result<Trip, AppError> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .get_mut(trip_id)
            .ok_or_else(|| AppError::TripNotFound(trip_id.inner()))?;

        if trip.status != TripStatus::NEW {
            return Err(AppError::InvalidTripStatus(
                trip_id.inner(),
                trip.status.to_string(),
            ));
        }

        trip.status = TripStatus::INPROGRESS;
        if trip.current_point.is_none() {
            trip.current_point = trip.start_point.to_owned();
        }
        trip.updated_at = TimeStamp(Utc::now());
        let trip = trip.to_owned();
        drop(trips);

        let _ = self
            .set_vehicle_status(&trip.vehicle_id, VehicleStatus::Active)
            .await;

        Ok(trip)
    }

    /// INPROGRESS -> COMPLETED. An optional final fix becomes the trip's
    /// last position and is mirrored onto the vehicle.
    pub async fn end_trip(&self, trip_id: &TripId, final_point: Option<Point>) -> Result<Trip, AppError> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .get_mut(trip_id)
            .ok_or_else(|| AppError::TripNotFound(trip_id.inner()))?;

        if trip.status != TripStatus::INPROGRESS {
            return Err(AppError::InvalidTripStatus(
                trip_id.inner(),
                trip.status.to_string(),
            ));
        }

        trip.status = TripStatus::COMPLETED;
        if let Some(point) = final_point {
            trip.current_point = Some(point);
        }
        trip.updated_at = TimeStamp(Utc::now());
        let trip = trip.to_owned();
        drop(trips);

        if let Some(point) = trip.current_point.to_owned() {
            self.mirror_vehicle_position(&trip.vehicle_id, point, trip.updated_at)
                .await;
        }
        let _ = self
            .set_vehicle_status(&trip.vehicle_id, VehicleStatus::Idle)
            .await;

        Ok(trip)
    }

    /// NEW | INPROGRESS -> CANCELLED.
    pub async fn cancel_trip(&self, trip_id: &TripId) -> Result<Trip, AppError> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .get_mut(trip_id)
            .ok_or_else(|| AppError::TripNotFound(trip_id.inner()))?;

        if !matches!(trip.status, TripStatus::NEW | TripStatus::INPROGRESS) {
            return Err(AppError::InvalidTripStatus(
                trip_id.inner(),
                trip.status.to_string(),
            ));
        }

        let was_in_progress = trip.status == TripStatus::INPROGRESS;
        trip.status = TripStatus::CANCELLED;
        trip.updated_at = TimeStamp(Utc::now());
        let trip = trip.to_owned();
        drop(trips);

        if was_in_progress {
            let _ = self
                .set_vehicle_status(&trip.vehicle_id, VehicleStatus::Idle)
                .await;
        }

        Ok(trip)
    }

    /// Applies one committed GPS update: the trip's current position moves
    /// and the same fix is mirrored onto the vehicle record. Commits for
    /// trips that completed in the meantime are dropped with a warning;
    /// the writer task must never crash on stale queue entries.
    pub async fn record_position(&self, commit: PositionCommit) {
        let mut trips = self.trips.write().await;
        match trips.get_mut(&commit.trip_id) {
            Some(trip) if trip.status == TripStatus::INPROGRESS => {
                trip.current_point = Some(commit.pt.to_owned());
                trip.updated_at = commit.ts;
            }
            _ => {
                warn!(
                    tag = "[STALE POSITION COMMIT]",
                    trip_id = %commit.trip_id.inner(),
                    "Dropping position commit for missing or inactive trip"
                );
                return;
            }
        }
        drop(trips);

        self.mirror_vehicle_position(&commit.vehicle_id, commit.pt, commit.ts)
            .await;
    }

    async fn mirror_vehicle_position(&self, vehicle_id: &VehicleId, point: Point, ts: TimeStamp) {
        let mut vehicles = self.vehicles.write().await;
        match vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.location = Some(point);
                vehicle.updated_at = Some(ts);
            }
            None => warn!(
                tag = "[STALE POSITION COMMIT]",
                vehicle_id = %vehicle_id.inner(),
                "Vehicle disappeared, skipping position mirror"
            ),
        }
    }

    /// The live active-route list: the projection of INPROGRESS trips that
    /// have a drawable position, sorted by vehicle id.
    pub async fn active_routes(&self) -> Vec<ActiveRoute> {
        let mut routes: Vec<ActiveRoute> = self
            .trips
            .read()
            .await
            .values()
            .filter_map(Trip::active_route)
            .collect();
        routes.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pt(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    fn now() -> TimeStamp {
        TimeStamp(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            vehicle_id: VehicleId(id.to_string()),
            plate: PlateNumber(format!("LD-{id}")),
            driver_id: Some(DriverId("drv-1".to_string())),
            status: VehicleStatus::Idle,
            location: None,
            updated_at: None,
        }
    }

    fn trip(id: &str, vehicle_id: &str) -> Trip {
        Trip {
            trip_id: TripId(id.to_string()),
            vehicle_id: VehicleId(vehicle_id.to_string()),
            driver_id: DriverId("drv-1".to_string()),
            status: TripStatus::NEW,
            start_location: Some("Luanda".to_string()),
            start_point: Some(pt(-8.839, 13.289)),
            destination: Some("Lobito".to_string()),
            destination_point: None,
            current_point: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn committed_position_is_mirrored_onto_the_vehicle() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        store.create_trip(trip("t1", "v1")).await.unwrap();
        store.start_trip(&TripId("t1".to_string())).await.unwrap();

        store
            .record_position(PositionCommit {
                vehicle_id: VehicleId("v1".to_string()),
                trip_id: TripId("t1".to_string()),
                pt: pt(-9.1, 13.3),
                ts: now(),
            })
            .await;

        let vehicle = store.vehicle(&VehicleId("v1".to_string())).await.unwrap();
        assert_eq!(vehicle.location, Some(pt(-9.1, 13.3)));

        let trip = store.trip(&TripId("t1".to_string())).await.unwrap();
        assert_eq!(trip.current_point, Some(pt(-9.1, 13.3)));
    }

    #[tokio::test]
    async fn active_routes_track_trip_lifecycle() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        store.create_trip(trip("t1", "v1")).await.unwrap();

        assert!(store.active_routes().await.is_empty());

        store.start_trip(&TripId("t1".to_string())).await.unwrap();
        let routes = store.active_routes().await;
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].start_location.as_deref(), Some("Luanda"));

        store
            .end_trip(&TripId("t1".to_string()), Some(pt(-12.36, 13.54)))
            .await
            .unwrap();
        assert!(store.active_routes().await.is_empty());
    }

    #[tokio::test]
    async fn starting_a_trip_marks_the_vehicle_active() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        store.create_trip(trip("t1", "v1")).await.unwrap();
        store.start_trip(&TripId("t1".to_string())).await.unwrap();

        let vehicle = store.vehicle(&VehicleId("v1".to_string())).await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Active);
    }

    #[tokio::test]
    async fn second_open_trip_for_a_vehicle_is_rejected() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        store.create_trip(trip("t1", "v1")).await.unwrap();

        let second = store.create_trip(trip("t2", "v1")).await;
        assert!(matches!(second, Err(AppError::ActiveTripExists(_))));
    }

    #[tokio::test]
    async fn stale_commit_for_completed_trip_is_dropped() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        store.create_trip(trip("t1", "v1")).await.unwrap();
        store.start_trip(&TripId("t1".to_string())).await.unwrap();
        store
            .end_trip(&TripId("t1".to_string()), None)
            .await
            .unwrap();

        store
            .record_position(PositionCommit {
                vehicle_id: VehicleId("v1".to_string()),
                trip_id: TripId("t1".to_string()),
                pt: pt(-9.9, 13.3),
                ts: now(),
            })
            .await;

        let trip = store.trip(&TripId("t1".to_string())).await.unwrap();
        assert_eq!(trip.status, TripStatus::COMPLETED);
        assert_ne!(trip.current_point, Some(pt(-9.9, 13.3)));
    }

    #[tokio::test]
    async fn trips_without_any_position_are_not_drawable() {
        let store = FleetStore::new();
        store.upsert_vehicle(vehicle("v1")).await;
        let mut no_start = trip("t1", "v1");
        no_start.start_point = None;
        store.create_trip(no_start).await.unwrap();
        store.start_trip(&TripId("t1".to_string())).await.unwrap();

        assert!(store.active_routes().await.is_empty());
    }
}
