/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::common::update_throttle::UpdateThrottle;
use crate::tools::error::AppError;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

struct GpsWatch {
    trip_id: TripId,
    throttle: UpdateThrottle,
}

/// Per-vehicle GPS watch registry: acquired when a trip starts, released
/// when it ends. Location updates for a vehicle without an active watch
/// are rejected, and the per-watch throttle gates how often accepted fixes
/// become committed updates.
pub struct GpsWatchRegistry {
    watches: Mutex<FxHashMap<VehicleId, GpsWatch>>,
    window_secs: u64,
}

impl GpsWatchRegistry {
    pub fn new(window_secs: u64) -> Self {
        GpsWatchRegistry {
            watches: Mutex::new(FxHashMap::default()),
            window_secs,
        }
    }

    /// Registers a fresh watch for the vehicle. The throttle starts empty,
    /// so the first fix after trip start commits immediately.
    pub async fn register(&self, vehicle_id: VehicleId, trip_id: TripId) {
        self.watches.lock().await.insert(
            vehicle_id,
            GpsWatch {
                trip_id,
                throttle: UpdateThrottle::new(self.window_secs),
            },
        );
    }

    /// Releases the vehicle's watch, returning the trip it was tracking.
    pub async fn release(&self, vehicle_id: &VehicleId) -> Option<TripId> {
        self.watches
            .lock()
            .await
            .remove(vehicle_id)
            .map(|watch| watch.trip_id)
    }

    /// Gates one fix through the vehicle's watch: `Ok(Some(trip_id))` when
    /// the fix should be committed, `Ok(None)` when the throttle suppressed
    /// it, and an error when the vehicle has no active watch.
    pub async fn commit_gate(
        &self,
        vehicle_id: &VehicleId,
        at: TimeStamp,
    ) -> Result<Option<TripId>, AppError> {
        let mut watches = self.watches.lock().await;
        let watch = watches
            .get_mut(vehicle_id)
            .ok_or_else(|| AppError::VehicleNotInActiveTrip(vehicle_id.inner()))?;

        if watch.throttle.should_commit(at) {
            Ok(Some(watch.trip_id.to_owned()))
        } else {
            Ok(None)
        }
    }

    pub async fn trip_for(&self, vehicle_id: &VehicleId) -> Option<TripId> {
        self.watches
            .lock()
            .await
            .get(vehicle_id)
            .map(|watch| watch.trip_id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> TimeStamp {
        TimeStamp(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    fn vehicle() -> VehicleId {
        VehicleId("veh-1".to_string())
    }

    #[tokio::test]
    async fn updates_without_a_watch_are_rejected() {
        let registry = GpsWatchRegistry::new(10);
        let gate = registry.commit_gate(&vehicle(), at(0)).await;
        assert!(matches!(gate, Err(AppError::VehicleNotInActiveTrip(_))));
    }

    #[tokio::test]
    async fn watch_gates_commits_through_the_throttle() {
        let registry = GpsWatchRegistry::new(10);
        registry
            .register(vehicle(), TripId("trip-1".to_string()))
            .await;

        assert_eq!(
            registry.commit_gate(&vehicle(), at(0)).await.unwrap(),
            Some(TripId("trip-1".to_string()))
        );
        assert_eq!(registry.commit_gate(&vehicle(), at(5)).await.unwrap(), None);
        assert!(registry
            .commit_gate(&vehicle(), at(12))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn release_stops_the_watch() {
        let registry = GpsWatchRegistry::new(10);
        registry
            .register(vehicle(), TripId("trip-1".to_string()))
            .await;

        assert_eq!(
            registry.release(&vehicle()).await,
            Some(TripId("trip-1".to_string()))
        );
        assert!(registry.commit_gate(&vehicle(), at(20)).await.is_err());
    }
}
