/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[macros::impl_getter]
pub struct VehicleId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
#[macros::impl_getter]
pub struct TripId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
#[macros::impl_getter]
pub struct DriverId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
#[macros::impl_getter]
pub struct PlateNumber(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
#[macros::impl_getter]
pub struct SessionId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
#[macros::impl_getter]
pub struct RegionName(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
#[macros::impl_getter]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
#[macros::impl_getter]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
#[macros::impl_getter]
pub struct Accuracy(pub f64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
#[macros::impl_getter]
pub struct TimeStamp(pub DateTime<Utc>);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
#[macros::impl_getter]
pub struct Kilometers(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
#[macros::impl_getter]
pub struct Minutes(pub f64);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lon: Longitude,
}

#[derive(Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy)]
pub enum VehicleStatus {
    #[strum(serialize = "active")]
    #[serde(rename = "active")]
    Active,
    #[strum(serialize = "idle")]
    #[serde(rename = "idle")]
    Idle,
    #[strum(serialize = "maintenance")]
    #[serde(rename = "maintenance")]
    Maintenance,
    #[strum(serialize = "alert")]
    #[serde(rename = "alert")]
    Alert,
}

#[derive(Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy)]
pub enum TripStatus {
    NEW,
    INPROGRESS,
    COMPLETED,
    CANCELLED,
}

/// Geolocation failure classes reported by the driver portal, mirroring the
/// browser Geolocation API error codes.
#[derive(Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy)]
pub enum GpsErrorKind {
    #[strum(serialize = "PERMISSION_DENIED")]
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,
    #[strum(serialize = "POSITION_UNAVAILABLE")]
    #[serde(rename = "POSITION_UNAVAILABLE")]
    PositionUnavailable,
    #[strum(serialize = "TIMEOUT")]
    #[serde(rename = "TIMEOUT")]
    Timeout,
}

/// Last known position and operational state of one vehicle, as consumed by
/// the live map. `location` is absent when the vehicle has never reported a
/// fix; such vehicles are excluded from rendering.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleMarker {
    pub id: VehicleId,
    pub plate: PlateNumber,
    pub location: Option<Point>,
    pub status: VehicleStatus,
    pub driver: Option<DriverId>,
}

/// Spatial state of an in-progress trip. Exists only while the trip status
/// is INPROGRESS; `start` may need to be recovered from `start_location`
/// free text before anything can be drawn.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRoute {
    pub vehicle_id: VehicleId,
    pub start: Option<Point>,
    pub current: Point,
    pub dest: Option<Point>,
    pub destination: Option<String>,
    pub start_location: Option<String>,
}

/// A reconstructed driving path between two points. Geometry is in drawing
/// order, first point = origin. Service-produced geometry has at least two
/// points; the straight-line fallback has exactly two.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub distance: Kilometers,
    pub duration: Minutes,
    pub geometry: Vec<Point>,
}

/// Persisted vehicle record. The authoritative copy of the last known
/// position lives here; markers are rebuilt from it on every poll.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    pub plate: PlateNumber,
    pub driver_id: Option<DriverId>,
    pub status: VehicleStatus,
    pub location: Option<Point>,
    pub updated_at: Option<TimeStamp>,
}

impl Vehicle {
    pub fn marker(&self) -> VehicleMarker {
        VehicleMarker {
            id: self.vehicle_id.to_owned(),
            plate: self.plate.to_owned(),
            location: self.location.to_owned(),
            status: self.status,
            driver: self.driver_id.to_owned(),
        }
    }
}

/// Persisted trip record. The active-route list is the projection of trips
/// whose status is INPROGRESS.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_id: TripId,
    pub vehicle_id: VehicleId,
    pub driver_id: DriverId,
    pub status: TripStatus,
    pub start_location: Option<String>,
    pub start_point: Option<Point>,
    pub destination: Option<String>,
    pub destination_point: Option<Point>,
    pub current_point: Option<Point>,
    pub created_at: TimeStamp,
    pub updated_at: TimeStamp,
}

impl Trip {
    /// Projects the trip into its active-route shape, when it has a drawable
    /// live position. Trips that have not reported a fix yet fall back to
    /// their start coordinates; with neither, there is nothing to draw.
    pub fn active_route(&self) -> Option<ActiveRoute> {
        if self.status != TripStatus::INPROGRESS {
            return None;
        }
        let current = self
            .current_point
            .to_owned()
            .or_else(|| self.start_point.to_owned())?;
        Some(ActiveRoute {
            vehicle_id: self.vehicle_id.to_owned(),
            start: self.start_point.to_owned(),
            current,
            dest: self.destination_point.to_owned(),
            destination: self.destination.to_owned(),
            start_location: self.start_location.to_owned(),
        })
    }
}

/// A committed driver location update on its way to the fleet store.
#[derive(Debug, Clone)]
pub struct PositionCommit {
    pub vehicle_id: VehicleId,
    pub trip_id: TripId,
    pub pt: Point,
    pub ts: TimeStamp,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct APISuccess {
    result: String,
}

impl Default for APISuccess {
    fn default() -> Self {
        Self {
            result: "Success".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct MultiPolygonBody {
    pub region: RegionName,
    pub multipolygon: MultiPolygon,
}
