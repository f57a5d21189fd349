/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::renderer::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// Start and destination may each arrive as free text, coordinates, or
/// both; text-only endpoints are resolved lazily when something needs to
/// be drawn or routed.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripCreateRequest {
    pub vehicle_id: VehicleId,
    pub driver_id: DriverId,
    pub start_location: Option<String>,
    pub start_point: Option<Point>,
    pub destination: Option<String>,
    pub destination_point: Option<Point>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripCreateResponse {
    pub trip_id: TripId,
}

/// Optional final fix reported by the portal when the driver ends the trip.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TripEndRequest {
    pub pt: Option<Point>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripDetailsResponse {
    pub trip_id: TripId,
    pub vehicle_id: VehicleId,
    pub driver_id: DriverId,
    pub status: TripStatus,
    pub start_location: Option<String>,
    pub start_point: Option<Point>,
    pub destination: Option<String>,
    pub destination_point: Option<Point>,
    pub current_point: Option<Point>,
    pub updated_at: TimeStamp,
}

impl From<Trip> for TripDetailsResponse {
    fn from(trip: Trip) -> Self {
        TripDetailsResponse {
            trip_id: trip.trip_id,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            status: trip.status,
            start_location: trip.start_location,
            start_point: trip.start_point,
            destination: trip.destination,
            destination_point: trip.destination_point,
            current_point: trip.current_point,
            updated_at: trip.updated_at,
        }
    }
}

/// The reconstructed driving route plus the viewport the dashboard should
/// apply to show it in full.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripRouteResponse {
    pub route: RouteInfo,
    pub viewport: Option<Viewport>,
}
