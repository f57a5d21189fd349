/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::domain::types::ui::trip::*;
use crate::environment::AppState;
use crate::renderer::viewport::viewport_for_points;
use crate::tools::error::AppError;
use actix_web::web::Data;
use chrono::Utc;
use uuid::Uuid;

pub async fn trip_create(
    data: Data<AppState>,
    request_body: TripCreateRequest,
) -> Result<TripCreateResponse, AppError> {
    let trip_id = TripId(Uuid::new_v4().to_string());
    let now = TimeStamp(Utc::now());

    data.store
        .create_trip(Trip {
            trip_id: trip_id.to_owned(),
            vehicle_id: request_body.vehicle_id,
            driver_id: request_body.driver_id,
            status: TripStatus::NEW,
            start_location: request_body.start_location,
            start_point: request_body.start_point,
            destination: request_body.destination,
            destination_point: request_body.destination_point,
            current_point: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(TripCreateResponse { trip_id })
}

/// NEW -> INPROGRESS: the vehicle's GPS watch is acquired here, with a
/// fresh throttle so the first fix commits immediately.
pub async fn trip_start(data: Data<AppState>, trip_id: TripId) -> Result<APISuccess, AppError> {
    let trip = data.store.start_trip(&trip_id).await?;
    data.watches.register(trip.vehicle_id, trip.trip_id).await;

    Ok(APISuccess::default())
}

/// INPROGRESS -> COMPLETED: the watch is released whatever else happens,
/// so a vehicle never keeps streaming against a finished trip.
pub async fn trip_end(
    data: Data<AppState>,
    trip_id: TripId,
    request_body: TripEndRequest,
) -> Result<TripDetailsResponse, AppError> {
    let trip = data.store.end_trip(&trip_id, request_body.pt).await?;
    data.watches.release(&trip.vehicle_id).await;

    Ok(trip.into())
}

pub async fn trip_cancel(
    data: Data<AppState>,
    trip_id: TripId,
) -> Result<TripDetailsResponse, AppError> {
    let trip = data.store.cancel_trip(&trip_id).await?;
    data.watches.release(&trip.vehicle_id).await;

    Ok(trip.into())
}

pub async fn trip_details(
    data: Data<AppState>,
    trip_id: TripId,
) -> Result<TripDetailsResponse, AppError> {
    Ok(data.store.trip(&trip_id).await?.into())
}

/// Reconstructs the driving route between the trip's endpoints, resolving
/// free-text endpoints through the place lookup first. The route builder
/// itself never fails; only unresolvable endpoints are an error here.
pub async fn trip_route(
    data: Data<AppState>,
    trip_id: TripId,
) -> Result<TripRouteResponse, AppError> {
    let trip = data.store.trip(&trip_id).await?;

    let start = match (trip.start_point, &trip.start_location) {
        (Some(point), _) => Some(point),
        (None, Some(text)) => data.lookup.lookup(text).await,
        (None, None) => None,
    };
    let dest = match (trip.destination_point, &trip.destination) {
        (Some(point), _) => Some(point),
        (None, Some(text)) => data.lookup.lookup(text).await,
        (None, None) => None,
    };

    let (Some(start), Some(dest)) = (start, dest) else {
        return Err(AppError::TripRouteUnavailable(trip_id.inner()));
    };

    let route = data.route_builder.build(&start, &dest).await;
    let viewport = viewport_for_points(&route.geometry);

    Ok(TripRouteResponse { route, viewport })
}
