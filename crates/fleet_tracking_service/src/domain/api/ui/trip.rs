/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get, post,
    web::{Data, Json, Path},
};

use crate::{
    common::types::*,
    domain::{action::ui::trip, types::ui::trip::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/ui/trip/create")]
pub async fn trip_create(
    data: Data<AppState>,
    param_obj: Json<TripCreateRequest>,
) -> Result<Json<TripCreateResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(trip::trip_create(data, request_body).await?))
}

#[post("/ui/trip/{tripId}/start")]
pub async fn trip_start(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<APISuccess>, AppError> {
    let trip_id = TripId(path.into_inner());

    Ok(Json(trip::trip_start(data, trip_id).await?))
}

#[post("/ui/trip/{tripId}/end")]
pub async fn trip_end(
    data: Data<AppState>,
    param_obj: Json<TripEndRequest>,
    path: Path<String>,
) -> Result<Json<TripDetailsResponse>, AppError> {
    let request_body = param_obj.into_inner();
    let trip_id = TripId(path.into_inner());

    Ok(Json(trip::trip_end(data, trip_id, request_body).await?))
}

#[post("/ui/trip/{tripId}/cancel")]
pub async fn trip_cancel(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<TripDetailsResponse>, AppError> {
    let trip_id = TripId(path.into_inner());

    Ok(Json(trip::trip_cancel(data, trip_id).await?))
}

#[get("/ui/trip/{tripId}/route")]
pub async fn trip_route(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<TripRouteResponse>, AppError> {
    let trip_id = TripId(path.into_inner());

    Ok(Json(trip::trip_route(data, trip_id).await?))
}

#[get("/ui/trip/{tripId}")]
pub async fn trip_details(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<TripDetailsResponse>, AppError> {
    let trip_id = TripId(path.into_inner());

    Ok(Json(trip::trip_details(data, trip_id).await?))
}
