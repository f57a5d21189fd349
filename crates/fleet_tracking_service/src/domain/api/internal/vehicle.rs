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
    domain::{action::internal::vehicle, types::internal::vehicle::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/internal/vehicle")]
pub async fn upsert_vehicle(
    data: Data<AppState>,
    param_obj: Json<VehicleRegisterRequest>,
) -> Result<Json<APISuccess>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(vehicle::upsert_vehicle(data, request_body).await?))
}

#[get("/internal/vehicle/{vehicleId}")]
pub async fn vehicle_details(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle_id = VehicleId(path.into_inner());

    Ok(Json(vehicle::vehicle_details(data, vehicle_id).await?))
}

#[post("/internal/vehicle/{vehicleId}/status")]
pub async fn set_vehicle_status(
    data: Data<AppState>,
    param_obj: Json<VehicleStatusRequest>,
    path: Path<String>,
) -> Result<Json<APISuccess>, AppError> {
    let request_body = param_obj.into_inner();
    let vehicle_id = VehicleId(path.into_inner());

    Ok(Json(
        vehicle::set_vehicle_status(data, vehicle_id, request_body).await?,
    ))
}
