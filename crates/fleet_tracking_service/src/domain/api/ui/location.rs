/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    post,
    web::{Data, Json},
    HttpRequest,
};

use crate::{
    common::types::*,
    domain::{action::ui::location, types::ui::location::*},
    environment::AppState,
    tools::error::AppError,
};

fn vehicle_id_header(req: &HttpRequest) -> Result<VehicleId, AppError> {
    req.headers()
        .get("vid")
        .and_then(|header_value| header_value.to_str().ok())
        .map(|vid_str| VehicleId(vid_str.to_string()))
        .ok_or(AppError::InvalidRequest("vid not found".to_string()))
}

#[post("/ui/driver/location")]
pub async fn update_driver_location(
    data: Data<AppState>,
    param_obj: Json<Vec<UpdateDriverLocationRequest>>,
    req: HttpRequest,
) -> Result<Json<APISuccess>, AppError> {
    let request_body = param_obj.into_inner();

    if request_body.is_empty() {
        return Err(AppError::InvalidRequest(
            "Vec<UpdateDriverLocationRequest> is empty".to_string(),
        ));
    }

    let vehicle_id = vehicle_id_header(&req)?;

    Ok(Json(
        location::update_driver_location(vehicle_id, data, request_body).await?,
    ))
}

#[post("/ui/driver/location/manual")]
pub async fn manual_driver_location(
    data: Data<AppState>,
    param_obj: Json<ManualLocationRequest>,
    req: HttpRequest,
) -> Result<Json<ManualLocationResponse>, AppError> {
    let request_body = param_obj.into_inner();
    let vehicle_id = vehicle_id_header(&req)?;

    Ok(Json(
        location::manual_location(vehicle_id, data, request_body).await?,
    ))
}

#[post("/ui/driver/gps/error")]
pub async fn gps_error(
    param_obj: Json<GpsErrorRequest>,
) -> Result<Json<GpsErrorResponse>, AppError> {
    Ok(Json(location::gps_error(param_obj.into_inner())))
}
