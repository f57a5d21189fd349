/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::domain::types::internal::vehicle::*;
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;

/// Registers or re-registers a vehicle. The last known position survives
/// re-registration; it only ever changes through the GPS pipeline.
pub async fn upsert_vehicle(
    data: Data<AppState>,
    request_body: VehicleRegisterRequest,
) -> Result<APISuccess, AppError> {
    let existing = data.store.vehicle(&request_body.vehicle_id).await.ok();

    data.store
        .upsert_vehicle(Vehicle {
            vehicle_id: request_body.vehicle_id,
            plate: request_body.plate,
            driver_id: request_body.driver_id,
            status: request_body
                .status
                .or(existing.as_ref().map(|vehicle| vehicle.status))
                .unwrap_or(VehicleStatus::Idle),
            location: existing.as_ref().and_then(|vehicle| vehicle.location.to_owned()),
            updated_at: existing.and_then(|vehicle| vehicle.updated_at),
        })
        .await;

    Ok(APISuccess::default())
}

pub async fn vehicle_details(
    data: Data<AppState>,
    vehicle_id: VehicleId,
) -> Result<Vehicle, AppError> {
    data.store.vehicle(&vehicle_id).await
}

pub async fn set_vehicle_status(
    data: Data<AppState>,
    vehicle_id: VehicleId,
    request_body: VehicleStatusRequest,
) -> Result<APISuccess, AppError> {
    data.store
        .set_vehicle_status(&vehicle_id, request_body.status)
        .await?;

    Ok(APISuccess::default())
}
