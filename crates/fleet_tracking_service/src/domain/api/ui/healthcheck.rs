/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get,
    web::{Data, Json},
};

use crate::{common::types::APISuccess, environment::AppState, tools::error::AppError};

#[get("/healthcheck")]
async fn health_check(data: Data<AppState>) -> Result<Json<APISuccess>, AppError> {
    // Readable fleet store is the liveness signal.
    let _ = data.store.vehicle_markers().await;

    Ok(Json(APISuccess::default()))
}
