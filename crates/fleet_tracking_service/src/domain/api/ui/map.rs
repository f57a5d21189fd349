/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
};

use crate::{
    common::types::*,
    domain::{action::ui::map, types::ui::map::*},
    environment::AppState,
    renderer::surface::MapScene,
    tools::error::AppError,
};

#[post("/ui/map/session")]
pub async fn open_map_session(data: Data<AppState>) -> Result<Json<MapSessionResponse>, AppError> {
    Ok(Json(map::open_map_session(data).await))
}

#[get("/ui/map/session/{sessionId}")]
pub async fn poll_map_session(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<MapScene>, AppError> {
    let session_id = SessionId(path.into_inner());

    Ok(Json(map::poll_map_session(data, session_id).await?))
}

#[post("/ui/map/session/{sessionId}/select")]
pub async fn select_vehicle(
    data: Data<AppState>,
    param_obj: Json<SelectVehicleRequest>,
    path: Path<String>,
) -> Result<Json<MapScene>, AppError> {
    let request_body = param_obj.into_inner();
    let session_id = SessionId(path.into_inner());

    Ok(Json(
        map::select_vehicle(data, session_id, request_body).await?,
    ))
}

#[delete("/ui/map/session/{sessionId}")]
pub async fn close_map_session(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<APISuccess>, AppError> {
    let session_id = SessionId(path.into_inner());

    Ok(Json(map::close_map_session(data, session_id).await?))
}
