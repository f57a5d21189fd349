/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::domain::types::ui::map::*;
use crate::environment::AppState;
use crate::renderer::surface::MapScene;
use crate::tools::error::AppError;
use actix_web::web::Data;

pub async fn open_map_session(data: Data<AppState>) -> MapSessionResponse {
    let session_id = data.sessions.open(data.lookup.to_owned()).await;

    MapSessionResponse { session_id }
}

/// The dashboard's poll: reconciles the session's surface against fresh
/// vehicle/active-route snapshots and returns the updated scene. The two
/// snapshots are read independently and may be momentarily inconsistent;
/// the renderer tolerates that.
pub async fn poll_map_session(
    data: Data<AppState>,
    session_id: SessionId,
) -> Result<MapScene, AppError> {
    let session = data.sessions.get(&session_id).await?;

    let vehicles = data.store.vehicle_markers().await;
    let routes = data.store.active_routes().await;

    let mut session = session.lock().await;
    session.live.reconcile(&vehicles, &routes).await;

    Ok(session.live.surface().to_owned())
}

/// Changes the session's selected vehicle and returns the restyled scene,
/// viewport included when the selection has an active route.
pub async fn select_vehicle(
    data: Data<AppState>,
    session_id: SessionId,
    request_body: SelectVehicleRequest,
) -> Result<MapScene, AppError> {
    let session = data.sessions.get(&session_id).await?;
    let routes = data.store.active_routes().await;

    let mut session = session.lock().await;
    session.live.select(request_body.vehicle_id, &routes).await;

    Ok(session.live.surface().to_owned())
}

pub async fn close_map_session(
    data: Data<AppState>,
    session_id: SessionId,
) -> Result<APISuccess, AppError> {
    data.sessions.close(&session_id).await?;

    Ok(APISuccess::default())
}
