/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::environment::AppState;
use actix_web::web::Data;

// The two snapshots the dashboard polls. They are served from independent
// reads on purpose; the renderer absorbs one frame of skew between them.

pub async fn vehicle_markers(data: Data<AppState>) -> Vec<VehicleMarker> {
    data.store.vehicle_markers().await
}

pub async fn active_routes(data: Data<AppState>) -> Vec<ActiveRoute> {
    data.store.active_routes().await
}
