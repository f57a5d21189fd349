/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod internal;
pub mod ui;

use actix_web::web::ServiceConfig;

pub fn handler(config: &mut ServiceConfig) {
    config
        .service(ui::location::update_driver_location)
        .service(ui::location::manual_driver_location)
        .service(ui::location::gps_error)
        .service(ui::healthcheck::health_check)
        .service(ui::trip::trip_create)
        .service(ui::trip::trip_start)
        .service(ui::trip::trip_end)
        .service(ui::trip::trip_cancel)
        .service(ui::trip::trip_route)
        .service(ui::trip::trip_details)
        .service(ui::fleet::fleet_vehicles)
        .service(ui::fleet::fleet_routes)
        .service(ui::map::open_map_session)
        .service(ui::map::poll_map_session)
        .service(ui::map::select_vehicle)
        .service(ui::map::close_map_session)
        .service(internal::vehicle::upsert_vehicle)
        .service(internal::vehicle::vehicle_details)
        .service(internal::vehicle::set_vehicle_status);
}
