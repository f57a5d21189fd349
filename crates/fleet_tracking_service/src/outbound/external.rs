/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::common::types::*;
use crate::tools::callapi::call_api;
use crate::tools::error::AppError;
use reqwest::{Method, Url};

const USER_AGENT: &str = concat!("fleet-tracking-service/", env!("CARGO_PKG_VERSION"));

/// Runs one free-text query against the geocoding service and returns the
/// candidate matches, best first.
pub async fn search_place(
    geocoding_url: &Url,
    query: &str,
    result_limit: u32,
) -> Result<Vec<GeocodeMatch>, AppError> {
    let mut url = geocoding_url.to_owned();
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("format", "json")
        .append_pair("limit", &result_limit.to_string());

    call_api::<Vec<GeocodeMatch>, String>(
        Method::GET,
        &url,
        vec![
            ("accept", "application/json"),
            ("user-agent", USER_AGENT),
        ],
        None,
    )
    .await
}

/// Requests a driving route with full path geometry between two points.
/// The routing service expects coordinates as `lng,lat` pairs in the path.
pub async fn fetch_driving_route(
    routing_url: &Url,
    origin: &Point,
    destination: &Point,
) -> Result<RoutingResponse, AppError> {
    let mut url = routing_url.to_owned();
    url.path_segments_mut()
        .map_err(|_| {
            AppError::InvalidRequest(format!("Routing url cannot be a base : {routing_url}"))
        })?
        .pop_if_empty()
        .push(&format!(
            "{},{};{},{}",
            origin.lon.inner(),
            origin.lat.inner(),
            destination.lon.inner(),
            destination.lat.inner()
        ));
    url.query_pairs_mut()
        .append_pair("overview", "full")
        .append_pair("geometries", "geojson");

    call_api::<RoutingResponse, String>(
        Method::GET,
        &url,
        vec![
            ("accept", "application/json"),
            ("user-agent", USER_AGENT),
        ],
        None,
    )
    .await
}
