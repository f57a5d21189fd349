/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use serde::Deserialize;

/// One candidate match from the geocoding service. Latitude/longitude are
/// string-encoded on the wire.
#[derive(Debug, Deserialize, Clone)]
pub struct GeocodeMatch {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

/// Top-level routing service response. `code` is "Ok" on success;
/// `routes` may be absent or empty even then.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<RoutingRoute>,
}

/// Distance is in meters, duration in seconds.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: RoutingGeometry,
}

/// GeoJSON LineString geometry: coordinate pairs in `[lng, lat]` order.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingGeometry {
    pub coordinates: Vec<[f64; 2]>,
    #[serde(rename = "type")]
    pub geometry_type: String,
}
