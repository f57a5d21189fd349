/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use std::{env::var, sync::Arc};

use crate::common::{
    geo_polygon::read_geo_polygon,
    geocode::{LocationResolver, NominatimBackend},
    gps_watch::GpsWatchRegistry,
    places::{Gazetteer, LookupChain, PlaceLookup},
    route::{OsrmPlanner, RouteBuilder},
    types::*,
};
use crate::renderer::session::MapSessionRegistry;
use crate::storage::FleetStore;
use crate::tools::logger::LoggerConfig;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logger_cfg: LoggerConfig,
    pub workers: usize,
    pub drainer_delay: u64,
    pub drainer_size: usize,
    pub geocoding_url: String,
    pub geocoding_result_limit: u32,
    pub geocoding_country: String,
    pub routing_url: String,
    pub min_location_accuracy: f64,
    pub gps_commit_window: u64,
    pub map_session_idle_ttl: u64,
    pub map_session_sweep_interval: u64,
    pub request_timeout: u64,
    pub log_unprocessible_req_body: Vec<String>,
    pub max_allowed_req_size: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FleetStore>,
    pub watches: Arc<GpsWatchRegistry>,
    pub sessions: Arc<MapSessionRegistry>,
    pub lookup: Arc<dyn PlaceLookup>,
    pub route_builder: Arc<RouteBuilder>,
    pub sender: Sender<PositionCommit>,
    pub polygon: Vec<MultiPolygonBody>,
    pub min_location_accuracy: Accuracy,
    pub drainer_delay: u64,
    pub drainer_size: usize,
    pub map_session_sweep_interval: u64,
    pub request_timeout: u64,
    pub log_unprocessible_req_body: Vec<String>,
    pub max_allowed_req_size: usize,
}

impl AppState {
    pub async fn new(app_config: AppConfig, sender: Sender<PositionCommit>) -> AppState {
        let geo_config_path = var("GEO_CONFIG").unwrap_or_else(|_| "./geo_config".to_string());
        let polygon = read_geo_polygon(&geo_config_path).expect("Failed to read geoJSON");

        let gazetteer_config_path =
            var("GAZETTEER_CONFIG").unwrap_or_else(|_| "./gazetteer_config".to_string());
        let gazetteer =
            Gazetteer::read_gazetteer(&gazetteer_config_path).expect("Failed to read gazetteer");

        let geocoding_url =
            Url::parse(app_config.geocoding_url.as_str()).expect("Failed to parse geocoding_url.");
        let routing_url =
            Url::parse(app_config.routing_url.as_str()).expect("Failed to parse routing_url.");

        let resolver = LocationResolver::new(
            Arc::new(NominatimBackend::new(
                geocoding_url,
                app_config.geocoding_result_limit,
            )),
            app_config.geocoding_country,
        );

        // Well-known places resolve locally; everything else goes to the
        // geocoding service with its fallback-query chain.
        let lookup: Arc<dyn PlaceLookup> = Arc::new(LookupChain::new(vec![
            Arc::new(gazetteer),
            Arc::new(resolver),
        ]));

        let route_builder = Arc::new(RouteBuilder::new(Arc::new(OsrmPlanner::new(routing_url))));

        AppState {
            store: Arc::new(FleetStore::new()),
            watches: Arc::new(GpsWatchRegistry::new(app_config.gps_commit_window)),
            sessions: Arc::new(MapSessionRegistry::new(app_config.map_session_idle_ttl)),
            lookup,
            route_builder,
            sender,
            polygon,
            min_location_accuracy: Accuracy(app_config.min_location_accuracy),
            drainer_delay: app_config.drainer_delay,
            drainer_size: app_config.drainer_size,
            map_session_sweep_interval: app_config.map_session_sweep_interval,
            request_timeout: app_config.request_timeout,
            log_unprocessible_req_body: app_config.log_unprocessible_req_body,
            max_allowed_req_size: app_config.max_allowed_req_size,
        }
    }
}
