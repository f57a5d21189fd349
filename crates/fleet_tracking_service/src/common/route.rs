/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::common::utils::distance_between_in_km;
use crate::outbound::external::fetch_driving_route;
use crate::outbound::types::RoutingResponse;
use crate::tools::error::AppError;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::info;

const ROUTING_SUCCESS_CODE: &str = "Ok";

/// Average-speed heuristic for the straight-line fallback: 1.5 minutes per
/// kilometer (40 km/h). Kept as-is for parity with the dashboard it
/// replaces.
pub const FALLBACK_MINUTES_PER_KM: f64 = 1.5;

/// Driving-route computation between two points. Trait seam so the
/// degradation path can be exercised without a routing server.
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn plan(&self, origin: &Point, destination: &Point) -> Result<RoutingResponse, AppError>;
}

pub struct OsrmPlanner {
    routing_url: Url,
}

impl OsrmPlanner {
    pub fn new(routing_url: Url) -> Self {
        OsrmPlanner { routing_url }
    }
}

#[async_trait]
impl RoutePlanner for OsrmPlanner {
    async fn plan(&self, origin: &Point, destination: &Point) -> Result<RoutingResponse, AppError> {
        fetch_driving_route(&self.routing_url, origin, destination).await
    }
}

/// Obtains a realistic driving path and its distance/duration between two
/// points, degrading to a direct great-circle line whenever the routing
/// service cannot help. Never fails: the caller always receives a drawable
/// result once both coordinates are known.
pub struct RouteBuilder {
    planner: Arc<dyn RoutePlanner>,
}

impl RouteBuilder {
    pub fn new(planner: Arc<dyn RoutePlanner>) -> Self {
        RouteBuilder { planner }
    }

    pub async fn build(&self, origin: &Point, destination: &Point) -> RouteInfo {
        let response = match self.planner.plan(origin, destination).await {
            Ok(response) => response,
            Err(err) => {
                info!(tag = "[ROUTE FALLBACK]", error = %err, "Routing call failed, using straight line");
                return self.straight_line(origin, destination);
            }
        };

        if response.code != ROUTING_SUCCESS_CODE {
            info!(tag = "[ROUTE FALLBACK]", code = %response.code, "Routing service unsuccessful, using straight line");
            return self.straight_line(origin, destination);
        }

        let Some(route) = response.routes.first() else {
            info!(tag = "[ROUTE FALLBACK]", "Routing service returned zero routes, using straight line");
            return self.straight_line(origin, destination);
        };

        // Service geometry arrives as (lng, lat) pairs; reorder for drawing.
        let geometry: Vec<Point> = route
            .geometry
            .coordinates
            .iter()
            .map(|[lon, lat]| Point {
                lat: Latitude(*lat),
                lon: Longitude(*lon),
            })
            .collect();

        if geometry.len() < 2 {
            info!(tag = "[ROUTE FALLBACK]", points = geometry.len(), "Degenerate geometry, using straight line");
            return self.straight_line(origin, destination);
        }

        RouteInfo {
            distance: Kilometers(route.distance / 1000.0),
            duration: Minutes(route.duration / 60.0),
            geometry,
        }
    }

    /// Synthesized two-point route between origin and destination.
    pub fn straight_line(&self, origin: &Point, destination: &Point) -> RouteInfo {
        let distance_km = distance_between_in_km(origin, destination);

        RouteInfo {
            distance: Kilometers(distance_km),
            duration: Minutes(distance_km * FALLBACK_MINUTES_PER_KM),
            geometry: vec![origin.to_owned(), destination.to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::types::{RoutingGeometry, RoutingRoute};

    struct ScriptedPlanner {
        response: Result<RoutingResponse, String>,
    }

    #[async_trait]
    impl RoutePlanner for ScriptedPlanner {
        async fn plan(
            &self,
            _origin: &Point,
            _destination: &Point,
        ) -> Result<RoutingResponse, AppError> {
            self.response
                .to_owned()
                .map_err(AppError::ExternalAPICallError)
        }
    }

    fn pt(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    fn luanda() -> Point {
        pt(-8.8390, 13.2894)
    }

    fn lobito() -> Point {
        pt(-12.3644, 13.5456)
    }

    #[tokio::test]
    async fn unsuccessful_status_degrades_to_straight_line() {
        let builder = RouteBuilder::new(Arc::new(ScriptedPlanner {
            response: Ok(RoutingResponse {
                code: "NoRoute".to_string(),
                routes: vec![],
            }),
        }));

        let route = builder.build(&luanda(), &lobito()).await;

        assert_eq!(route.geometry, vec![luanda(), lobito()]);
        let expected_duration = route.distance.inner() * FALLBACK_MINUTES_PER_KM;
        assert!((route.duration.inner() - expected_duration).abs() < 1e-9);
    }

    #[tokio::test]
    async fn planner_error_degrades_to_straight_line() {
        let builder = RouteBuilder::new(Arc::new(ScriptedPlanner {
            response: Err("connection refused".to_string()),
        }));

        let route = builder.build(&luanda(), &lobito()).await;

        assert_eq!(route.geometry.len(), 2);
        assert_eq!(route.geometry[0], luanda());
    }

    #[tokio::test]
    async fn service_route_is_converted_and_reordered() {
        let builder = RouteBuilder::new(Arc::new(ScriptedPlanner {
            response: Ok(RoutingResponse {
                code: "Ok".to_string(),
                routes: vec![RoutingRoute {
                    distance: 350_200.0,
                    duration: 16_200.0,
                    geometry: RoutingGeometry {
                        coordinates: vec![[13.2894, -8.8390], [13.5456, -12.3644]],
                        geometry_type: "LineString".to_string(),
                    },
                }],
            }),
        }));

        let route = builder.build(&luanda(), &lobito()).await;

        assert!((route.distance.inner() - 350.2).abs() < 1e-9);
        assert!((route.duration.inner() - 270.0).abs() < 1e-9);
        assert_eq!(route.geometry, vec![luanda(), lobito()]);
    }
}
