/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod keys;
pub mod session;
pub mod surface;
pub mod viewport;

use crate::common::places::PlaceLookup;
use crate::common::types::*;
use crate::renderer::surface::{LinePattern, LineStyle, MapSurface, MarkerKind, MarkerStyle};
use crate::renderer::viewport::viewport_for_points;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

struct RenderedMarker {
    position: Point,
    status: VehicleStatus,
}

/// Last successful text resolutions for one active route, kept so
/// steady-state polling does not re-geocode unchanged location texts.
struct ResolvedEndpoints {
    start_text: Option<String>,
    start: Point,
    dest_text: Option<String>,
    dest: Option<Point>,
}

/// Owns one persistent map surface and keeps it visually consistent with
/// periodically refreshed vehicle/active-route snapshots. Reconciliation is
/// an identity-keyed diff: stale objects are pruned, existing ones updated
/// in place, new ones created. Vehicles or routes without resolvable
/// coordinates are excluded from rendering, never errors.
pub struct LiveMap<S: MapSurface> {
    surface: S,
    lookup: Arc<dyn PlaceLookup>,
    markers: FxHashMap<VehicleId, RenderedMarker>,
    route_segments: FxHashMap<String, VehicleId>,
    destination_markers: FxHashMap<VehicleId, Point>,
    resolved: FxHashMap<VehicleId, ResolvedEndpoints>,
    selected: Option<VehicleId>,
}

impl<S: MapSurface> LiveMap<S> {
    pub fn new(surface: S, lookup: Arc<dyn PlaceLookup>) -> Self {
        LiveMap {
            surface,
            lookup,
            markers: FxHashMap::default(),
            route_segments: FxHashMap::default(),
            destination_markers: FxHashMap::default(),
            resolved: FxHashMap::default(),
            selected: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selected(&self) -> Option<&VehicleId> {
        self.selected.as_ref()
    }

    pub async fn reconcile(&mut self, vehicles: &[VehicleMarker], routes: &[ActiveRoute]) {
        self.reconcile_vehicles(vehicles);
        self.reconcile_routes(routes).await;
    }

    /// Diffs the vehicle marker registry against a fresh snapshot. A
    /// vehicle with no known location counts as absent.
    pub fn reconcile_vehicles(&mut self, vehicles: &[VehicleMarker]) {
        let present: FxHashSet<&VehicleId> = vehicles
            .iter()
            .filter(|vehicle| vehicle.location.is_some())
            .map(|vehicle| &vehicle.id)
            .collect();

        let stale: Vec<VehicleId> = self
            .markers
            .keys()
            .filter(|vehicle_id| !present.contains(vehicle_id))
            .cloned()
            .collect();
        for vehicle_id in stale {
            self.surface
                .remove_object(&keys::vehicle_marker_key(&vehicle_id));
            self.markers.remove(&vehicle_id);
        }

        for vehicle in vehicles {
            let Some(position) = &vehicle.location else {
                continue;
            };

            let style = MarkerStyle {
                kind: MarkerKind::Vehicle,
                status: Some(vehicle.status),
                selected: self.selected.as_ref() == Some(&vehicle.id),
            };
            let key = keys::vehicle_marker_key(&vehicle.id);

            if self.markers.contains_key(&vehicle.id) {
                self.surface.move_marker(&key, position, style);
            } else {
                self.surface.add_marker(&key, position, style);
            }
            self.markers.insert(
                vehicle.id.to_owned(),
                RenderedMarker {
                    position: position.to_owned(),
                    status: vehicle.status,
                },
            );
        }
    }

    /// Diffs route polylines and destination markers against the fresh
    /// active-route list.
    pub async fn reconcile_routes(&mut self, routes: &[ActiveRoute]) {
        let present: FxHashSet<&VehicleId> = routes.iter().map(|route| &route.vehicle_id).collect();

        let stale_segments: Vec<String> = self
            .route_segments
            .iter()
            .filter(|(_, owner)| !present.contains(owner))
            .map(|(key, _)| key.to_owned())
            .collect();
        for key in stale_segments {
            self.surface.remove_object(&key);
            self.route_segments.remove(&key);
        }

        let stale_destinations: Vec<VehicleId> = self
            .destination_markers
            .keys()
            .filter(|vehicle_id| !present.contains(vehicle_id))
            .cloned()
            .collect();
        for vehicle_id in stale_destinations {
            self.surface
                .remove_object(&keys::destination_marker_key(&vehicle_id));
            self.destination_markers.remove(&vehicle_id);
        }

        let active: FxHashSet<VehicleId> = routes
            .iter()
            .map(|route| route.vehicle_id.to_owned())
            .collect();
        self.resolved
            .retain(|vehicle_id, _| active.contains(vehicle_id));

        for route in routes {
            match self.resolve_endpoints(route).await {
                Some((start, dest)) => self.draw_route(route, start, dest),
                // Unresolvable start: skip the route entirely.
                None => self.clear_route(&route.vehicle_id),
            }
        }
    }

    /// Resolves the route's start and destination coordinates: explicit
    /// coordinates win, free text goes through the place lookup with the
    /// last successful resolution cached per vehicle. `None` means the
    /// start cannot be placed and nothing should be drawn.
    async fn resolve_endpoints(&mut self, route: &ActiveRoute) -> Option<(Point, Option<Point>)> {
        let cached = self.resolved.get(&route.vehicle_id);

        let start = match (&route.start, &route.start_location) {
            (Some(start), _) => Some(start.to_owned()),
            (None, Some(text)) => match cached
                .filter(|resolved| resolved.start_text.as_deref() == Some(text))
                .map(|resolved| resolved.start.to_owned())
            {
                Some(start) => Some(start),
                None => self.lookup.lookup(text).await,
            },
            (None, None) => None,
        }?;

        let dest = match (&route.dest, &route.destination) {
            (Some(dest), _) => Some(dest.to_owned()),
            (None, Some(text)) => {
                let cached = self
                    .resolved
                    .get(&route.vehicle_id)
                    .filter(|resolved| resolved.dest_text.as_deref() == Some(text))
                    .and_then(|resolved| resolved.dest.to_owned());
                match cached {
                    Some(dest) => Some(dest),
                    None => self.lookup.lookup(text).await,
                }
            }
            (None, None) => None,
        };

        self.resolved.insert(
            route.vehicle_id.to_owned(),
            ResolvedEndpoints {
                start_text: route.start_location.to_owned(),
                start: start.to_owned(),
                dest_text: route.destination.to_owned(),
                dest: dest.to_owned(),
            },
        );

        Some((start, dest))
    }

    fn draw_route(&mut self, route: &ActiveRoute, start: Point, dest: Option<Point>) {
        let vehicle_id = &route.vehicle_id;
        let current = route.current.to_owned();

        match dest {
            Some(dest) => {
                self.upsert_segment(
                    keys::traversed_segment_key(vehicle_id),
                    vehicle_id,
                    vec![start, current.to_owned()],
                    LineStyle {
                        pattern: LinePattern::Solid,
                    },
                );
                self.upsert_segment(
                    keys::remaining_segment_key(vehicle_id),
                    vehicle_id,
                    vec![current, dest.to_owned()],
                    LineStyle {
                        pattern: LinePattern::Dashed,
                    },
                );
                self.remove_segment(&keys::track_segment_key(vehicle_id));

                let key = keys::destination_marker_key(vehicle_id);
                let style = MarkerStyle {
                    kind: MarkerKind::Destination,
                    status: None,
                    selected: false,
                };
                if self.destination_markers.contains_key(vehicle_id) {
                    self.surface.move_marker(&key, &dest, style);
                } else {
                    self.surface.add_marker(&key, &dest, style);
                }
                self.destination_markers.insert(vehicle_id.to_owned(), dest);
            }
            None => {
                self.upsert_segment(
                    keys::track_segment_key(vehicle_id),
                    vehicle_id,
                    vec![start, current],
                    LineStyle {
                        pattern: LinePattern::Solid,
                    },
                );
                self.remove_segment(&keys::traversed_segment_key(vehicle_id));
                self.remove_segment(&keys::remaining_segment_key(vehicle_id));
                if self.destination_markers.remove(vehicle_id).is_some() {
                    self.surface
                        .remove_object(&keys::destination_marker_key(vehicle_id));
                }
            }
        }
    }

    fn clear_route(&mut self, vehicle_id: &VehicleId) {
        self.remove_segment(&keys::traversed_segment_key(vehicle_id));
        self.remove_segment(&keys::remaining_segment_key(vehicle_id));
        self.remove_segment(&keys::track_segment_key(vehicle_id));
        if self.destination_markers.remove(vehicle_id).is_some() {
            self.surface
                .remove_object(&keys::destination_marker_key(vehicle_id));
        }
        self.resolved.remove(vehicle_id);
    }

    fn upsert_segment(&mut self, key: String, owner: &VehicleId, path: Vec<Point>, style: LineStyle) {
        if self.route_segments.contains_key(&key) {
            self.surface.update_polyline(&key, &path, style);
        } else {
            self.surface.add_polyline(&key, &path, style);
            self.route_segments.insert(key, owner.to_owned());
        }
    }

    fn remove_segment(&mut self, key: &str) {
        if self.route_segments.remove(key).is_some() {
            self.surface.remove_object(key);
        }
    }

    /// Changes the selected vehicle: restyles markers in place and, when
    /// the selection has an active route, fits the viewport to it (or
    /// centers on the midpoint for the same-location edge case).
    pub async fn select(&mut self, vehicle_id: Option<VehicleId>, routes: &[ActiveRoute]) {
        self.selected = vehicle_id;

        for (vehicle_id, marker) in &self.markers {
            let style = MarkerStyle {
                kind: MarkerKind::Vehicle,
                status: Some(marker.status),
                selected: self.selected.as_ref() == Some(vehicle_id),
            };
            self.surface.move_marker(
                &keys::vehicle_marker_key(vehicle_id),
                &marker.position,
                style,
            );
        }

        let Some(selected) = self.selected.to_owned() else {
            return;
        };
        let Some(route) = routes.iter().find(|route| route.vehicle_id == selected) else {
            return;
        };
        let Some((start, dest)) = self.resolve_endpoints(route).await else {
            return;
        };

        let mut points = vec![start, route.current.to_owned()];
        if let Some(dest) = dest {
            points.push(dest);
        }
        if let Some(viewport) = viewport_for_points(&points) {
            self.surface.set_viewport(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::surface::MapScene;
    use super::viewport::{Viewport, SAME_LOCATION_ZOOM};
    use super::*;
    use crate::common::places::Gazetteer;

    fn pt(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    fn lookup() -> Arc<dyn PlaceLookup> {
        Arc::new(Gazetteer::new(vec![
            ("Luanda".to_string(), pt(-8.8390, 13.2894)),
            ("Lobito".to_string(), pt(-12.3644, 13.5456)),
        ]))
    }

    fn vehicle(id: &str, location: Option<Point>) -> VehicleMarker {
        VehicleMarker {
            id: VehicleId(id.to_string()),
            plate: PlateNumber(format!("LD-{id}")),
            location,
            status: VehicleStatus::Active,
            driver: None,
        }
    }

    fn route(id: &str, start_location: &str, destination: Option<&str>) -> ActiveRoute {
        ActiveRoute {
            vehicle_id: VehicleId(id.to_string()),
            start: None,
            current: pt(-9.5, 13.3),
            dest: None,
            destination: destination.map(str::to_string),
            start_location: Some(start_location.to_string()),
        }
    }

    fn live_map() -> LiveMap<MapScene> {
        LiveMap::new(MapScene::new(), lookup())
    }

    #[tokio::test]
    async fn same_snapshot_twice_is_idempotent_and_preserves_identity() {
        let mut map = live_map();
        let vehicles = vec![
            vehicle("v1", Some(pt(-8.84, 13.29))),
            vehicle("v2", Some(pt(-9.30, 13.31))),
        ];
        let routes = vec![route("v1", "Armazém Central, Luanda", Some("Lobito"))];

        map.reconcile(&vehicles, &routes).await;
        let markers_before = map.surface().markers.to_owned();
        let polylines_before = map.surface().polylines.to_owned();

        map.reconcile(&vehicles, &routes).await;

        assert_eq!(map.surface().markers.len(), markers_before.len());
        assert_eq!(map.surface().polylines.len(), polylines_before.len());
        for (key, marker) in &markers_before {
            assert_eq!(map.surface().markers[key].instance, marker.instance);
        }
        for (key, polyline) in &polylines_before {
            assert_eq!(map.surface().polylines[key].instance, polyline.instance);
        }
    }

    #[tokio::test]
    async fn removed_vehicle_is_pruned_and_only_that_one() {
        let mut map = live_map();
        let vehicles = vec![
            vehicle("v1", Some(pt(-8.84, 13.29))),
            vehicle("v2", Some(pt(-9.30, 13.31))),
        ];
        map.reconcile(&vehicles, &[]).await;
        let v2_instance = map.surface().markers["v2"].instance;

        map.reconcile(&[vehicle("v2", Some(pt(-9.31, 13.32)))], &[])
            .await;

        assert!(!map.surface().markers.contains_key("v1"));
        assert_eq!(map.surface().markers["v2"].instance, v2_instance);
        assert_eq!(map.surface().markers.len(), 1);
    }

    #[tokio::test]
    async fn vehicle_without_coordinates_is_excluded() {
        let mut map = live_map();
        map.reconcile_vehicles(&[vehicle("v1", None), vehicle("v2", Some(pt(-9.3, 13.3)))]);

        assert!(!map.surface().markers.contains_key("v1"));
        assert!(map.surface().markers.contains_key("v2"));
    }

    #[tokio::test]
    async fn route_with_destination_draws_two_segments_and_a_destination_marker() {
        let mut map = live_map();
        let routes = vec![route("v1", "Armazém Central, Luanda", Some("Lobito"))];

        map.reconcile(&[vehicle("v1", Some(pt(-9.5, 13.3)))], &routes)
            .await;

        let traversed = &map.surface().polylines["v1-completed"];
        assert_eq!(traversed.style.pattern, LinePattern::Solid);
        assert_eq!(traversed.path, vec![pt(-8.8390, 13.2894), pt(-9.5, 13.3)]);

        let remaining = &map.surface().polylines["v1-route"];
        assert_eq!(remaining.style.pattern, LinePattern::Dashed);
        assert_eq!(remaining.path, vec![pt(-9.5, 13.3), pt(-12.3644, 13.5456)]);

        assert_eq!(
            map.surface().markers["v1-dest"].position,
            pt(-12.3644, 13.5456)
        );
        assert!(!map.surface().polylines.contains_key("v1-path"));
    }

    #[tokio::test]
    async fn route_without_destination_draws_a_single_track_segment() {
        let mut map = live_map();
        let routes = vec![route("v1", "Luanda", None)];

        map.reconcile_routes(&routes).await;

        let track = &map.surface().polylines["v1-path"];
        assert_eq!(track.style.pattern, LinePattern::Solid);
        assert!(!map.surface().polylines.contains_key("v1-completed"));
        assert!(!map.surface().polylines.contains_key("v1-route"));
        assert!(!map.surface().markers.contains_key("v1-dest"));
    }

    #[tokio::test]
    async fn destination_appearing_later_replaces_the_track_segment() {
        let mut map = live_map();
        map.reconcile_routes(&[route("v1", "Luanda", None)]).await;
        assert!(map.surface().polylines.contains_key("v1-path"));

        map.reconcile_routes(&[route("v1", "Luanda", Some("Lobito"))])
            .await;

        assert!(!map.surface().polylines.contains_key("v1-path"));
        assert!(map.surface().polylines.contains_key("v1-completed"));
        assert!(map.surface().polylines.contains_key("v1-route"));
    }

    #[tokio::test]
    async fn unresolvable_start_is_silently_skipped() {
        let mut map = live_map();
        map.reconcile_routes(&[route("v1", "Terminal Desconhecido", None)])
            .await;

        assert_eq!(map.surface().object_count(), 0);
    }

    #[tokio::test]
    async fn completed_trip_prunes_its_route_objects() {
        let mut map = live_map();
        map.reconcile_routes(&[route("v1", "Luanda", Some("Lobito"))])
            .await;
        assert_eq!(map.surface().polylines.len(), 2);

        map.reconcile_routes(&[]).await;

        assert_eq!(map.surface().polylines.len(), 0);
        assert!(map.surface().markers.is_empty());
    }

    #[tokio::test]
    async fn selection_restyles_markers_and_fits_viewport() {
        let mut map = live_map();
        let vehicles = vec![vehicle("v1", Some(pt(-9.5, 13.3)))];
        let routes = vec![route("v1", "Luanda", Some("Lobito"))];
        map.reconcile(&vehicles, &routes).await;

        map.select(Some(VehicleId("v1".to_string())), &routes).await;

        assert!(map.surface().markers["v1"].style.selected);
        assert!(matches!(
            map.surface().viewport,
            Some(Viewport::FitBounds { .. })
        ));
    }

    #[tokio::test]
    async fn selecting_a_stationary_route_centers_at_fixed_zoom() {
        let mut map = live_map();
        let stationary = ActiveRoute {
            vehicle_id: VehicleId("v1".to_string()),
            start: Some(pt(-8.839, 13.289)),
            current: pt(-8.839, 13.289),
            dest: None,
            destination: None,
            start_location: None,
        };
        map.reconcile_routes(std::slice::from_ref(&stationary)).await;

        map.select(Some(VehicleId("v1".to_string())), &[stationary])
            .await;

        match &map.surface().viewport {
            Some(Viewport::Center { point, zoom }) => {
                assert_eq!(*point, pt(-8.839, 13.289));
                assert_eq!(*zoom, SAME_LOCATION_ZOOM);
            }
            other => panic!("expected centered viewport, got {other:?}"),
        }
    }
}
