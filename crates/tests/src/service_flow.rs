/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{test, web::Data, App};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use geo::{polygon, MultiPolygon};
use serde_json::{json, Value};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use fleet_tracking_service::{
    common::{
        gps_watch::GpsWatchRegistry,
        places::{Gazetteer, PlaceLookup},
        route::{RouteBuilder, RoutePlanner},
        types::*,
    },
    domain::api,
    drainer::run_drainer,
    environment::AppState,
    outbound::types::{RoutingGeometry, RoutingResponse, RoutingRoute},
    renderer::session::MapSessionRegistry,
    storage::FleetStore,
    tools::error::AppError,
};

struct ScriptedPlanner {
    response: RoutingResponse,
}

#[async_trait]
impl RoutePlanner for ScriptedPlanner {
    async fn plan(
        &self,
        _origin: &Point,
        _destination: &Point,
    ) -> Result<RoutingResponse, AppError> {
        Ok(self.response.to_owned())
    }
}

fn pt(lat: f64, lon: f64) -> Point {
    Point {
        lat: Latitude(lat),
        lon: Longitude(lon),
    }
}

fn luanda_lobito_planner() -> Arc<dyn RoutePlanner> {
    Arc::new(ScriptedPlanner {
        response: RoutingResponse {
            code: "Ok".to_string(),
            routes: vec![RoutingRoute {
                distance: 350_200.0,
                duration: 16_200.0,
                geometry: RoutingGeometry {
                    coordinates: vec![[13.2894, -8.8390], [13.5456, -12.3644]],
                    geometry_type: "LineString".to_string(),
                },
            }],
        },
    })
}

fn unavailable_planner() -> Arc<dyn RoutePlanner> {
    Arc::new(ScriptedPlanner {
        response: RoutingResponse {
            code: "NoRoute".to_string(),
            routes: vec![],
        },
    })
}

fn angola() -> MultiPolygonBody {
    MultiPolygonBody {
        region: RegionName("Angola".to_string()),
        multipolygon: MultiPolygon::new(vec![polygon![
            (x: 11.6, y: -18.1),
            (x: 24.1, y: -18.1),
            (x: 24.1, y: -4.3),
            (x: 11.6, y: -4.3),
        ]]),
    }
}

/// Application state with scripted external collaborators and an attached
/// position-writer task draining every commit immediately.
fn app_state(planner: Arc<dyn RoutePlanner>) -> Data<AppState> {
    let (sender, receiver) = mpsc::channel(64);
    let store = Arc::new(FleetStore::new());

    let lookup: Arc<dyn PlaceLookup> = Arc::new(Gazetteer::new(vec![
        ("Luanda".to_string(), pt(-8.8390, 13.2894)),
        ("Lobito".to_string(), pt(-12.3644, 13.5456)),
    ]));

    let state = AppState {
        store: store.to_owned(),
        watches: Arc::new(GpsWatchRegistry::new(10)),
        sessions: Arc::new(MapSessionRegistry::new(300)),
        lookup,
        route_builder: Arc::new(RouteBuilder::new(planner)),
        sender,
        polygon: vec![angola()],
        min_location_accuracy: Accuracy(100.0),
        drainer_delay: 1,
        drainer_size: 1,
        map_session_sweep_interval: 60,
        request_timeout: 9000,
        log_unprocessible_req_body: vec![],
        max_allowed_req_size: 512_000,
    };

    tokio::spawn(async move {
        run_drainer(receiver, Arc::new(AtomicBool::new(false)), 1, 1, &store).await;
    });

    Data::new(state)
}

fn ts(secs: i64) -> String {
    TimeStamp(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
        .inner()
        .to_rfc3339()
}

fn gps_sample(lat: f64, lon: f64, secs: i64) -> Value {
    json!({ "pt": { "lat": lat, "lon": lon }, "ts": ts(secs), "acc": 5.0 })
}

async fn wait_for_vehicle_position(data: &Data<AppState>, vehicle_id: &str, expected: Point) {
    for _ in 0..100 {
        let vehicle = data
            .store
            .vehicle(&VehicleId(vehicle_id.to_string()))
            .await
            .unwrap();
        if vehicle.location == Some(expected.to_owned()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("vehicle {vehicle_id} never reached {expected:?}");
}

macro_rules! app {
    ($data:expr) => {
        test::init_service(
            App::new()
                .app_data($data.clone())
                .configure(api::handler),
        )
        .await
    };
}

async fn register_vehicle(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    vehicle_id: &str,
) {
    let req = test::TestRequest::post()
        .uri("/internal/vehicle")
        .set_json(json!({
            "vehicleId": vehicle_id,
            "plate": format!("LD-{vehicle_id}"),
            "driverId": "drv-1"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success());
}

async fn create_and_start_trip(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    vehicle_id: &str,
    destination: Option<&str>,
) -> String {
    let req = test::TestRequest::post()
        .uri("/ui/trip/create")
        .set_json(json!({
            "vehicleId": vehicle_id,
            "driverId": "drv-1",
            "startLocation": "Armazém Central, Luanda",
            "destination": destination
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    let trip_id = body["tripId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/ui/trip/{trip_id}/start"))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success());

    trip_id
}

#[tokio::test]
async fn throttled_gps_batch_commits_first_fix_and_mirrors_the_vehicle() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    create_and_start_trip(&app, "v1", Some("Lobito")).await;

    // Five samples inside one 10 s window: only the first commits.
    let samples: Vec<Value> = [0, 2, 4, 6, 8]
        .iter()
        .enumerate()
        .map(|(i, secs)| gps_sample(-8.85 - i as f64 * 0.01, 13.29, *secs))
        .collect();
    let req = test::TestRequest::post()
        .uri("/ui/driver/location")
        .insert_header(("vid", "v1"))
        .set_json(samples)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    wait_for_vehicle_position(&data, "v1", pt(-8.85, 13.29)).await;

    // A sample past the window produces the second commit.
    let req = test::TestRequest::post()
        .uri("/ui/driver/location")
        .insert_header(("vid", "v1"))
        .set_json(json!([gps_sample(-8.95, 13.31, 12)]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    wait_for_vehicle_position(&data, "v1", pt(-8.95, 13.31)).await;

    let trip_routes: Value = {
        let req = test::TestRequest::get().uri("/ui/fleet/routes").to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert_eq!(trip_routes[0]["current"]["lat"], json!(-8.95));
}

#[tokio::test]
async fn gps_updates_without_an_active_trip_are_rejected() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;

    let req = test::TestRequest::post()
        .uri("/ui/driver/location")
        .insert_header(("vid", "v1"))
        .set_json(json!([gps_sample(-8.85, 13.29, 0)]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorCode"], json!("VEHICLE_NOT_IN_ACTIVE_TRIP"));
}

#[tokio::test]
async fn fixes_outside_the_service_region_are_rejected() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    create_and_start_trip(&app, "v1", None).await;

    let req = test::TestRequest::post()
        .uri("/ui/driver/location")
        .insert_header(("vid", "v1"))
        .set_json(json!([gps_sample(48.85, 2.35, 0)]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorCode"], json!("LOCATION_NOT_SERVICEABLE"));
}

#[tokio::test]
async fn trip_route_returns_the_service_route_converted() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    let trip_id = create_and_start_trip(&app, "v1", Some("Lobito")).await;

    let req = test::TestRequest::get()
        .uri(&format!("/ui/trip/{trip_id}/route"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["route"]["distance"], json!(350.2));
    assert_eq!(body["route"]["duration"], json!(270.0));
    assert_eq!(body["route"]["geometry"].as_array().unwrap().len(), 2);
    assert_eq!(body["viewport"]["kind"], json!("fitBounds"));
}

#[tokio::test]
async fn trip_route_degrades_to_a_straight_line() {
    let data = app_state(unavailable_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    let trip_id = create_and_start_trip(&app, "v1", Some("Lobito")).await;

    let req = test::TestRequest::get()
        .uri(&format!("/ui/trip/{trip_id}/route"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let geometry = body["route"]["geometry"].as_array().unwrap();
    assert_eq!(geometry.len(), 2);
    let distance = body["route"]["distance"].as_f64().unwrap();
    let duration = body["route"]["duration"].as_f64().unwrap();
    assert!((duration - distance * 1.5).abs() < 1e-9);
}

#[tokio::test]
async fn map_session_draws_and_prunes_the_luanda_lobito_trip() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    let trip_id = create_and_start_trip(&app, "v1", Some("Lobito")).await;

    let req = test::TestRequest::post()
        .uri("/ui/driver/location")
        .insert_header(("vid", "v1"))
        .set_json(json!([gps_sample(-9.5, 13.3, 0)]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    wait_for_vehicle_position(&data, "v1", pt(-9.5, 13.3)).await;

    let session: Value = {
        let req = test::TestRequest::post().uri("/ui/map/session").to_request();
        test::call_and_read_body_json(&app, req).await
    };
    let session_id = session["sessionId"].as_str().unwrap().to_string();

    let scene: Value = {
        let req = test::TestRequest::get()
            .uri(&format!("/ui/map/session/{session_id}"))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };

    // One vehicle marker, one destination marker, solid traversed segment
    // plus dashed remaining segment.
    assert!(scene["markers"]["v1"].is_object());
    assert_eq!(
        scene["markers"]["v1-dest"]["position"],
        json!({ "lat": -12.3644, "lon": 13.5456 })
    );
    assert_eq!(scene["polylines"]["v1-completed"]["style"]["pattern"], json!("Solid"));
    assert_eq!(scene["polylines"]["v1-route"]["style"]["pattern"], json!("Dashed"));

    // Polling the same snapshot again must not rebuild objects.
    let marker_instance = scene["markers"]["v1"]["instance"].as_u64().unwrap();
    let scene_again: Value = {
        let req = test::TestRequest::get()
            .uri(&format!("/ui/map/session/{session_id}"))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert_eq!(
        scene_again["markers"]["v1"]["instance"].as_u64().unwrap(),
        marker_instance
    );

    // Selecting the vehicle restyles it and fits the viewport.
    let scene_selected: Value = {
        let req = test::TestRequest::post()
            .uri(&format!("/ui/map/session/{session_id}/select"))
            .set_json(json!({ "vehicleId": "v1" }))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert_eq!(scene_selected["markers"]["v1"]["style"]["selected"], json!(true));
    assert_eq!(scene_selected["viewport"]["kind"], json!("fitBounds"));

    // Ending the trip prunes its route objects on the next poll.
    let req = test::TestRequest::post()
        .uri(&format!("/ui/trip/{trip_id}/end"))
        .set_json(json!({ "pt": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let scene_after: Value = {
        let req = test::TestRequest::get()
            .uri(&format!("/ui/map/session/{session_id}"))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert_eq!(scene_after["polylines"].as_object().unwrap().len(), 0);
    assert!(scene_after["markers"]["v1-dest"].is_null());
    assert!(scene_after["markers"]["v1"].is_object());

    // Explicit teardown; the second delete finds nothing.
    let req = test::TestRequest::delete()
        .uri(&format!("/ui/map/session/{session_id}"))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::delete()
        .uri(&format!("/ui/map/session/{session_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);
}

#[tokio::test]
async fn manual_location_resolves_or_reports_inline() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    register_vehicle(&app, "v1").await;
    create_and_start_trip(&app, "v1", None).await;

    let body: Value = {
        let req = test::TestRequest::post()
            .uri("/ui/driver/location/manual")
            .insert_header(("vid", "v1"))
            .set_json(json!({ "location": "Terminal Desconhecido" }))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert!(body["resolved"].is_null());
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Could not determine coordinates"));

    let body: Value = {
        let req = test::TestRequest::post()
            .uri("/ui/driver/location/manual")
            .insert_header(("vid", "v1"))
            .set_json(json!({ "location": "Estação de Lobito" }))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };
    assert_eq!(body["resolved"]["lat"], json!(-12.3644));

    wait_for_vehicle_position(&data, "v1", pt(-12.3644, 13.5456)).await;
}

#[tokio::test]
async fn geolocation_errors_map_to_fixed_messages() {
    let data = app_state(luanda_lobito_planner());
    let app = app!(data);

    let body: Value = {
        let req = test::TestRequest::post()
            .uri("/ui/driver/gps/error")
            .set_json(json!({ "error": "PERMISSION_DENIED" }))
            .to_request();
        test::call_and_read_body_json(&app, req).await
    };

    assert_eq!(body["manualEntry"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("blocked"));
}
