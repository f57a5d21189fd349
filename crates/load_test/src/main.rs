//! src/main.rs
//!
//! Interactive driver simulator for a running fleet-tracking-service
//! instance: seeds vehicles, runs trips with a stream of GPS fixes along
//! the Luanda -> Lobito corridor, and polls a dashboard map session.
use chrono::Utc;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    io::{stdin, stdout, Write},
    time::Duration,
};

const HOST_URL: &str = "http://127.0.0.1:8081";

const LUANDA: (f64, f64) = (-8.8390, 13.2894);
const LOBITO: (f64, f64) = (-12.3644, 13.5456);

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UpdateDriverLocationRequest {
    pub pt: Point,
    pub ts: String,
    pub acc: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRegisterRequest {
    pub vehicle_id: String,
    pub plate: String,
    pub driver_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripCreateRequest {
    pub vehicle_id: String,
    pub driver_id: String,
    pub start_location: String,
    pub destination: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripCreateResponse {
    pub trip_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MapSessionResponse {
    pub session_id: String,
}

fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    stdout().flush().unwrap();
    let mut buf = String::new();
    stdin().read_line(&mut buf).unwrap();
    buf.trim().to_string()
}

async fn seed_vehicles(client: &reqwest::Client, count: usize) {
    for i in 0..count {
        let vehicle_id = format!("veh-{i}");
        let resp = client
            .post(format!("{HOST_URL}/internal/vehicle"))
            .json(&VehicleRegisterRequest {
                vehicle_id: vehicle_id.to_owned(),
                plate: format!("LD-{:02}-{:02}-AA", i / 100, i % 100),
                driver_id: format!("drv-{i}"),
            })
            .send()
            .await;
        match resp {
            Ok(resp) => println!("registered {vehicle_id}: {}", resp.status()),
            Err(err) => println!("registered {vehicle_id}: ERROR {err}"),
        }
    }
}

/// Runs one trip for the vehicle: create, start, stream interpolated
/// fixes between Luanda and Lobito every `fix_interval_ms`, end. The
/// server-side throttle decides which fixes actually commit.
async fn run_trip(client: &reqwest::Client, vehicle_id: &str, fixes: usize, fix_interval_ms: u64) {
    let trip: TripCreateResponse = client
        .post(format!("{HOST_URL}/ui/trip/create"))
        .json(&TripCreateRequest {
            vehicle_id: vehicle_id.to_string(),
            driver_id: format!("drv-{vehicle_id}"),
            start_location: "Armazém Central, Luanda".to_string(),
            destination: "Lobito".to_string(),
        })
        .send()
        .await
        .expect("trip create failed")
        .json()
        .await
        .expect("trip create response undecodable");
    println!("trip {}", trip.trip_id);

    client
        .post(format!("{HOST_URL}/ui/trip/{}/start", trip.trip_id))
        .send()
        .await
        .expect("trip start failed");

    let mut rng = thread_rng();
    for i in 0..fixes {
        let progress = i as f64 / fixes.max(1) as f64;
        let jitter = rng.gen_range(-0.002..0.002);
        let pt = Point {
            lat: LUANDA.0 + (LOBITO.0 - LUANDA.0) * progress + jitter,
            lon: LUANDA.1 + (LOBITO.1 - LUANDA.1) * progress + jitter,
        };
        let resp = client
            .post(format!("{HOST_URL}/ui/driver/location"))
            .header("vid", vehicle_id)
            .json(&vec![UpdateDriverLocationRequest {
                pt,
                ts: Utc::now().to_rfc3339(),
                acc: rng.gen_range(3.0..15.0),
            }])
            .send()
            .await;
        if let Err(err) = resp {
            println!("fix {i}: ERROR {err}");
        }
        tokio::time::sleep(Duration::from_millis(fix_interval_ms)).await;
    }

    client
        .post(format!("{HOST_URL}/ui/trip/{}/end", trip.trip_id))
        .json(&serde_json::json!({ "pt": { "lat": LOBITO.0, "lon": LOBITO.1 } }))
        .send()
        .await
        .expect("trip end failed");
    println!("trip {} ended", trip.trip_id);
}

/// Opens a map session and polls it like a dashboard would, printing the
/// object counts so marker/segment churn is visible.
async fn poll_map(client: &reqwest::Client, polls: usize, poll_interval_ms: u64) {
    let session: MapSessionResponse = client
        .post(format!("{HOST_URL}/ui/map/session"))
        .send()
        .await
        .expect("session open failed")
        .json()
        .await
        .expect("session response undecodable");
    println!("session {}", session.session_id);

    for _ in 0..polls {
        let scene: Value = client
            .get(format!("{HOST_URL}/ui/map/session/{}", session.session_id))
            .send()
            .await
            .expect("session poll failed")
            .json()
            .await
            .expect("scene undecodable");
        let markers = scene["markers"].as_object().map_or(0, |m| m.len());
        let polylines = scene["polylines"].as_object().map_or(0, |p| p.len());
        println!("markers: {markers}, polylines: {polylines}");
        tokio::time::sleep(Duration::from_millis(poll_interval_ms)).await;
    }

    client
        .delete(format!("{HOST_URL}/ui/map/session/{}", session.session_id))
        .send()
        .await
        .expect("session close failed");
    println!("session {} closed", session.session_id);
}

#[tokio::main]
async fn main() {
    let client = reqwest::Client::new();

    loop {
        println!();
        println!("1. seed vehicles");
        println!("2. run a trip");
        println!("3. poll map session");
        println!("4. exit");

        match read_line("> ").as_str() {
            "1" => {
                let count = read_line("vehicle count: ").parse().unwrap_or(10);
                seed_vehicles(&client, count).await;
            }
            "2" => {
                let vehicle_id = read_line("vehicle id: ");
                let fixes = read_line("fix count: ").parse().unwrap_or(30);
                let interval = read_line("fix interval ms: ").parse().unwrap_or(1000);
                run_trip(&client, &vehicle_id, fixes, interval).await;
            }
            "3" => {
                let polls = read_line("poll count: ").parse().unwrap_or(10);
                let interval = read_line("poll interval ms: ").parse().unwrap_or(3000);
                poll_map(&client, polls, interval).await;
            }
            "4" => break,
            other => println!("unknown option: {other}"),
        }
    }
}
