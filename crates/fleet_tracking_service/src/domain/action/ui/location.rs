/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::common::utils::get_region;
use crate::domain::types::ui::location::*;
use crate::environment::AppState;
use crate::tools::error::AppError;
use crate::tools::prometheus::{THROTTLED_LOCATION_UPDATES, TOTAL_LOCATION_UPDATES};
use actix_web::web::Data;
use chrono::Utc;
use tracing::info;

pub const COULD_NOT_DETERMINE_COORDINATES: &str =
    "Could not determine coordinates for the given location";

/// Feeds a batch of GPS samples through the vehicle's watch. Samples are
/// ordered by timestamp, gated on the serviceable region and the accuracy
/// threshold, then throttled; surviving fixes are queued for the position
/// writer. Suppressed samples are accepted and dropped silently.
pub async fn update_driver_location(
    vehicle_id: VehicleId,
    data: Data<AppState>,
    mut request_body: Vec<UpdateDriverLocationRequest>,
) -> Result<APISuccess, AppError> {
    request_body.sort_by(|a, b| a.ts.cmp(&b.ts));

    let latest = request_body.last().ok_or_else(|| {
        AppError::InvalidRequest("Vec<UpdateDriverLocationRequest> is empty".to_string())
    })?;
    let region = get_region(&latest.pt.lat, &latest.pt.lon, &data.polygon)?;

    info!(
        tag = "[LOCATION UPDATES]",
        vehicle_id = %vehicle_id.inner(),
        region = %region.inner(),
        count = request_body.len(),
        "Received driver location updates"
    );

    for location in request_body {
        if location.acc > data.min_location_accuracy {
            continue;
        }

        TOTAL_LOCATION_UPDATES.inc();

        match data.watches.commit_gate(&vehicle_id, location.ts).await? {
            Some(trip_id) => {
                data.sender
                    .send(PositionCommit {
                        vehicle_id: vehicle_id.to_owned(),
                        trip_id,
                        pt: location.pt,
                        ts: location.ts,
                    })
                    .await
                    .map_err(|err| AppError::InternalError(err.to_string()))?;
            }
            None => THROTTLED_LOCATION_UPDATES.inc(),
        }
    }

    Ok(APISuccess::default())
}

/// Resolves a typed location and commits it as the trip's current
/// position. Resolver exhaustion is an inline message, not an HTTP error;
/// the driver keeps the entry field and can retype.
pub async fn manual_location(
    vehicle_id: VehicleId,
    data: Data<AppState>,
    request_body: ManualLocationRequest,
) -> Result<ManualLocationResponse, AppError> {
    let trip_id = data
        .watches
        .trip_for(&vehicle_id)
        .await
        .ok_or_else(|| AppError::VehicleNotInActiveTrip(vehicle_id.inner()))?;

    let Some(pt) = data.lookup.lookup(&request_body.location).await else {
        return Ok(ManualLocationResponse {
            resolved: None,
            message: Some(COULD_NOT_DETERMINE_COORDINATES.to_string()),
        });
    };

    get_region(&pt.lat, &pt.lon, &data.polygon)?;

    data.sender
        .send(PositionCommit {
            vehicle_id,
            trip_id,
            pt: pt.to_owned(),
            ts: TimeStamp(Utc::now()),
        })
        .await
        .map_err(|err| AppError::InternalError(err.to_string()))?;

    Ok(ManualLocationResponse {
        resolved: Some(pt),
        message: None,
    })
}

/// Maps a browser geolocation error class onto its fixed user-facing
/// message. Every class offers the manual-entry fallback.
pub fn gps_error(request_body: GpsErrorRequest) -> GpsErrorResponse {
    let message = match request_body.error {
        GpsErrorKind::PermissionDenied => {
            "Location access is blocked. Enter your location manually."
        }
        GpsErrorKind::PositionUnavailable => {
            "Current location is unavailable. Enter your location manually."
        }
        GpsErrorKind::Timeout => {
            "Timed out waiting for a location fix. Enter your location manually."
        }
    };

    GpsErrorResponse {
        message: message.to_string(),
        manual_entry: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gps_error_class_offers_manual_entry() {
        for kind in [
            GpsErrorKind::PermissionDenied,
            GpsErrorKind::PositionUnavailable,
            GpsErrorKind::Timeout,
        ] {
            let response = gps_error(GpsErrorRequest { error: kind });
            assert!(response.manual_entry);
            assert!(response.message.contains("manually"));
        }
    }
}
