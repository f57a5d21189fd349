/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[macros::add_error]
pub enum AppError {
    InternalError(String),
    InvalidRequest(String),
    UnprocessibleRequest(String),
    LargePayloadSize(usize, usize),
    ExternalAPICallError(String),
    SerializationError(String),
    DeserializationError(String),
    Unserviceable(f64, f64),
    RequestTimeout,
    VehicleNotFound(String),
    TripNotFound(String),
    InvalidTripStatus(String, String),
    ActiveTripExists(String),
    VehicleNotInActiveTrip(String),
    MapSessionNotFound(String),
    TripRouteUnavailable(String),
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::Unserviceable(lat, lon) => {
                format!("Location is unserviceable : (Lat : {lat}, Lon : {lon})")
            }
            AppError::VehicleNotFound(vehicle_id) => {
                format!("Vehicle not found : VehicleId - {vehicle_id}")
            }
            AppError::TripNotFound(trip_id) => format!("Trip not found : TripId - {trip_id}"),
            AppError::InvalidTripStatus(trip_id, trip_status) => {
                format!("Invalid Trip Status : TripId - {trip_id}, Trip Status - {trip_status}")
            }
            AppError::ActiveTripExists(vehicle_id) => {
                format!("Vehicle already has an open trip : VehicleId - {vehicle_id}")
            }
            AppError::VehicleNotInActiveTrip(vehicle_id) => {
                format!("Vehicle is not in an active trip : VehicleId - {vehicle_id}")
            }
            AppError::MapSessionNotFound(session_id) => {
                format!("Map session not found : SessionId - {session_id}")
            }
            AppError::TripRouteUnavailable(trip_id) => {
                format!("Trip route endpoints could not be resolved : TripId - {trip_id}")
            }
            _ => "Some Error Occured".to_string(),
        }
    }

    fn code(&self) -> String {
        match self {
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UnprocessibleRequest(_) => "UNPROCESSIBLE_REQUEST",
            AppError::LargePayloadSize(_, _) => "LARGE_PAYLOAD_SIZE",
            AppError::ExternalAPICallError(_) => "EXTERNAL_API_CALL_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::DeserializationError(_) => "DESERIALIZATION_ERROR",
            AppError::Unserviceable(_, _) => "LOCATION_NOT_SERVICEABLE",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::VehicleNotFound(_) => "VEHICLE_NOT_FOUND",
            AppError::TripNotFound(_) => "TRIP_NOT_FOUND",
            AppError::InvalidTripStatus(_, _) => "INVALID_TRIP_STATUS",
            AppError::ActiveTripExists(_) => "ACTIVE_TRIP_EXISTS",
            AppError::VehicleNotInActiveTrip(_) => "VEHICLE_NOT_IN_ACTIVE_TRIP",
            AppError::MapSessionNotFound(_) => "MAP_SESSION_NOT_FOUND",
            AppError::TripRouteUnavailable(_) => "TRIP_ROUTE_UNAVAILABLE",
        }
        .to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExternalAPICallError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unserviceable(_, _) => StatusCode::BAD_REQUEST,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            AppError::TripNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTripStatus(_, _) => StatusCode::BAD_REQUEST,
            AppError::ActiveTripExists(_) => StatusCode::BAD_REQUEST,
            AppError::VehicleNotInActiveTrip(_) => StatusCode::BAD_REQUEST,
            AppError::MapSessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::TripRouteUnavailable(_) => StatusCode::BAD_REQUEST,
        }
    }
}
