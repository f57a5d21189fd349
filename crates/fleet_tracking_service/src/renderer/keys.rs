/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::VehicleId;

// Map object identity is keyed by vehicle id plus a segment suffix, so
// re-renders address existing objects instead of creating duplicates.

pub fn vehicle_marker_key(vehicle_id: &VehicleId) -> String {
    vehicle_id.inner()
}

/// Solid segment from trip start to the current position, drawn when the
/// destination is known.
pub fn traversed_segment_key(vehicle_id: &VehicleId) -> String {
    format!("{}-completed", vehicle_id.inner())
}

/// Dashed segment from the current position to the destination.
pub fn remaining_segment_key(vehicle_id: &VehicleId) -> String {
    format!("{}-route", vehicle_id.inner())
}

/// Single solid segment from trip start to the current position, drawn
/// when no destination is known.
pub fn track_segment_key(vehicle_id: &VehicleId) -> String {
    format!("{}-path", vehicle_id.inner())
}

pub fn destination_marker_key(vehicle_id: &VehicleId) -> String {
    format!("{}-dest", vehicle_id.inner())
}
