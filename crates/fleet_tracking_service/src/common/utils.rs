/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use geo::{point, Intersects};
use std::f64::consts::PI;

use crate::tools::error::AppError;

/// Finds the service region containing the given coordinate, if any.
pub fn get_region(
    lat: &Latitude,
    lon: &Longitude,
    polygon: &[MultiPolygonBody],
) -> Result<RegionName, AppError> {
    let Latitude(lat) = *lat;
    let Longitude(lon) = *lon;

    for multi_polygon_body in polygon {
        if multi_polygon_body
            .multipolygon
            .intersects(&point!(x: lon, y: lat))
        {
            return Ok(multi_polygon_body.region.to_owned());
        }
    }

    Err(AppError::Unserviceable(lat, lon))
}

fn deg2rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn distance_between_in_meters(latlong1: &Point, latlong2: &Point) -> f64 {
    // Calculating using haversine formula
    // Radius of Earth in meters
    let r: f64 = 6371000.0;

    let Latitude(lat1) = latlong1.lat;
    let Longitude(lon1) = latlong1.lon;
    let Latitude(lat2) = latlong2.lat;
    let Longitude(lon2) = latlong2.lon;

    let dlat = deg2rad(lat2 - lat1);
    let dlon = deg2rad(lon2 - lon1);

    let rlat1 = deg2rad(lat1);
    let rlat2 = deg2rad(lat2);

    let sq = |x: f64| x * x;

    // Calculated distance is real (not imaginary) when 0 <= h <= 1
    // Ideally in our use case h wouldn't go out of bounds
    let h = sq((dlat / 2.0).sin()) + rlat1.cos() * rlat2.cos() * sq((dlon / 2.0).sin());

    2.0 * r * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn distance_between_in_km(latlong1: &Point, latlong2: &Point) -> f64 {
    distance_between_in_meters(latlong1, latlong2) / 1000.0
}

/// Arithmetic midpoint of two coordinates. Good enough for the
/// same-location viewport fallback where both points are near each other.
pub fn midpoint(latlong1: &Point, latlong2: &Point) -> Point {
    Point {
        lat: Latitude((latlong1.lat.inner() + latlong2.lat.inner()) / 2.0),
        lon: Longitude((latlong1.lon.inner() + latlong2.lon.inner()) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    #[test]
    fn luanda_to_lobito_distance_is_roughly_300_km() {
        let luanda = pt(-8.8390, 13.2894);
        let lobito = pt(-12.3644, 13.5456);
        let km = distance_between_in_km(&luanda, &lobito);
        assert!((390.0..400.0).contains(&km), "got {km}");
    }

    #[test]
    fn midpoint_of_identical_points_is_the_point() {
        let p = pt(-8.839, 13.289);
        assert_eq!(midpoint(&p, &p), p);
    }
}
