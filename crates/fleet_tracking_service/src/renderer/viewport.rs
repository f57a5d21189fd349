/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::common::utils::{distance_between_in_meters, midpoint};
use serde::{Deserialize, Serialize};

pub const BOUNDS_FIT_PADDING_PX: u32 = 48;
pub const SAME_LOCATION_ZOOM: u8 = 15;

/// Below this bounding-box diagonal a bounds-fit would produce a
/// degenerate, too-tight zoom, so the view centers on the midpoint instead.
pub const SAME_LOCATION_THRESHOLD_METERS: f64 = 50.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Viewport {
    #[serde(rename_all = "camelCase")]
    FitBounds {
        south_west: Point,
        north_east: Point,
        padding_px: u32,
    },
    #[serde(rename_all = "camelCase")]
    Center { point: Point, zoom: u8 },
}

/// Computes the viewport covering a set of route points (start, current
/// position and optionally destination, in drawing order). Near-identical
/// points center on the midpoint of the first and last point at a fixed
/// zoom; anything else fits the bounding box with fixed padding.
pub fn viewport_for_points(points: &[Point]) -> Option<Viewport> {
    let first = points.first()?;
    let last = points.last()?;

    let mut min_lat = f64::MAX;
    let mut min_lon = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut max_lon = f64::MIN;
    for point in points {
        min_lat = min_lat.min(point.lat.inner());
        min_lon = min_lon.min(point.lon.inner());
        max_lat = max_lat.max(point.lat.inner());
        max_lon = max_lon.max(point.lon.inner());
    }

    let south_west = Point {
        lat: Latitude(min_lat),
        lon: Longitude(min_lon),
    };
    let north_east = Point {
        lat: Latitude(max_lat),
        lon: Longitude(max_lon),
    };

    if distance_between_in_meters(&south_west, &north_east) < SAME_LOCATION_THRESHOLD_METERS {
        Some(Viewport::Center {
            point: midpoint(first, last),
            zoom: SAME_LOCATION_ZOOM,
        })
    } else {
        Some(Viewport::FitBounds {
            south_west,
            north_east,
            padding_px: BOUNDS_FIT_PADDING_PX,
        })
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
    fn identical_points_center_on_midpoint_at_fixed_zoom() {
        let p = pt(-8.839, 13.289);
        let viewport = viewport_for_points(&[p.to_owned(), p.to_owned()]).unwrap();

        assert_eq!(
            viewport,
            Viewport::Center {
                point: pt(-8.839, 13.289),
                zoom: SAME_LOCATION_ZOOM,
            }
        );
    }

    #[test]
    fn distant_points_fit_bounds_with_padding() {
        let viewport =
            viewport_for_points(&[pt(-8.8390, 13.2894), pt(-12.3644, 13.5456)]).unwrap();

        match viewport {
            Viewport::FitBounds {
                south_west,
                north_east,
                padding_px,
            } => {
                assert_eq!(south_west, pt(-12.3644, 13.2894));
                assert_eq!(north_east, pt(-8.8390, 13.5456));
                assert_eq!(padding_px, BOUNDS_FIT_PADDING_PX);
            }
            other => panic!("expected bounds fit, got {other:?}"),
        }
    }

    #[test]
    fn no_points_means_no_viewport() {
        assert!(viewport_for_points(&[]).is_none());
    }
}
