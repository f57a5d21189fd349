/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use geo::{coord, Coord, LineString, MultiPolygon, Polygon};
use geojson::{Geometry, PolygonType, Position, Value};
use serde_json::from_str;
use std::fs;
use std::io;

use crate::common::types::{MultiPolygonBody, RegionName};

/// Reads the service region multipolygons from a config directory. Each
/// file holds one GeoJSON MultiPolygon geometry; the filename is the
/// region name.
pub fn read_geo_polygon(config_path: &str) -> io::Result<Vec<MultiPolygonBody>> {
    let mut regions: Vec<MultiPolygonBody> = vec![];

    for entry in fs::read_dir(config_path)? {
        let entry = entry?;
        let region = entry.file_name().to_string_lossy().to_string();
        let contents = fs::read_to_string(entry.path())?;

        regions.push(parse_geojson_multi_polygon(&region, &contents)?);
    }

    Ok(regions)
}

fn parse_geojson_multi_polygon(region: &str, geojson_str: &str) -> io::Result<MultiPolygonBody> {
    let geom: Geometry = from_str(geojson_str)?;

    match geom.value {
        Value::MultiPolygon(multi_polygon) => Ok(MultiPolygonBody {
            region: RegionName(region.to_string()),
            multipolygon: to_multipolygon(multi_polygon),
        }),
        _ => Err(io::Error::new(
            io::ErrorKind::Other,
            "GeoJSON is not a valid MultiPolygon.",
        )),
    }
}

fn to_multipolygon(polygons: Vec<PolygonType>) -> MultiPolygon<f64> {
    MultiPolygon::new(polygons.into_iter().map(to_polygon).collect::<Vec<Polygon<f64>>>())
}

fn to_polygon(polygon: Vec<Vec<Position>>) -> Polygon<f64> {
    Polygon::new(
        polygon
            .into_iter()
            .flat_map(to_line_string)
            .collect::<Vec<Coord<f64>>>()
            .into(),
        vec![],
    )
}

fn to_line_string(line_string: Vec<Position>) -> LineString<f64> {
    LineString::new(
        line_string
            .into_iter()
            .map(|position| coord! {x: position[0], y: position[1]})
            .collect::<Vec<Coord<f64>>>(),
    )
}
