/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::renderer::viewport::Viewport;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarkerKind {
    Vehicle,
    Destination,
}

/// Visual state of a marker. The selected vehicle renders at a larger size
/// with a highlight; everything else at the default size.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub kind: MarkerKind,
    pub status: Option<VehicleStatus>,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinePattern {
    Solid,
    Dashed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineStyle {
    pub pattern: LinePattern,
}

/// Drawing seam of the live map. The renderer addresses objects by key and
/// distinguishes creating a new object from updating an existing one in
/// place, so surfaces can preserve object identity across refreshes.
pub trait MapSurface {
    fn add_marker(&mut self, key: &str, position: &Point, style: MarkerStyle);
    fn move_marker(&mut self, key: &str, position: &Point, style: MarkerStyle);
    fn add_polyline(&mut self, key: &str, path: &[Point], style: LineStyle);
    fn update_polyline(&mut self, key: &str, path: &[Point], style: LineStyle);
    fn remove_object(&mut self, key: &str);
    fn set_viewport(&mut self, viewport: Viewport);
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneMarker {
    pub key: String,
    pub instance: u64,
    pub position: Point,
    pub style: MarkerStyle,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenePolyline {
    pub key: String,
    pub instance: u64,
    pub path: Vec<Point>,
    pub style: LineStyle,
}

/// Scene-materializing surface mirrored by dashboard clients. In-place
/// updates keep an object's `instance` number stable; clients use that to
/// keep open popups bound to the same object across refreshes, and only
/// rebuild objects whose instance changed.
#[derive(Default, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub markers: FxHashMap<String, SceneMarker>,
    pub polylines: FxHashMap<String, ScenePolyline>,
    pub viewport: Option<Viewport>,
    #[serde(skip)]
    instance_seq: u64,
}

impl MapScene {
    pub fn new() -> Self {
        MapScene::default()
    }

    fn next_instance(&mut self) -> u64 {
        self.instance_seq += 1;
        self.instance_seq
    }

    pub fn object_count(&self) -> usize {
        self.markers.len() + self.polylines.len()
    }
}

impl MapSurface for MapScene {
    fn add_marker(&mut self, key: &str, position: &Point, style: MarkerStyle) {
        let instance = self.next_instance();
        self.markers.insert(
            key.to_string(),
            SceneMarker {
                key: key.to_string(),
                instance,
                position: position.to_owned(),
                style,
            },
        );
    }

    fn move_marker(&mut self, key: &str, position: &Point, style: MarkerStyle) {
        match self.markers.get_mut(key) {
            Some(marker) => {
                marker.position = position.to_owned();
                marker.style = style;
            }
            None => self.add_marker(key, position, style),
        }
    }

    fn add_polyline(&mut self, key: &str, path: &[Point], style: LineStyle) {
        let instance = self.next_instance();
        self.polylines.insert(
            key.to_string(),
            ScenePolyline {
                key: key.to_string(),
                instance,
                path: path.to_vec(),
                style,
            },
        );
    }

    fn update_polyline(&mut self, key: &str, path: &[Point], style: LineStyle) {
        match self.polylines.get_mut(key) {
            Some(polyline) => {
                polyline.path = path.to_vec();
                polyline.style = style;
            }
            None => self.add_polyline(key, path, style),
        }
    }

    fn remove_object(&mut self, key: &str) {
        self.markers.remove(key);
        self.polylines.remove(key);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }
}
