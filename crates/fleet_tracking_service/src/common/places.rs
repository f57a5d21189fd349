/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::io;
use std::sync::Arc;
use tracing::info;

/// Capability of turning a free-text place description into coordinates.
/// Failure to resolve is an expected steady-state condition, never an error.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn lookup(&self, text: &str) -> Option<Point>;
}

#[derive(Debug, Deserialize)]
struct GazetteerEntry {
    name: String,
    lat: f64,
    lon: f64,
}

/// A small fixed table of named places, matched by case-insensitive
/// substring containment. When several names match the longest one wins.
pub struct Gazetteer {
    entries: Vec<(String, Point)>,
}

impl Gazetteer {
    pub fn new(entries: Vec<(String, Point)>) -> Self {
        Gazetteer { entries }
    }

    /// Reads all gazetteer JSON files in the given directory. Each file
    /// holds a list of `{name, lat, lon}` entries.
    pub fn read_gazetteer(config_path: &str) -> io::Result<Gazetteer> {
        let mut entries: Vec<(String, Point)> = vec![];

        for entry in fs::read_dir(config_path)? {
            let contents = fs::read_to_string(entry?.path())?;
            let parsed: Vec<GazetteerEntry> = serde_json::from_str(&contents)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

            entries.extend(parsed.into_iter().map(|place| {
                (
                    place.name,
                    Point {
                        lat: Latitude(place.lat),
                        lon: Longitude(place.lon),
                    },
                )
            }));
        }

        info!(
            tag = "[GAZETTEER]",
            "Loaded {} named places from {config_path}",
            entries.len()
        );

        Ok(Gazetteer::new(entries))
    }

    fn find(&self, text: &str) -> Option<Point> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .filter(|(name, _)| text.contains(&name.to_lowercase()))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, point)| point.to_owned())
    }
}

#[async_trait]
impl PlaceLookup for Gazetteer {
    async fn lookup(&self, text: &str) -> Option<Point> {
        self.find(text)
    }
}

/// Tries a sequence of lookups in order, first hit wins. Wiring the
/// gazetteer ahead of the remote geocoder keeps steady-state rendering off
/// the network for well-known places.
pub struct LookupChain {
    lookups: Vec<Arc<dyn PlaceLookup>>,
}

impl LookupChain {
    pub fn new(lookups: Vec<Arc<dyn PlaceLookup>>) -> Self {
        LookupChain { lookups }
    }
}

#[async_trait]
impl PlaceLookup for LookupChain {
    async fn lookup(&self, text: &str) -> Option<Point> {
        for lookup in &self.lookups {
            if let Some(point) = lookup.lookup(text).await {
                return Some(point);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer() -> Gazetteer {
        Gazetteer::new(vec![
            (
                "Luanda".to_string(),
                Point {
                    lat: Latitude(-8.8390),
                    lon: Longitude(13.2894),
                },
            ),
            (
                "Lobito".to_string(),
                Point {
                    lat: Latitude(-12.3644),
                    lon: Longitude(13.5456),
                },
            ),
        ])
    }

    #[test]
    fn matches_place_name_inside_longer_text() {
        let found = gazetteer().find("Armazém Central, Luanda");
        assert_eq!(found.map(|p| p.lat.inner()), Some(-8.8390));
    }

    #[test]
    fn unknown_text_resolves_to_none() {
        assert!(gazetteer().find("Terminal Norte, Huambo").is_none());
    }
}
