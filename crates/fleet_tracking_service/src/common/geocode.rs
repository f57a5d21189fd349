/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::places::PlaceLookup;
use crate::common::types::*;
use crate::outbound::external::search_place;
use crate::outbound::types::GeocodeMatch;
use crate::tools::error::AppError;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::{info, warn};

/// One query against the geocoding service. Split out as a trait so the
/// fallback chain can be exercised against stubs.
#[async_trait]
pub trait GeocodeBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, AppError>;
}

pub struct NominatimBackend {
    geocoding_url: Url,
    result_limit: u32,
}

impl NominatimBackend {
    pub fn new(geocoding_url: Url, result_limit: u32) -> Self {
        NominatimBackend {
            geocoding_url,
            result_limit,
        }
    }
}

#[async_trait]
impl GeocodeBackend for NominatimBackend {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, AppError> {
        search_place(&self.geocoding_url, query, self.result_limit).await
    }
}

/// Builds the ordered candidate-query list for a free-text place
/// description with comma-separated components: the full text, the text
/// minus its first component, minus its first two components, and the last
/// component alone. Each candidate carries the country suffix; duplicates
/// collapse, so the list never exceeds four entries.
pub fn fallback_queries(text: &str, country: &str) -> Vec<String> {
    let parts: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return vec![];
    }

    let mut candidates: Vec<String> = vec![parts.join(", ")];
    if parts.len() > 1 {
        candidates.push(parts[1..].join(", "));
    }
    if parts.len() > 2 {
        candidates.push(parts[2..].join(", "));
    }
    if parts.len() > 1 {
        candidates.push(parts[parts.len() - 1].to_string());
    }

    let mut queries: Vec<String> = vec![];
    for candidate in candidates {
        let query = format!("{candidate}, {country}");
        if !queries.contains(&query) {
            queries.push(query);
        }
    }

    queries
}

/// Maps a free-text, possibly partial or noisy address to a single
/// best-guess coordinate pair using country-biased fallback queries.
/// Candidates are tried strictly in sequence; the first query returning at
/// least one match wins. Exhausting all candidates is a soft failure.
pub struct LocationResolver {
    backend: Arc<dyn GeocodeBackend>,
    country: String,
}

impl LocationResolver {
    pub fn new(backend: Arc<dyn GeocodeBackend>, country: String) -> Self {
        LocationResolver { backend, country }
    }

    pub async fn resolve(&self, text: &str) -> Option<Point> {
        if text.trim().is_empty() {
            return None;
        }

        for query in fallback_queries(text, &self.country) {
            let matches = match self.backend.search(&query).await {
                Ok(matches) => matches,
                Err(err) => {
                    info!(tag = "[GEOCODE FALLBACK]", query = %query, error = %err, "Candidate query failed, trying next");
                    continue;
                }
            };

            if let Some(candidate) = matches.first() {
                match (candidate.lat.parse::<f64>(), candidate.lon.parse::<f64>()) {
                    (Ok(lat), Ok(lon)) => {
                        return Some(Point {
                            lat: Latitude(lat),
                            lon: Longitude(lon),
                        })
                    }
                    _ => {
                        warn!(tag = "[GEOCODE FALLBACK]", query = %query, "Malformed coordinates in first match, trying next");
                    }
                }
            }
        }

        info!(tag = "[GEOCODE EXHAUSTED]", text = %text, "No candidate query produced a match");
        None
    }
}

#[async_trait]
impl PlaceLookup for LocationResolver {
    async fn lookup(&self, text: &str) -> Option<Point> {
        self.resolve(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        succeed_on: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeBackend for ScriptedBackend {
        async fn search(&self, _query: &str) -> Result<Vec<GeocodeMatch>, AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.succeed_on {
                Ok(vec![GeocodeMatch {
                    lat: "-8.8390".to_string(),
                    lon: "13.2894".to_string(),
                    display_name: Some("Luanda, Angola".to_string()),
                }])
            } else {
                Ok(vec![])
            }
        }
    }

    #[test]
    fn candidate_queries_follow_the_documented_order() {
        let queries = fallback_queries("Bairro Azul, Ingombota, Luanda", "Angola");
        assert_eq!(
            queries,
            vec![
                "Bairro Azul, Ingombota, Luanda, Angola",
                "Ingombota, Luanda, Angola",
                "Luanda, Angola",
            ]
        );
    }

    #[test]
    fn four_component_text_yields_four_distinct_queries() {
        let queries = fallback_queries("Rua 5, Bairro Azul, Ingombota, Luanda", "Angola");
        assert_eq!(
            queries,
            vec![
                "Rua 5, Bairro Azul, Ingombota, Luanda, Angola",
                "Bairro Azul, Ingombota, Luanda, Angola",
                "Ingombota, Luanda, Angola",
                "Luanda, Angola",
            ]
        );
    }

    #[test]
    fn single_component_text_yields_one_query() {
        assert_eq!(fallback_queries("Luanda", "Angola"), vec!["Luanda, Angola"]);
    }

    #[tokio::test]
    async fn stops_at_the_first_successful_candidate() {
        let backend = Arc::new(ScriptedBackend {
            succeed_on: 3,
            calls: AtomicUsize::new(0),
        });
        let resolver = LocationResolver::new(backend.to_owned(), "Angola".to_string());

        let resolved = resolver
            .resolve("Rua 5, Bairro Azul, Ingombota, Luanda")
            .await;

        assert_eq!(resolved.map(|p| p.lon.inner()), Some(13.2894));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_every_candidate_is_a_soft_failure() {
        let backend = Arc::new(ScriptedBackend {
            succeed_on: 99,
            calls: AtomicUsize::new(0),
        });
        let resolver = LocationResolver::new(backend.to_owned(), "Angola".to_string());

        assert!(resolver.resolve("Rua 5, Bairro Azul, Luanda").await.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }
}
