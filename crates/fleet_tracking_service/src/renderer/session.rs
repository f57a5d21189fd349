/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::places::PlaceLookup;
use crate::common::types::*;
use crate::renderer::surface::MapScene;
use crate::renderer::LiveMap;
use crate::tools::error::AppError;
use chrono::{Duration, Utc};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// One mounted dashboard map: a live map plus the last time its client
/// polled. The surface lives exactly as long as the session.
pub struct MapSession {
    pub live: LiveMap<MapScene>,
    pub last_access: TimeStamp,
}

/// Registry of mounted map sessions. A session is opened when a dashboard
/// map mounts, torn down explicitly on unmount, and swept when its client
/// stops polling without saying goodbye.
pub struct MapSessionRegistry {
    sessions: RwLock<FxHashMap<SessionId, Arc<Mutex<MapSession>>>>,
    idle_ttl_secs: u64,
}

impl MapSessionRegistry {
    pub fn new(idle_ttl_secs: u64) -> Self {
        MapSessionRegistry {
            sessions: RwLock::new(FxHashMap::default()),
            idle_ttl_secs,
        }
    }

    pub async fn open(&self, lookup: Arc<dyn PlaceLookup>) -> SessionId {
        let session_id = SessionId(Uuid::new_v4().to_string());
        let session = MapSession {
            live: LiveMap::new(MapScene::new(), lookup),
            last_access: TimeStamp(Utc::now()),
        };

        self.sessions
            .write()
            .await
            .insert(session_id.to_owned(), Arc::new(Mutex::new(session)));

        info!(tag = "[MAP SESSION]", session_id = %session_id.inner(), "Opened");
        session_id
    }

    pub async fn get(&self, session_id: &SessionId) -> Result<Arc<Mutex<MapSession>>, AppError> {
        let session = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::MapSessionNotFound(session_id.inner()))?;

        session.lock().await.last_access = TimeStamp(Utc::now());
        Ok(session)
    }

    pub async fn close(&self, session_id: &SessionId) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| info!(tag = "[MAP SESSION]", session_id = %session_id.inner(), "Closed"))
            .ok_or_else(|| AppError::MapSessionNotFound(session_id.inner()))
    }

    /// Removes sessions whose client stopped polling. Sessions currently
    /// being served are skipped and picked up on a later sweep.
    pub async fn sweep_idle(&self, now: TimeStamp) -> usize {
        let mut sessions = self.sessions.write().await;

        let expired: Vec<SessionId> = sessions
            .iter()
            .filter_map(|(session_id, session)| {
                let session = session.try_lock().ok()?;
                (now.inner().signed_duration_since(session.last_access.inner())
                    > Duration::seconds(self.idle_ttl_secs as i64))
                .then(|| session_id.to_owned())
            })
            .collect();

        for session_id in &expired {
            sessions.remove(session_id);
            info!(tag = "[MAP SESSION]", session_id = %session_id.inner(), "Expired");
        }

        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::places::Gazetteer;
    use chrono::TimeZone;

    fn lookup() -> Arc<dyn PlaceLookup> {
        Arc::new(Gazetteer::new(vec![]))
    }

    #[tokio::test]
    async fn open_get_close_roundtrip() {
        let registry = MapSessionRegistry::new(300);
        let session_id = registry.open(lookup()).await;

        assert!(registry.get(&session_id).await.is_ok());
        assert_eq!(registry.len().await, 1);

        registry.close(&session_id).await.unwrap();
        assert!(matches!(
            registry.get(&session_id).await,
            Err(AppError::MapSessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn closing_an_unknown_session_fails() {
        let registry = MapSessionRegistry::new(300);
        assert!(registry
            .close(&SessionId("nope".to_string()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn idle_sessions_are_swept() {
        let registry = MapSessionRegistry::new(300);
        let session_id = registry.open(lookup()).await;

        let later = TimeStamp(Utc.timestamp_opt(Utc::now().timestamp() + 301, 0).unwrap());
        let removed = registry.sweep_idle(later).await;

        assert_eq!(removed, 1);
        assert!(registry.get(&session_id).await.is_err());
    }
}
