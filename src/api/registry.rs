//! In-memory session registry keyed by UUID.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::Session;
use crate::simulation::AutoPlayHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("session limit of {capacity} reached")]
    Full { capacity: usize },
}

/// A registered session plus its optional auto-play driver.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub id: Uuid,
    pub session: Arc<Mutex<Session>>,
    pub autoplay: Arc<Mutex<Option<AutoPlayHandle>>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub async fn insert(&self, session: Session) -> Result<SessionEntry, RegistryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.capacity {
            return Err(RegistryError::Full {
                capacity: self.capacity,
            });
        }
        let entry = SessionEntry {
            id: Uuid::new_v4(),
            session: Arc::new(Mutex::new(session)),
            autoplay: Arc::new(Mutex::new(None)),
            created_at: Utc::now(),
        };
        sessions.insert(entry.id, entry.clone());
        Ok(entry)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionEntry> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Unregister a session, stopping its auto-play if one is running.
    pub async fn remove(&self, id: &Uuid) -> Option<SessionEntry> {
        let entry = self.sessions.write().await.remove(id)?;
        if let Some(handle) = entry.autoplay.lock().await.take() {
            handle.stop();
        }
        Some(entry)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, StrategyId};
    use crate::session::SessionOptions;

    fn session() -> Session {
        Session::initialize(StrategyId::TenStepLadder, Decimal::one(), SessionOptions::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new(4);
        let entry = registry.insert(session()).await.unwrap();
        assert!(registry.get(&entry.id).await.is_some());
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(&entry.id).await.is_some());
        assert!(registry.get(&entry.id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let registry = SessionRegistry::new(1);
        registry.insert(session()).await.unwrap();
        assert_eq!(
            registry.insert(session()).await.unwrap_err(),
            RegistryError::Full { capacity: 1 }
        );
    }
}
