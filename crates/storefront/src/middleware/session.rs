//! Session middleware configuration.
//!
//! Sessions live in process memory. The session cookie is the client's handle
//! on its cart; abandoned carts are swept once their inactivity expiry passes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "techstore_session";

/// Session expiry time in seconds (30 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// How often expired sessions are dropped from the store.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// In-memory session store with expired-record deletion.
///
/// Expired records are never returned by `load`, and
/// [`ExpiredDeletion::delete_expired`] removes them so the map stays bounded
/// by the number of live sessions.
#[derive(Clone, Debug, Default)]
pub struct CartSessionStore(Arc<Mutex<HashMap<Id, Record>>>);

impl CartSessionStore {
    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.is_empty()
    }
}

fn is_live(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

#[async_trait]
impl SessionStore for CartSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.0.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .0
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_live(record, now))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for CartSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let mut records = self.0.lock().await;
        let before = records.len();
        records.retain(|_, record| is_live(record, now));

        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = records.len(), "Expired sessions deleted");
        }
        Ok(())
    }
}

/// Run [`ExpiredDeletion::delete_expired`] every `period` until the runtime
/// shuts down.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_expired_session_sweep(store: CartSessionStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = store.delete_expired().await {
                tracing::warn!(error = %e, "Failed to delete expired sessions");
            }
        }
    })
}

/// Create the session layer over the given store.
///
/// # Arguments
///
/// * `store` - Session store shared by all requests
/// * `config` - Storefront configuration (for the `Secure` cookie flag)
#[must_use]
pub fn create_session_layer(
    store: CartSessionStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<CartSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_expired_records_are_not_loaded() {
        let store = CartSessionStore::default();
        let mut stale = record(TimeDuration::seconds(-1));
        store.create(&mut stale).await.unwrap();

        assert_eq!(store.load(&stale.id).await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_sessions() {
        let store = CartSessionStore::default();
        let mut live = record(TimeDuration::days(30));
        let mut stale = record(TimeDuration::seconds(-1));
        store.create(&mut live).await.unwrap();
        store.create(&mut stale).await.unwrap();

        store.delete_expired().await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load(&live.id).await.unwrap(), Some(live));
    }

    #[tokio::test]
    async fn test_sweep_task_empties_store_of_expired_sessions() {
        let store = CartSessionStore::default();
        for _ in 0..3 {
            let mut stale = record(TimeDuration::seconds(-1));
            store.create(&mut stale).await.unwrap();
        }

        let sweep = spawn_expired_session_sweep(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweep.abort();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let store = CartSessionStore::default();
        let live = record(TimeDuration::minutes(5));
        store.save(&live).await.unwrap();
        assert!(store.load(&live.id).await.unwrap().is_some());

        store.delete(&live.id).await.unwrap();
        assert!(store.is_empty().await);
    }
}
