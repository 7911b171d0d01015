//! Durable visitor identity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::session::keys;
use crate::storage::Storage;

/// Identity that survives across visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorIdentity {
    pub visitor_id: Uuid,
    /// Visits including the current one.
    pub visit_count: u32,
    pub first_visit: DateTime<Utc>,
}

impl VisitorIdentity {
    /// Load the stored identity and count a new visit, creating the identity
    /// on first sight.
    ///
    /// Storage failures degrade to a fresh identity for this visit.
    pub async fn load_or_create<S: Storage>(storage: &S, now: DateTime<Utc>) -> Self {
        let visitor_id = read(storage, keys::VISITOR_ID).await;
        let previous_visits: Option<u32> = read(storage, keys::VISIT_COUNT).await;
        let first_visit = read(storage, keys::FIRST_VISIT).await;

        let identity = Self {
            visitor_id: visitor_id.unwrap_or_else(Uuid::new_v4),
            visit_count: previous_visits.unwrap_or(0).saturating_add(1),
            first_visit: first_visit.unwrap_or(now),
        };

        let results = [
            storage.put(keys::VISITOR_ID, &identity.visitor_id).await,
            storage.put(keys::VISIT_COUNT, &identity.visit_count).await,
            storage.put(keys::FIRST_VISIT, &identity.first_visit).await,
        ];
        for result in results {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to persist visitor identity");
            }
        }

        identity
    }

    #[must_use]
    pub const fn is_new_visitor(&self) -> bool {
        self.visit_count == 1
    }
}

async fn read<S, T>(storage: &S, key: &str) -> Option<T>
where
    S: Storage,
    T: serde::de::DeserializeOwned + Send,
{
    storage.fetch(key).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, key, "Failed to read visitor identity");
        None
    })
}
