//! Registry of live visitor sessions.
//!
//! Sessions live in a `moka` cache keyed by session id. A session that sees
//! no requests for 30 minutes is evicted, which is how closed tabs disappear.
//! A background task ticks every registered session once per second.
//!
//! Mutations happen under a short synchronous lock. Snapshots for Slack are
//! cloned out of the lock and posted on a spawned task.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::session::{CartAction, ContactInfo, SessionStart, VisitorEvent, VisitorSession};
use crate::services::slack::{SlackClient, build_visitor_message};

const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const MAX_SESSIONS: u64 = 50_000;
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("unknown analytics session: {0}")]
    UnknownSession(Uuid),
}

type SharedSession = Arc<Mutex<VisitorSession>>;

/// Shared handle to the session registry.
#[derive(Clone)]
pub struct AnalyticsTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    sessions: Cache<Uuid, SharedSession>,
    slack: Option<SlackClient>,
}

impl AnalyticsTracker {
    #[must_use]
    pub fn new(slack: Option<SlackClient>) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(SESSION_IDLE_TIMEOUT)
            .build();

        Self {
            inner: Arc::new(TrackerInner { sessions, slack }),
        }
    }

    /// Register a new tab session and push its activation snapshot.
    pub async fn start_session(&self, start: SessionStart) -> VisitorSession {
        let session = VisitorSession::start(Uuid::new_v4(), start);
        let snapshot = session.clone();

        self.inner
            .sessions
            .insert(session.session_id, Arc::new(Mutex::new(session)))
            .await;

        tracing::info!(
            session_id = %snapshot.session_id,
            visitor_id = %snapshot.visitor_id,
            visit_count = snapshot.visit_count,
            "Analytics session started"
        );
        self.notify(snapshot.activation_event(), &snapshot);
        snapshot
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownSession`] if the session expired or
    /// never existed.
    pub async fn track_page_view(
        &self,
        session_id: Uuid,
        path: &str,
        title: &str,
    ) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| s.track_page_view(path, title, Utc::now()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownSession`] if the session expired or
    /// never existed.
    pub async fn track_cart_event(
        &self,
        session_id: Uuid,
        action: CartAction,
        product_id: &str,
        product_name: &str,
    ) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| {
            s.track_cart_event(action, product_id, product_name, Utc::now());
        })
        .await
    }

    /// Merge contact details and push a `contact_info` snapshot.
    ///
    /// Every call is pushed, even when the details are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownSession`] if the session expired or
    /// never existed.
    pub async fn set_contact_info(
        &self,
        session_id: Uuid,
        update: ContactInfo,
    ) -> Result<(), TrackerError> {
        let (changed, snapshot) = self
            .with_session(session_id, |s| {
                let changed = s.set_contact_info(update);
                (changed, s.clone())
            })
            .await?;

        tracing::debug!(session_id = %session_id, changed, "Contact info updated");
        self.notify(VisitorEvent::ContactInfo, &snapshot);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownSession`] if the session expired or
    /// never existed.
    pub async fn set_visibility(
        &self,
        session_id: Uuid,
        visible: bool,
    ) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| s.set_visibility(visible))
            .await
    }

    /// Copy of a session's current state.
    pub async fn snapshot(&self, session_id: Uuid) -> Option<VisitorSession> {
        let shared = self.inner.sessions.get(&session_id).await?;
        let session = lock(&shared).clone();
        Some(session)
    }

    /// Advance every live session by one second.
    ///
    /// Iterating does not count as access, so ticking never keeps an
    /// abandoned session alive.
    pub fn tick_all(&self) {
        for (_, shared) in &self.inner.sessions {
            lock(&shared).tick();
        }
    }

    /// Start the one-second ticker.
    #[must_use]
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tracker.tick_all();
            }
        })
    }

    async fn with_session<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut VisitorSession) -> R,
    ) -> Result<R, TrackerError> {
        let shared = self
            .inner
            .sessions
            .get(&session_id)
            .await
            .ok_or(TrackerError::UnknownSession(session_id))?;
        let result = f(&mut lock(&shared));
        Ok(result)
    }

    fn notify(&self, event: VisitorEvent, snapshot: &VisitorSession) {
        let Some(slack) = &self.inner.slack else {
            return;
        };
        let fallback = format!("Visitor event: {}", event.as_str());
        slack.post_in_background(fallback, build_visitor_message(event, snapshot));
    }
}

fn lock(shared: &SharedSession) -> std::sync::MutexGuard<'_, VisitorSession> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
