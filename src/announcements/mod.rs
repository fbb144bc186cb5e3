//! Announcements served from a cache
//!
//! Two messages live here: the "nearly sold out" announcement, recomputed from
//! a conference query on demand and on a timer, and the featured speaker,
//! recorded when a session is created for a speaker who already has one in
//! the same conference.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ConferenceResult;
use crate::query::{ConferenceField, FilterValue, Operator, QueryExecutor, QueryPlan};
use crate::store::EntityStore;
use crate::types::Conference;

pub use cache::{Cache, MemoryCache};

/// Cache key of the nearly-sold-out announcement
pub const RECENT_ANNOUNCEMENTS_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Cache key of the featured speaker message
pub const FEATURED_SPEAKER_KEY: &str = "FEATURED_SPEAKER";

/// Conferences with at most this many seats left count as nearly sold out
pub const NEARLY_SOLD_OUT_SEATS: i64 = 5;

const ANNOUNCEMENT_PREFIX: &str =
    "Last chance to attend! The following conferences are nearly sold out: ";

/// Reads and writes announcement messages through a [`Cache`]
#[derive(Clone)]
pub struct Announcements {
    cache: Arc<dyn Cache>,
}

impl Announcements {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Recompute the nearly-sold-out announcement and store or clear it
    pub fn refresh(&self, store: &EntityStore) -> ConferenceResult<Option<String>> {
        let plan = QueryPlan::<ConferenceField>::builder()
            .filter(
                ConferenceField::SeatsAvailable,
                Operator::Lte,
                FilterValue::Int(NEARLY_SOLD_OUT_SEATS),
            )?
            .filter(ConferenceField::SeatsAvailable, Operator::Gt, FilterValue::Int(0))?
            .build();

        let names = QueryExecutor::new(store)
            .run::<_, Conference>(&plan)
            .project(|conference| conference.name);

        if names.is_empty() {
            self.cache.delete(RECENT_ANNOUNCEMENTS_KEY);
            debug!("No nearly sold out conferences, announcement cleared");
            return Ok(None);
        }

        let announcement = format!("{}{}", ANNOUNCEMENT_PREFIX, names.join(", "));
        self.cache
            .set(RECENT_ANNOUNCEMENTS_KEY, announcement.clone(), None);
        info!(conferences = names.len(), "Announcement refreshed");
        Ok(Some(announcement))
    }

    /// Current announcement, empty when there is none
    pub fn current(&self) -> String {
        self.cache.get(RECENT_ANNOUNCEMENTS_KEY).unwrap_or_default()
    }

    /// Record that `speaker` has several sessions in one conference
    ///
    /// `session_names` lists the new session first.
    pub fn record_featured_speaker(&self, speaker: &str, session_names: &[String]) -> String {
        let message = format!(
            "Speaker {} has {} sessions in this conference: {}.",
            speaker,
            session_names.len(),
            session_names.join(",")
        );
        self.cache.set(FEATURED_SPEAKER_KEY, message.clone(), None);
        info!(speaker, sessions = session_names.len(), "Featured speaker recorded");
        message
    }

    /// Current featured speaker message, empty when there is none
    pub fn featured_speaker(&self) -> String {
        self.cache.get(FEATURED_SPEAKER_KEY).unwrap_or_default()
    }
}

/// Refresh the announcement every `every`, starting immediately
pub fn spawn_refresh_task(
    announcements: Announcements,
    store: Arc<EntityStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = announcements.refresh(&store) {
                warn!(error = %e, "Announcement refresh failed");
            }
        }
    })
}
