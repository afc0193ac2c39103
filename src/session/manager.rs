use crate::ad::model::Advertisement;
use crate::metrics;
use crate::sequencer::{Mode, Outcome, PlaybackEvent, RenderInstruction, Sequencer};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One viewer's playback, hosted server-side
pub struct PlaybackSession {
    pub session_id: String,
    pub sequencer: Sequencer<StdRng>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Instant,
}

/// Snapshot of a session returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub content_source: String,
    /// RFC 3339 creation time
    pub created_at: String,
    pub render: RenderInstruction,
}

impl PlaybackSession {
    fn new(session_id: String, content_source: String, pool: Vec<Advertisement>) -> Self {
        let sequencer = Sequencer::new(pool, content_source, StdRng::from_entropy())
            .with_ended_hook(Box::new(metrics::record_session_ended));
        Self {
            session_id,
            sequencer,
            created_at: Utc::now(),
            last_accessed: Instant::now(),
        }
    }

    fn view(&self) -> SessionView {
        SessionView {
            session_id: self.session_id.clone(),
            content_source: self.sequencer.content_source().to_string(),
            created_at: self.created_at.to_rfc3339(),
            render: self.sequencer.render(),
        }
    }
}

/// Holds every hosted playback session.
///
/// Each session's sequencer is mutated only under its own map entry, so
/// sessions never observe each other.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, PlaybackSession>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Open a session for `content_source`.
    ///
    /// Without an id a fresh one is generated. An existing id on the same
    /// source is returned untouched; on a different source the session is
    /// reinitialized against the new source and `pool`.
    pub fn open(
        &self,
        session_id: Option<String>,
        content_source: String,
        pool: Vec<Advertisement>,
    ) -> SessionView {
        let session_id = session_id.unwrap_or_else(generate_session_id);

        let mut started = false;
        let mut entry = self
            .sessions
            .entry(session_id.clone())
            .or_insert_with(|| {
                info!("Creating session {} for {}", session_id, content_source);
                started = true;
                PlaybackSession::new(session_id.clone(), content_source.clone(), pool.clone())
            });

        if entry.sequencer.content_source() != content_source {
            entry.sequencer.change_source(pool, content_source);
            started = true;
        }
        entry.last_accessed = Instant::now();
        let view = entry.view();
        drop(entry);

        if started {
            record_impression(view.render.mode);
        }

        metrics::set_active_sessions(self.sessions.len());
        view
    }

    pub fn view(&self, session_id: &str) -> Option<SessionView> {
        let mut session = self.sessions.get_mut(session_id)?;
        session.last_accessed = Instant::now();
        Some(session.view())
    }

    /// Reinitialize a session against a new content source and pool
    pub fn change_source(
        &self,
        session_id: &str,
        content_source: String,
        pool: Vec<Advertisement>,
    ) -> Option<SessionView> {
        let mut session = self.sessions.get_mut(session_id)?;
        session.sequencer.change_source(pool, content_source);
        session.last_accessed = Instant::now();
        let view = session.view();
        record_impression(view.render.mode);
        Some(view)
    }

    /// Deliver a playback event to a session
    pub fn dispatch(&self, session_id: &str, event: PlaybackEvent) -> Option<(Outcome, SessionView)> {
        let mut session = self.sessions.get_mut(session_id)?;
        let outcome = session.sequencer.handle(event);
        session.last_accessed = Instant::now();
        if let Outcome::Advanced { to, .. } = outcome {
            record_impression(to);
        }
        debug!(
            "Session {}: {} -> {:?}",
            session_id,
            event.kind(),
            outcome
        );
        Some((outcome, session.view()))
    }

    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        metrics::set_active_sessions(self.sessions.len());
        removed
    }

    /// Drop sessions idle for longer than the TTL
    pub fn cleanup_expired(&self) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_accessed.elapsed() < self.ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
        metrics::set_active_sessions(self.sessions.len());
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Count an impression when `mode` has an ad bound
fn record_impression(mode: Mode) {
    if mode.is_ad() {
        metrics::record_ad_impression(mode.label());
    }
}

fn generate_session_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad::model::fixtures::{ad, skippable};
    use crate::ad::model::{SkipCategory, SlotType};
    use crate::sequencer::Mode;

    const EPISODE_1: &str = "https://cdn.example.com/episode-1.m3u8";
    const EPISODE_2: &str = "https://cdn.example.com/episode-2.m3u8";

    fn pool() -> Vec<Advertisement> {
        vec![
            skippable("A", SlotType::Preroll, 15.0, 5.0),
            ad("B", SlotType::Postroll, SkipCategory::Bumper, 6.0),
        ]
    }

    #[test]
    fn open_creates_session_in_preroll() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let view = manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());

        assert_eq!(view.session_id, "s1");
        assert_eq!(view.content_source, EPISODE_1);
        assert_eq!(view.render.mode, Mode::Preroll);
        assert_eq!(manager.session_count(), 1);
    }

    #[test]
    fn open_generates_ids() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let a = manager.open(None, EPISODE_1.to_string(), Vec::new());
        let b = manager.open(None, EPISODE_1.to_string(), Vec::new());
        assert_eq!(a.session_id.len(), 16);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(manager.session_count(), 2);
    }

    #[test]
    fn reopening_same_source_keeps_state() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let first = manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());
        manager.dispatch("s1", PlaybackEvent::AdEnded {
            surface: first.render.surface,
        });

        let again = manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());
        assert_eq!(again.render.mode, Mode::Content);
        assert_eq!(again.render.surface.session, first.render.surface.session);
    }

    #[test]
    fn reopening_with_new_source_reinitializes() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let first = manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());

        let second = manager.open(Some("s1".to_string()), EPISODE_2.to_string(), pool());
        assert_eq!(second.content_source, EPISODE_2);
        assert_ne!(second.render.surface.session, first.render.surface.session);
        assert_eq!(second.render.mode, Mode::Preroll);
    }

    #[test]
    fn dispatch_advances_and_reports_outcome() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let view = manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());
        let surface = view.render.surface;

        let (outcome, _) = manager
            .dispatch("s1", PlaybackEvent::Skip { surface })
            .unwrap();
        assert_eq!(outcome, Outcome::Rejected);

        manager.dispatch("s1", PlaybackEvent::AdProgress {
            surface,
            elapsed: 5.0,
        });
        let (outcome, view) = manager
            .dispatch("s1", PlaybackEvent::Skip { surface })
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Advanced {
                from: Mode::Preroll,
                to: Mode::Content
            }
        );
        assert_eq!(view.render.active_source, EPISODE_1);
    }

    #[test]
    fn dispatch_to_unknown_session_is_none() {
        let manager = SessionManager::new(Duration::from_secs(300));
        let surface = crate::sequencer::SurfaceId {
            session: crate::sequencer::SessionToken(1),
            playback: 1,
        };
        assert!(manager
            .dispatch("missing", PlaybackEvent::AdEnded { surface })
            .is_none());
    }

    #[test]
    fn change_source_on_existing_session() {
        let manager = SessionManager::new(Duration::from_secs(300));
        manager.open(Some("s1".to_string()), EPISODE_1.to_string(), pool());

        let view = manager
            .change_source("s1", EPISODE_2.to_string(), Vec::new())
            .unwrap();
        assert_eq!(view.content_source, EPISODE_2);
        assert_eq!(view.render.mode, Mode::Content);
        assert!(manager.change_source("nope", EPISODE_2.to_string(), Vec::new()).is_none());
    }

    #[test]
    fn session_removal() {
        let manager = SessionManager::new(Duration::from_secs(300));
        manager.open(Some("s1".to_string()), EPISODE_1.to_string(), Vec::new());

        assert!(manager.remove("s1"));
        assert!(!manager.remove("s1"));
        assert_eq!(manager.session_count(), 0);
        assert!(manager.view("s1").is_none());
    }

    #[test]
    fn cleanup_evicts_idle_sessions() {
        let manager = SessionManager::new(Duration::from_millis(1));
        manager.open(Some("s1".to_string()), EPISODE_1.to_string(), Vec::new());

        std::thread::sleep(Duration::from_millis(5));
        manager.cleanup_expired();
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn cleanup_keeps_fresh_sessions() {
        let manager = SessionManager::new(Duration::from_secs(300));
        manager.open(Some("s1".to_string()), EPISODE_1.to_string(), Vec::new());
        manager.cleanup_expired();
        assert_eq!(manager.session_count(), 1);
    }
}
