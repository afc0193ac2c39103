use crate::ad::model::{Advertisement, SlotType};
use crate::ad::selection::select_candidate;
use crate::ad::skip::update_progress;
use crate::sequencer::event::{Outcome, PlaybackEvent};
use crate::sequencer::state::{Mode, SequencerState, SessionToken, SurfaceId};
use crate::sequencer::surface::{RenderInstruction, render};
use rand::Rng;
use tracing::{debug, info, warn};

/// Hook invoked once when a session emits `ended`
pub type EndedHook = Box<dyn FnMut() + Send + Sync>;

/// Ad-interstitial playback sequencer.
///
/// Drives one player surface through pre-roll → content → post-roll for
/// a content source and an immutable ad pool. The host delivers events
/// through the `on_*` trigger methods (or [`Sequencer::handle`]) and
/// redraws from [`Sequencer::render`] after each one.
pub struct Sequencer<R> {
    pool: Vec<Advertisement>,
    content_source: String,
    state: SequencerState,
    rng: R,
    sessions_started: u64,
    on_session_ended: Option<EndedHook>,
}

impl<R: Rng> Sequencer<R> {
    /// Create a sequencer and start its first session
    pub fn new(pool: Vec<Advertisement>, content_source: impl Into<String>, rng: R) -> Self {
        let mut sequencer = Self {
            pool,
            content_source: content_source.into(),
            state: SequencerState::fresh(SessionToken(0)),
            rng,
            sessions_started: 0,
            on_session_ended: None,
        };
        sequencer.start_session();
        sequencer
    }

    pub fn with_ended_hook(mut self, hook: EndedHook) -> Self {
        self.on_session_ended = Some(hook);
        self
    }

    /// Abandon the current session and start over with a new source and pool.
    ///
    /// Whatever ad was bound is detached; events stamped with the old
    /// session are dropped from now on.
    pub fn change_source(
        &mut self,
        pool: Vec<Advertisement>,
        content_source: impl Into<String>,
    ) -> SessionToken {
        info!(
            "Session {} abandoned in {:?}, reinitializing",
            self.state.session.0, self.state.mode
        );
        self.pool = pool;
        self.content_source = content_source.into();
        self.start_session();
        self.state.session
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn content_source(&self) -> &str {
        &self.content_source
    }

    pub fn surface(&self) -> SurfaceId {
        self.state.surface()
    }

    pub fn render(&self) -> RenderInstruction {
        render(&self.state, &self.content_source)
    }

    /// Dispatch a tagged event to the matching trigger
    pub fn handle(&mut self, event: PlaybackEvent) -> Outcome {
        match event {
            PlaybackEvent::AdProgress { surface, elapsed } => self.on_ad_progress(surface, elapsed),
            PlaybackEvent::AdEnded { surface } => self.on_ad_playback_ended(surface),
            PlaybackEvent::AdError { surface } => self.on_ad_media_error(surface),
            PlaybackEvent::Skip { surface } => self.on_skip_requested(surface),
            PlaybackEvent::ContentEnded { surface } => self.on_content_playback_ended(surface),
        }
    }

    pub fn on_ad_progress(&mut self, surface: SurfaceId, elapsed_secs: f64) -> Outcome {
        if !self.is_live(surface) {
            return Outcome::Ignored;
        }
        let Some(ad) = &self.state.bound_ad else {
            return Outcome::Ignored;
        };

        let status = update_progress(ad, elapsed_secs);
        self.state.apply(status);
        Outcome::Updated
    }

    pub fn on_ad_playback_ended(&mut self, surface: SurfaceId) -> Outcome {
        if !self.is_live(surface) || !self.state.mode.is_ad() {
            return Outcome::Ignored;
        }
        self.leave_ad()
    }

    /// A broken ad source counts as the ad having ended
    pub fn on_ad_media_error(&mut self, surface: SurfaceId) -> Outcome {
        if !self.is_live(surface) || !self.state.mode.is_ad() {
            return Outcome::Ignored;
        }
        if let Some(ad) = &self.state.bound_ad {
            warn!("Ad {} failed to play, moving on", ad.id);
        }
        self.leave_ad()
    }

    pub fn on_skip_requested(&mut self, surface: SurfaceId) -> Outcome {
        if !self.is_live(surface) || !self.state.mode.is_ad() {
            return Outcome::Ignored;
        }
        if !self.state.can_skip {
            debug!("Skip rejected in {:?}: not yet skippable", self.state.mode);
            return Outcome::Rejected;
        }
        self.leave_ad()
    }

    pub fn on_content_playback_ended(&mut self, surface: SurfaceId) -> Outcome {
        if !self.is_live(surface) || self.state.mode != Mode::Content {
            return Outcome::Ignored;
        }

        match select_candidate(&self.pool, SlotType::Postroll, &mut self.rng).cloned() {
            Some(ad) => {
                info!("Session {}: post-roll {} bound", self.state.session.0, ad.id);
                self.state.bind_ad(Mode::Postroll, ad);
                Outcome::Advanced {
                    from: Mode::Content,
                    to: Mode::Postroll,
                }
            }
            None => self.end_session(),
        }
    }

    fn start_session(&mut self) {
        self.sessions_started += 1;
        let session = SessionToken(self.sessions_started);
        self.state = SequencerState::fresh(session);

        match select_candidate(&self.pool, SlotType::Preroll, &mut self.rng).cloned() {
            Some(ad) => {
                info!("Session {}: pre-roll {} bound", session.0, ad.id);
                self.state.bind_ad(Mode::Preroll, ad);
            }
            None => {
                info!("Session {}: no pre-roll, starting content", session.0);
                self.state.attach_content();
            }
        }
    }

    fn leave_ad(&mut self) -> Outcome {
        match self.state.mode {
            Mode::Preroll => {
                self.state.attach_content();
                Outcome::Advanced {
                    from: Mode::Preroll,
                    to: Mode::Content,
                }
            }
            Mode::Postroll => self.end_session(),
            Mode::Content => Outcome::Ignored,
        }
    }

    fn end_session(&mut self) -> Outcome {
        info!("Session {} ended", self.state.session.0);
        self.state.finish();
        if let Some(hook) = self.on_session_ended.as_mut() {
            hook();
        }
        Outcome::Ended
    }

    fn is_live(&self, surface: SurfaceId) -> bool {
        if surface.session != self.state.session {
            debug!(
                "Dropping event for session {} (current {})",
                surface.session.0, self.state.session.0
            );
            return false;
        }
        if self.state.ended {
            return false;
        }
        if surface.playback != self.state.playback {
            debug!(
                "Dropping event for detached playback {} (current {})",
                surface.playback, self.state.playback
            );
            return false;
        }
        true
    }
}
