use crate::ad::model::Advertisement;
use crate::ad::skip::{SkipStatus, update_progress};
use serde::{Deserialize, Serialize};

/// What the player surface is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Preroll,
    Content,
    Postroll,
}

impl Mode {
    pub fn is_ad(self) -> bool {
        matches!(self, Mode::Preroll | Mode::Postroll)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Preroll => "preroll",
            Mode::Content => "content",
            Mode::Postroll => "postroll",
        }
    }
}

/// Identifies one playback session of a sequencer.
///
/// A new token is issued on every (re)initialization; events stamped with
/// an older token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub u64);

/// One attachment of a media source to the player surface.
///
/// `playback` increases every time a new source (ad or content) is bound
/// within a session, so an end-of-media signal for a source that is no
/// longer attached can be recognised and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId {
    pub session: SessionToken,
    pub playback: u64,
}

/// The single mutable record owned by a sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerState {
    pub session: SessionToken,
    pub mode: Mode,
    /// `None` exactly when mode is `Content`
    pub bound_ad: Option<Advertisement>,
    pub can_skip: bool,
    /// Only meaningful while an ad is bound
    pub remaining: u32,
    pub skip_in: Option<u32>,
    pub playback: u64,
    /// Set once `ended` has been emitted for this session
    pub ended: bool,
}

impl SequencerState {
    pub(crate) fn fresh(session: SessionToken) -> Self {
        Self {
            session,
            mode: Mode::Content,
            bound_ad: None,
            can_skip: false,
            remaining: 0,
            skip_in: None,
            playback: 0,
            ended: false,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        SurfaceId {
            session: self.session,
            playback: self.playback,
        }
    }

    /// Bind an ad to the surface and reset the skip tracker to its start
    pub(crate) fn bind_ad(&mut self, mode: Mode, ad: Advertisement) {
        debug_assert!(mode.is_ad());
        self.playback += 1;
        self.mode = mode;
        self.apply(update_progress(&ad, 0.0));
        self.bound_ad = Some(ad);
    }

    pub(crate) fn attach_content(&mut self) {
        self.playback += 1;
        self.mode = Mode::Content;
        self.clear_ad();
    }

    pub(crate) fn finish(&mut self) {
        self.playback += 1;
        self.mode = Mode::Content;
        self.clear_ad();
        self.ended = true;
    }

    pub(crate) fn apply(&mut self, status: SkipStatus) {
        self.remaining = status.remaining;
        self.can_skip = status.can_skip;
        self.skip_in = status.skip_in;
    }

    fn clear_ad(&mut self) {
        self.bound_ad = None;
        self.can_skip = false;
        self.remaining = 0;
        self.skip_in = None;
    }
}
