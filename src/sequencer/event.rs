use crate::sequencer::state::{Mode, SurfaceId};
use serde::{Deserialize, Serialize};

/// Events a host delivers to the sequencer, each stamped with the surface
/// it was rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Time-update tick from the ad element
    AdProgress { surface: SurfaceId, elapsed: f64 },
    /// The ad element reached its end
    AdEnded { surface: SurfaceId },
    /// The ad media failed to load or play
    AdError { surface: SurfaceId },
    /// The viewer pressed "skip"
    Skip { surface: SurfaceId },
    /// The content element reached its end
    ContentEnded { surface: SurfaceId },
}

impl PlaybackEvent {
    pub fn surface(&self) -> SurfaceId {
        match *self {
            PlaybackEvent::AdProgress { surface, .. }
            | PlaybackEvent::AdEnded { surface }
            | PlaybackEvent::AdError { surface }
            | PlaybackEvent::Skip { surface }
            | PlaybackEvent::ContentEnded { surface } => surface,
        }
    }

    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PlaybackEvent::AdProgress { .. } => "ad_progress",
            PlaybackEvent::AdEnded { .. } => "ad_ended",
            PlaybackEvent::AdError { .. } => "ad_error",
            PlaybackEvent::Skip { .. } => "skip",
            PlaybackEvent::ContentEnded { .. } => "content_ended",
        }
    }
}

/// Result of delivering one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The surface switched to a different mode
    Advanced { from: Mode, to: Mode },
    /// Skip/countdown state was recomputed
    Updated,
    /// A skip request arrived before skipping was allowed
    Rejected,
    /// Stale, duplicate or out-of-place event; nothing changed
    Ignored,
    /// The session finished; emitted once
    Ended,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Advanced { .. } => "advanced",
            Outcome::Updated => "updated",
            Outcome::Rejected => "rejected",
            Outcome::Ignored => "ignored",
            Outcome::Ended => "ended",
        }
    }
}
