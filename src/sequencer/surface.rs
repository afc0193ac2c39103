//! Projection of sequencer state onto the single player surface.
//!
//! [`render`] is pure: it is called after every transition and tells the
//! host which source to attach and which ad affordances to draw.

use crate::ad::model::SkipCategory;
use crate::sequencer::state::{Mode, SequencerState, SurfaceId};
use serde::Serialize;

/// Skip button / badge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SkipUi {
    /// No skip affordance (content, or an ad that can never be skipped)
    Hidden,
    /// "Skip in N s" badge
    Countdown { seconds: u32 },
    /// Skip button enabled
    Available,
}

/// The ad currently bound to the surface, as far as the UI needs it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAdView {
    pub id: String,
    pub title: String,
    pub category: SkipCategory,
}

/// Everything a host needs to draw the surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInstruction {
    /// Stamp for events raised by whatever gets attached now
    pub surface: SurfaceId,
    pub mode: Mode,
    pub active_source: String,
    /// Native playback controls; never shown while an ad is bound
    pub controls_visible: bool,
    pub skip_ui: SkipUi,
    /// Seconds left in the bound ad
    pub countdown: Option<u32>,
    /// Only present when the bound ad has a click-through URL
    pub click_through: Option<String>,
    pub ad: Option<BoundAdView>,
    pub ended: bool,
}

/// Map the state record to a render instruction
pub fn render(state: &SequencerState, content_source: &str) -> RenderInstruction {
    let surface = state.surface();

    let Some(ad) = &state.bound_ad else {
        return RenderInstruction {
            surface,
            mode: state.mode,
            active_source: content_source.to_string(),
            controls_visible: true,
            skip_ui: SkipUi::Hidden,
            countdown: None,
            click_through: None,
            ad: None,
            ended: state.ended,
        };
    };

    let skip_ui = if state.can_skip {
        SkipUi::Available
    } else if let Some(seconds) = state.skip_in {
        SkipUi::Countdown { seconds }
    } else {
        SkipUi::Hidden
    };

    RenderInstruction {
        surface,
        mode: state.mode,
        active_source: ad.media_url.clone(),
        controls_visible: false,
        skip_ui,
        countdown: Some(state.remaining),
        click_through: ad.link_url.clone(),
        ad: Some(BoundAdView {
            id: ad.id.clone(),
            title: ad.title.clone(),
            category: ad.skip_category,
        }),
        ended: state.ended,
    }
}
