//! Skip eligibility and countdown for a bound ad.
//!
//! Everything here is recomputed from scratch on each progress tick from
//! the ad's declared timing and the player's reported position. There is
//! no independent timer, so the countdown cannot drift from playback.

use crate::ad::model::Advertisement;
use serde::Serialize;

/// Skip/countdown state derived from one progress tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipStatus {
    /// Whole seconds until the ad finishes, never negative
    pub remaining: u32,
    /// Whether a skip request would be honoured right now
    pub can_skip: bool,
    /// Whole seconds until skipping unlocks, only while it is still pending
    pub skip_in: Option<u32>,
}

/// Recompute skip state for `ad` at `elapsed_secs` of its playback.
///
/// - `remaining = ceil(duration - elapsed)`, floored at 0
/// - never skippable for `Bumper` / `NonSkippable`
/// - a `Skippable` ad with no skip offset is never skippable
///
/// Negative or non-finite positions are treated as 0.
pub fn update_progress(ad: &Advertisement, elapsed_secs: f64) -> SkipStatus {
    let elapsed = if elapsed_secs.is_finite() {
        elapsed_secs.max(0.0)
    } else {
        0.0
    };
    let remaining = whole_secs_left(ad.duration - elapsed);

    if !ad.skip_category.allows_skip() {
        return SkipStatus {
            remaining,
            can_skip: false,
            skip_in: None,
        };
    }

    match ad.skip_after {
        Some(offset) if elapsed >= offset => SkipStatus {
            remaining,
            can_skip: true,
            skip_in: None,
        },
        Some(offset) => SkipStatus {
            remaining,
            can_skip: false,
            skip_in: Some(whole_secs_left(offset - elapsed)),
        },
        None => SkipStatus {
            remaining,
            can_skip: false,
            skip_in: None,
        },
    }
}

fn whole_secs_left(secs: f64) -> u32 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    secs.ceil().min(f64::from(u32::MAX)) as u32
}
