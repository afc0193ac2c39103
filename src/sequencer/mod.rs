//! Ad-interstitial playback sequencer.
//!
//! A single-consumer state machine that decides what the player surface
//! shows (pre-roll ad, content, post-roll ad) and when control passes
//! between them. It owns no timers and performs no I/O: hosts feed it
//! playback events and redraw from its render instruction.

pub mod event;
pub mod machine;
pub mod state;
pub mod surface;

pub use event::{Outcome, PlaybackEvent};
pub use machine::{EndedHook, Sequencer};
pub use state::{Mode, SequencerState, SessionToken, SurfaceId};
pub use surface::{BoundAdView, RenderInstruction, SkipUi, render};
