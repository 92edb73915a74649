#![forbid(unsafe_code)]

//! Alert overlay: a centered, dimmed-backdrop modal with custom transitions.
//!
//! # Layering
//!
//! ```text
//! container view (host)
//! ├── backdrop        dims everything below, dismisses on tap
//! └── shadow wrapper  carries the drop shadow
//!     └── content     rounded, clipped root view of the overlay screen
//!         └── caller view
//! ```
//!
//! - [`OverlayContainer`]: the screen callers present. Owns the
//!   [`OverlayConfig`] and forwards every change to its controller.
//! - [`TransitionController`]: presentation controller plus animator for
//!   both directions; builds and tears down the backdrop and wrapper.
//! - [`frames`]: keyframe geometry for each [`PresentationStyle`] and
//!   [`DismissalStyle`].
//!
//! # Animation Styles
//!
//! | Style      | Entrance                     | Exit                          |
//! |------------|------------------------------|-------------------------------|
//! | `Bottom`   | slide up from below          | slide down past the bottom    |
//! | `Top`      | slide down from above        | slide up past the top         |
//! | `Zoom`     | grow from center             | shrink into center            |
//! | `ZoomFade` | grow from center, fade in    | shrink into center, fade out  |
//! | `None`     | appear in place, no duration | vanish in place, no duration  |
//!
//! The backdrop fades alongside the host transition to
//! [`OverlayConfig::dimming_alpha`] on entrance and back to zero on exit.

pub mod backdrop;
pub mod config;
pub mod container;
pub mod frames;
pub mod shadow;
pub mod transition;

pub use backdrop::Backdrop;
pub use config::{ConfigError, DismissalStyle, OverlayConfig, PresentationStyle, ShadowConfig};
pub use container::{OverlayContainer, OverlayDelegate};
pub use frames::{Keyframe, TransitionPlan};
pub use shadow::ShadowWrapper;
pub use transition::{TransitionController, TransitionPhase};
