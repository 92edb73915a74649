#![forbid(unsafe_code)]

//! Overlay widgets for alertkit.

pub mod alert;

pub use alert::{
    ConfigError, DismissalStyle, OverlayConfig, OverlayContainer, OverlayDelegate,
    PresentationStyle, ShadowConfig, TransitionController, TransitionPhase,
};
