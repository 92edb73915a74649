#![forbid(unsafe_code)]

//! alertkit public facade.
//!
//! Re-exports the view model, runtime, and overlay widgets, plus a
//! [`prelude`] for the common case:
//!
//! ```ignore
//! use alertkit::prelude::*;
//!
//! let overlay = OverlayContainer::present(&host, &content, &screen, |o| {
//!     o.set_presentation_style(PresentationStyle::Zoom);
//!     o.set_dimming_alpha(0.3);
//! }, None);
//! // later
//! OverlayContainer::dismiss(&*host, true, None);
//! ```

pub use alertkit_core as core;
pub use alertkit_runtime as runtime;
pub use alertkit_widgets as widgets;

pub use alertkit_core::{Point, Rect, Rgba, Size, View};
pub use alertkit_runtime::{Completion, DisplayMetrics, PresentationHost, Screen};
pub use alertkit_widgets::{
    DismissalStyle, OverlayConfig, OverlayContainer, OverlayDelegate, PresentationStyle,
    ShadowConfig,
};

pub mod prelude {
    pub use alertkit_core::{Point, Rect, Rgba, Size, View};
    pub use alertkit_runtime::{Completion, DisplayMetrics, PresentationHost, Screen};
    pub use alertkit_widgets::{
        DismissalStyle, OverlayConfig, OverlayContainer, OverlayDelegate, PresentationStyle,
        ShadowConfig,
    };
}
