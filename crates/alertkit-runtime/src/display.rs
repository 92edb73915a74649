#![forbid(unsafe_code)]

//! Display metrics provider.
//!
//! [`DisplayMetrics`] owns the current display size as an [`Observable`] so
//! overlays can size themselves relative to the screen and react to
//! rotation. A thread-local instance is available via
//! [`DisplayMetrics::global`].

use alertkit_core::Size;

use crate::reactive::{Observable, Subscription};

/// Display size used until the host reports a real one.
pub const DEFAULT_DISPLAY_SIZE: Size = Size::new(390.0, 844.0);

thread_local! {
    static GLOBAL_DISPLAY: DisplayMetrics = DisplayMetrics::new(DEFAULT_DISPLAY_SIZE);
}

/// Observable display size.
#[derive(Clone, Debug)]
pub struct DisplayMetrics {
    size: Observable<Size>,
}

impl DisplayMetrics {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size: Observable::new(size.non_negative()),
        }
    }

    /// The thread-local display shared by the UI thread.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_DISPLAY.with(Clone::clone)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size.get()
    }

    /// Update the display size. Negative dimensions clamp to zero.
    pub fn set_size(&self, size: Size) {
        self.size.set(size.non_negative());
    }

    /// The underlying observable, for building bindings.
    #[must_use]
    pub fn observable(&self) -> &Observable<Size> {
        &self.size
    }

    pub fn subscribe(&self, callback: impl Fn(&Size) + 'static) -> Subscription {
        self.size.subscribe(callback)
    }
}
