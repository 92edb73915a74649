#![forbid(unsafe_code)]

//! Dimming view behind the overlay.

use std::rc::Rc;

use alertkit_core::{AutoresizingMask, Rect, Rgba, View};
use alertkit_runtime::{Track, TransitionCoordinator};

/// Full-container view that dims whatever the overlay covers and forwards
/// taps to the transition controller.
#[derive(Debug, Clone)]
pub struct Backdrop {
    view: View,
}

impl Backdrop {
    /// Transparent backdrop of `color`; `on_tap` runs for every tap.
    pub fn new(color: Rgba, on_tap: Rc<dyn Fn()>) -> Self {
        let view = View::new(Rect::ZERO);
        view.set_background_color(Some(color));
        view.set_autoresizing_mask(AutoresizingMask::FLEXIBLE_SIZE);
        view.set_alpha(0.0);
        view.set_tap_handler(Some(on_tap));
        Self { view }
    }

    #[inline]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Fill `container` beneath every existing subview.
    pub fn install(&self, container: &View) {
        self.view.set_frame(container.bounds());
        container.insert_subview(&self.view, 0);
    }

    pub fn is_installed(&self) -> bool {
        self.view.superview().is_some()
    }

    pub fn set_color(&self, color: Rgba) {
        self.view.set_background_color(Some(color));
    }

    pub fn layout(&self, bounds: Rect) {
        self.view.set_frame(bounds);
    }

    /// Fade to `alpha` alongside the host transition, or jump there when
    /// there is nothing to run alongside.
    pub fn fade_to(&self, alpha: f64, coordinator: Option<&dyn TransitionCoordinator>) {
        let scheduled = coordinator
            .is_some_and(|c| c.animate_alongside(vec![Track::new(&self.view).alpha(alpha)], None));
        if !scheduled {
            self.view.set_alpha(alpha);
        }
    }

    pub fn remove(&self) {
        self.view.set_tap_handler(None);
        self.view.remove_from_superview();
    }
}
