#![forbid(unsafe_code)]

//! Shadow wrapper around the overlay content.
//!
//! A layer cannot both clip its content to rounded corners and draw a shadow
//! outside its bounds, so the overlay is split in two: the wrapper carries
//! the shadow and the content view inside it carries corner radius and
//! clipping.

use alertkit_core::{AutoresizingMask, Rect, Shadow, View, non_negative};

#[derive(Debug, Clone)]
pub struct ShadowWrapper {
    view: View,
}

impl ShadowWrapper {
    pub fn new(frame: Rect, shadow: Option<Shadow>) -> Self {
        let view = View::new(frame);
        view.set_shadow(shadow);
        Self { view }
    }

    #[inline]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Reparent `content` into the wrapper, filling it and tracking its size.
    pub fn wrap(&self, content: &View, corner_radius: f64, clips: bool) {
        content.set_frame(self.view.bounds());
        content.set_autoresizing_mask(AutoresizingMask::FLEXIBLE_SIZE);
        Self::style_content(content, corner_radius, clips);
        self.view.add_subview(content);
    }

    /// Apply corner radius (clamped to `>= 0`) and clipping to `content`.
    pub fn style_content(content: &View, corner_radius: f64, clips: bool) {
        content.set_corner_radius(non_negative(corner_radius));
        content.set_masks_to_bounds(clips);
    }

    pub fn set_shadow(&self, shadow: Option<Shadow>) {
        self.view.set_shadow(shadow);
    }

    pub fn set_frame(&self, frame: Rect) {
        self.view.set_frame(frame);
    }

    /// The wrapped content view, if still attached.
    pub fn content(&self) -> Option<View> {
        self.view.subviews().into_iter().next()
    }

    /// Detach the wrapper and release the content view from it.
    pub fn discard(&self) {
        for child in self.view.subviews() {
            child.remove_from_superview();
        }
        self.view.remove_from_superview();
    }
}
