#![forbid(unsafe_code)]

//! Keyframes for each presentation and dismissal style.
//!
//! Pure geometry: given the container bounds and the overlay's resting frame,
//! compute where an animation starts and ends. The transition controller
//! applies the start keyframe and hands the end keyframe to the animator.

use alertkit_core::{Point, Rect, Size, non_negative};

use super::config::{DismissalStyle, PresentationStyle};

/// Frame and opacity of the animated view at one end of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: Rect,
    pub alpha: f64,
}

impl Keyframe {
    #[inline]
    pub const fn new(frame: Rect, alpha: f64) -> Self {
        Self { frame, alpha }
    }

    #[inline]
    pub const fn opaque(frame: Rect) -> Self {
        Self::new(frame, 1.0)
    }
}

/// Start and end of one transition direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPlan {
    pub from: Keyframe,
    pub to: Keyframe,
    /// `false` when the end keyframe is applied without animating.
    pub animated: bool,
}

/// Overlay size: `(width - 2 * margin, height)`, each clamped to `>= 0`.
#[must_use]
pub fn content_size(display_width: f64, margin: f64, height: f64) -> Size {
    Size::new(display_width - 2.0 * non_negative(margin), height).non_negative()
}

/// Resting frame: `content` centered in `container`.
#[must_use]
pub fn final_frame(container: Rect, content: Size) -> Rect {
    container.centered(content.non_negative())
}

/// Entrance keyframes for `style`, ending at `final_frame`.
///
/// Bottom and Top start fully outside the container with the final size;
/// Zoom and ZoomFade start collapsed at the final frame's center.
#[must_use]
pub fn presentation_plan(style: PresentationStyle, container: Rect, final_frame: Rect) -> TransitionPlan {
    let start = match style {
        PresentationStyle::Bottom => final_frame.with_origin(Point::new(
            final_frame.x(),
            container.max_y(),
        )),
        PresentationStyle::Top => final_frame.with_origin(Point::new(
            final_frame.x(),
            container.min_y() - final_frame.height(),
        )),
        PresentationStyle::Zoom | PresentationStyle::ZoomFade => {
            Rect::collapsed_at(final_frame.center())
        }
        PresentationStyle::None => final_frame,
    };
    let start_alpha = if style.fades() { 0.0 } else { 1.0 };
    TransitionPlan {
        from: Keyframe::new(start, start_alpha),
        to: Keyframe::opaque(final_frame),
        animated: style.is_animated(),
    }
}

/// Exit keyframes for `style`, starting from the overlay's `current` frame.
///
/// Bottom moves down by `current.max_y()`, which lands the overlay exactly
/// below the container when it rests centered; Top moves up by the same
/// amount. Zoom and ZoomFade collapse into the current center. None keeps
/// the frame.
#[must_use]
pub fn dismissal_plan(style: DismissalStyle, current: Rect) -> TransitionPlan {
    let end = match style {
        DismissalStyle::Bottom => current.offset_by(0.0, current.max_y()),
        DismissalStyle::Top => current.offset_by(0.0, -current.max_y()),
        DismissalStyle::Zoom | DismissalStyle::ZoomFade => Rect::collapsed_at(current.center()),
        DismissalStyle::None => current,
    };
    let end_alpha = if style.fades() { 0.0 } else { 1.0 };
    TransitionPlan {
        from: Keyframe::opaque(current),
        to: Keyframe::new(end, end_alpha),
        animated: style.is_animated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 400.0, 800.0);

    fn resting() -> Rect {
        final_frame(CONTAINER, content_size(400.0, 40.0, 240.0))
    }

    #[test]
    fn resting_frame_is_centered() {
        assert_eq!(resting(), Rect::new(40.0, 280.0, 320.0, 240.0));
    }

    #[test]
    fn bottom_starts_below_container() {
        let plan = presentation_plan(PresentationStyle::Bottom, CONTAINER, resting());
        assert_eq!(plan.from.frame, Rect::new(40.0, 800.0, 320.0, 240.0));
        assert_eq!(plan.from.alpha, 1.0);
        assert_eq!(plan.to, Keyframe::opaque(resting()));
        assert!(plan.animated);
    }

    #[test]
    fn top_starts_above_container() {
        let plan = presentation_plan(PresentationStyle::Top, CONTAINER, resting());
        assert_eq!(plan.from.frame, Rect::new(40.0, -240.0, 320.0, 240.0));
    }

    #[test]
    fn zoom_fade_starts_collapsed_and_transparent() {
        let plan = presentation_plan(PresentationStyle::ZoomFade, CONTAINER, resting());
        assert_eq!(plan.from.frame, Rect::collapsed_at(Point::new(200.0, 400.0)));
        assert_eq!(plan.from.alpha, 0.0);
        assert_eq!(plan.to.alpha, 1.0);
    }

    #[test]
    fn plain_zoom_stays_opaque() {
        let plan = presentation_plan(PresentationStyle::Zoom, CONTAINER, resting());
        assert_eq!(plan.from.alpha, 1.0);
        assert!(plan.from.frame.is_empty());
    }

    #[test]
    fn no_style_is_not_animated() {
        let plan = presentation_plan(PresentationStyle::None, CONTAINER, resting());
        assert!(!plan.animated);
        assert_eq!(plan.from.frame, plan.to.frame);

        let plan = dismissal_plan(DismissalStyle::None, resting());
        assert!(!plan.animated);
        assert_eq!(plan.to.frame, resting());
        assert_eq!(plan.to.alpha, 1.0);
    }

    #[test]
    fn bottom_dismissal_leaves_through_bottom_edge() {
        let plan = dismissal_plan(DismissalStyle::Bottom, resting());
        assert_eq!(plan.to.frame, Rect::new(40.0, 800.0, 320.0, 240.0));
        assert_eq!(plan.to.frame.min_y(), CONTAINER.max_y());
    }

    #[test]
    fn top_dismissal_leaves_through_top_edge() {
        let plan = dismissal_plan(DismissalStyle::Top, resting());
        assert_eq!(plan.to.frame.max_y(), CONTAINER.min_y());
    }

    #[test]
    fn zoom_fade_dismissal_collapses_and_fades() {
        let plan = dismissal_plan(DismissalStyle::ZoomFade, resting());
        assert_eq!(plan.to.frame, Rect::collapsed_at(resting().center()));
        assert_eq!(plan.to.alpha, 0.0);
        assert_eq!(plan.from.alpha, 1.0);
    }

    #[test]
    fn oversized_margin_collapses_width() {
        assert_eq!(content_size(100.0, 80.0, 50.0), Size::new(0.0, 50.0));
    }

    proptest! {
        #[test]
        fn resting_frame_center_matches_container(
            w in 0.0f64..2000.0,
            h in 0.0f64..2000.0,
            margin in -50.0f64..500.0,
            height in -50.0f64..1000.0,
        ) {
            let container = Rect::new(0.0, 0.0, w, h);
            let frame = final_frame(container, content_size(w, margin, height));
            prop_assert!(frame.width() >= 0.0);
            prop_assert!(frame.height() >= 0.0);
            prop_assert!((frame.mid_x() - container.mid_x()).abs() < 1e-9);
            prop_assert!((frame.mid_y() - container.mid_y()).abs() < 1e-9);
        }

        #[test]
        fn slide_plans_preserve_size(
            w in 1.0f64..2000.0,
            h in 1.0f64..2000.0,
            height in 0.0f64..500.0,
        ) {
            let container = Rect::new(0.0, 0.0, w, h);
            let frame = final_frame(container, content_size(w, 10.0, height));
            for style in [PresentationStyle::Bottom, PresentationStyle::Top] {
                let plan = presentation_plan(style, container, frame);
                prop_assert_eq!(plan.from.frame.size, frame.size);
                prop_assert_eq!(plan.from.frame.x(), frame.x());
            }
            for style in [DismissalStyle::Bottom, DismissalStyle::Top] {
                let plan = dismissal_plan(style, frame);
                prop_assert_eq!(plan.to.frame.size, frame.size);
            }
        }
    }
}
