#![forbid(unsafe_code)]

//! Contracts between the host's transition machinery and custom transitions.
//!
//! When a screen with [`ModalPresentationStyle::Custom`] is presented, the
//! host asks the screen's [`TransitioningDelegate`] for:
//!
//! 1) a [`PresentationController`] that owns chrome around the presented
//!    content (backdrop, wrappers) and answers layout queries, and
//! 2) an [`AnimatedTransitioning`] object per direction that animates the
//!    content and reports completion through the [`TransitionContext`].
//!
//! Host call order for one presentation:
//!
//! ```text
//! attach_container_view
//! presentation_transition_will_begin(coordinator)
//! animate_transition(ctx)            -> ctx.complete_transition(completed)
//! presentation_transition_did_end(completed)
//! ```
//!
//! Dismissal is symmetric with the `dismissal_*` hooks.
//!
//! [`ModalPresentationStyle::Custom`]: crate::screen::ModalPresentationStyle::Custom

use std::rc::Rc;
use std::time::Duration;

use alertkit_core::{Rect, Size, View};

use crate::animation::{AnimationCompletion, Animator, Track};
use crate::screen::Screen;

/// Which side of a transition a screen or view is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKey {
    From,
    To,
}

/// Direction of a modal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionDirection {
    Presenting,
    Dismissing,
}

/// Host-provided state for one running transition.
pub trait TransitionContext {
    /// The view in which the transition takes place.
    fn container_view(&self) -> View;

    fn screen(&self, key: TransitionKey) -> Option<Screen>;

    /// The view that participates in the transition for `key`, if any.
    fn view(&self, key: TransitionKey) -> Option<View>;

    /// Frame of `screen`'s view before the transition. `Rect::ZERO` if unknown.
    fn initial_frame(&self, screen: &Screen) -> Rect;

    /// Frame of `screen`'s view after the transition. `Rect::ZERO` if unknown.
    fn final_frame(&self, screen: &Screen) -> Rect;

    /// Whether the caller asked for an animated transition.
    fn is_animated(&self) -> bool;

    /// Whether the host has cancelled this transition.
    fn transition_was_cancelled(&self) -> bool;

    /// Report the terminal state. Must be called exactly once.
    fn complete_transition(&self, did_complete: bool);

    /// Animation primitive used for this transition.
    fn animator(&self) -> Rc<dyn Animator>;
}

/// Runs secondary animations in lockstep with the host's transition.
pub trait TransitionCoordinator {
    /// Schedule `tracks` with the transition's start time and duration.
    ///
    /// Returns `false` if the animation could not be scheduled (targets are
    /// then applied immediately).
    fn animate_alongside(
        &self,
        tracks: Vec<Track>,
        completion: Option<AnimationCompletion>,
    ) -> bool;
}

/// Owner of presentation chrome and layout for a presented screen.
pub trait PresentationController {
    /// Host hands over the view the transition happens in.
    fn attach_container_view(&self, container: View);

    /// View the host should insert and animate for the presented screen.
    fn presented_view(&self) -> Option<View>;

    /// Frame of the presented view once the presentation has finished.
    fn frame_of_presented_view_in_container_view(&self) -> Rect;

    /// Size for a child given its parent's size.
    fn size_for_child(&self, child: &Screen, parent_size: Size) -> Size {
        let _ = child;
        parent_size
    }

    fn preferred_content_size_did_change(&self, _child: &Screen) {}

    fn presentation_transition_will_begin(&self, _coordinator: Option<&dyn TransitionCoordinator>) {}

    fn presentation_transition_did_end(&self, _completed: bool) {}

    fn dismissal_transition_will_begin(&self, _coordinator: Option<&dyn TransitionCoordinator>) {}

    fn dismissal_transition_did_end(&self, _completed: bool) {}

    fn container_view_will_layout_subviews(&self) {}
}

/// Animates one direction of a transition.
pub trait AnimatedTransitioning {
    fn transition_duration(&self, ctx: Option<&dyn TransitionContext>) -> Duration;

    fn animate_transition(&self, ctx: Rc<dyn TransitionContext>);
}

/// Vends the objects that implement a custom transition.
pub trait TransitioningDelegate {
    fn presentation_controller(
        &self,
        presented: &Screen,
        presenting: &Screen,
    ) -> Option<Rc<dyn PresentationController>>;

    fn animation_controller_for_presented(
        &self,
        presented: &Screen,
        presenting: &Screen,
    ) -> Option<Rc<dyn AnimatedTransitioning>>;

    fn animation_controller_for_dismissed(
        &self,
        dismissed: &Screen,
    ) -> Option<Rc<dyn AnimatedTransitioning>>;
}
