#![forbid(unsafe_code)]

//! Transition context and coordinator handed to custom transitions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use alertkit_core::{Rect, View};
use alertkit_runtime::{
    AnimatedTransitioning, AnimationCompletion, AnimationRequest, Animator, Completion,
    PresentationController, Screen, Timeline, Track, TransitionContext, TransitionCoordinator,
    TransitionDirection, TransitionKey,
};

use crate::host::SimulatedHost;

/// One running transition inside a [`SimulatedHost`].
pub struct SimContext {
    pub(crate) host: Weak<SimulatedHost>,
    pub(crate) direction: TransitionDirection,
    pub(crate) presenting: Screen,
    pub(crate) presented: Screen,
    pub(crate) container: View,
    pub(crate) controller: Option<Rc<dyn PresentationController>>,
    pub(crate) animator: RefCell<Option<Rc<dyn AnimatedTransitioning>>>,
    pub(crate) timeline: Rc<Timeline>,
    pub(crate) animated: bool,
    pub(crate) cancelled: Cell<bool>,
    pub(crate) finished: Cell<bool>,
    pub(crate) completion: RefCell<Option<Completion>>,
}

impl fmt::Debug for SimContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimContext")
            .field("direction", &self.direction)
            .field("presented", &self.presented)
            .field("animated", &self.animated)
            .field("cancelled", &self.cancelled.get())
            .field("finished", &self.finished.get())
            .finish_non_exhaustive()
    }
}

impl SimContext {
    #[inline]
    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    #[inline]
    pub fn presented(&self) -> &Screen {
        &self.presented
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    /// Mark the transition cancelled. Takes effect when the transition next
    /// reports completion.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// The view the host moves for the presented screen.
    fn presented_view(&self) -> View {
        self.controller
            .as_ref()
            .and_then(|c| c.presented_view())
            .unwrap_or_else(|| self.presented.view())
    }

    /// Duration of the running transition as reported by its animator.
    pub fn duration(&self) -> Duration {
        let animator = self.animator.borrow().clone();
        match animator {
            Some(animator) => animator.transition_duration(Some(self)),
            None => Duration::ZERO,
        }
    }
}

impl TransitionContext for SimContext {
    fn container_view(&self) -> View {
        self.container.clone()
    }

    fn screen(&self, key: TransitionKey) -> Option<Screen> {
        let screen = match (self.direction, key) {
            (TransitionDirection::Presenting, TransitionKey::From) => &self.presenting,
            (TransitionDirection::Presenting, TransitionKey::To) => &self.presented,
            (TransitionDirection::Dismissing, TransitionKey::From) => &self.presented,
            (TransitionDirection::Dismissing, TransitionKey::To) => &self.presenting,
        };
        Some(screen.clone())
    }

    fn view(&self, key: TransitionKey) -> Option<View> {
        // The presenting screen's view stays where it is for custom
        // presentations, so only the presented side is handed out.
        match (self.direction, key) {
            (TransitionDirection::Presenting, TransitionKey::To)
            | (TransitionDirection::Dismissing, TransitionKey::From) => Some(self.presented_view()),
            _ => None,
        }
    }

    fn initial_frame(&self, screen: &Screen) -> Rect {
        if self.direction == TransitionDirection::Dismissing && screen.ptr_eq(&self.presented) {
            self.presented_view().frame()
        } else {
            Rect::ZERO
        }
    }

    fn final_frame(&self, screen: &Screen) -> Rect {
        if self.direction != TransitionDirection::Presenting || !screen.ptr_eq(&self.presented) {
            return Rect::ZERO;
        }
        match &self.controller {
            Some(controller) => controller.frame_of_presented_view_in_container_view(),
            None => self.container.bounds(),
        }
    }

    fn is_animated(&self) -> bool {
        self.animated
    }

    fn transition_was_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn complete_transition(&self, did_complete: bool) {
        if self.finished.replace(true) {
            tracing::warn!(direction = ?self.direction, "transition completed twice; ignoring");
            return;
        }
        if let Some(host) = self.host.upgrade() {
            host.finish_transition(self, did_complete);
        }
    }

    fn animator(&self) -> Rc<dyn Animator> {
        self.timeline.clone()
    }
}

/// Schedules alongside animations on the host timeline with the running
/// transition's duration.
pub(crate) struct SimCoordinator {
    pub(crate) context: Rc<SimContext>,
}

impl TransitionCoordinator for SimCoordinator {
    fn animate_alongside(
        &self,
        tracks: Vec<Track>,
        completion: Option<AnimationCompletion>,
    ) -> bool {
        if !self.context.animated {
            return false;
        }
        let request = AnimationRequest::new(self.context.duration()).tracks(tracks);
        self.context.timeline.animate(request, completion);
        true
    }
}
