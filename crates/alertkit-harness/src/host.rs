#![forbid(unsafe_code)]

//! Deterministic presentation host.
//!
//! [`SimulatedHost`] plays the host toolkit's part in modal presentation:
//! it links screens, builds a container view per presentation, runs custom
//! transitions through the presented screen's transitioning delegate, and
//! drives every animation on a [`Timeline`] that tests advance by hand.
//!
//! Hook order matches what transitions expect from a real host:
//!
//! ```text
//! present   attach_container_view → presentation_transition_will_begin
//!           → animate_transition → (complete) → presentation_transition_did_end
//! dismiss   dismissal_transition_will_begin → animate_transition
//!           → (complete) → dismissal_transition_did_end
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use alertkit_core::{AutoresizingMask, Rect, Size, View};
use alertkit_runtime::{
    ActivationState, AnimatedTransitioning, Application, Completion, DisplayMetrics,
    ModalPresentationStyle, PresentationController, PresentationHost, Screen, Timeline,
    TransitionContext, TransitionDirection, TransitioningDelegate, Window, WindowScene,
};
use tracing::{debug, info, warn};

use crate::context::{SimContext, SimCoordinator};

/// A live presentation: one presented screen over its presenter.
struct Presentation {
    presenting: Screen,
    presented: Screen,
    container: View,
    controller: Option<Rc<dyn PresentationController>>,
}

/// In-memory host with a single key window.
pub struct SimulatedHost {
    this: Weak<SimulatedHost>,
    timeline: Rc<Timeline>,
    display: DisplayMetrics,
    root: Screen,
    window_view: View,
    application: RefCell<Application>,
    presentations: RefCell<Vec<Presentation>>,
    transitions: RefCell<Vec<Rc<SimContext>>>,
}

impl fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedHost")
            .field("display", &self.display.size())
            .field("presentations", &self.presentations.borrow().len())
            .field("transitions", &self.transitions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl SimulatedHost {
    /// Host whose key window shows `root` on a display of `size`.
    ///
    /// Resets the thread's global display to `size`.
    pub fn new(root: Screen, size: Size) -> Rc<Self> {
        let display = DisplayMetrics::global();
        display.set_size(size);
        let window_view = View::new(Rect::from_size(display.size()));
        let root_view = root.view();
        root_view.set_frame(window_view.bounds());
        root_view.set_autoresizing_mask(AutoresizingMask::FLEXIBLE_SIZE);
        window_view.add_subview(&root_view);

        let application = Application {
            scenes: vec![WindowScene {
                activation: ActivationState::ForegroundActive,
                windows: vec![Window::new(root.clone()).key()],
            }],
            ..Application::default()
        };
        info!(width = size.width, height = size.height, "simulated host started");
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            timeline: Rc::new(Timeline::new()),
            display,
            root,
            window_view,
            application: RefCell::new(application),
            presentations: RefCell::new(Vec::new()),
            transitions: RefCell::new(Vec::new()),
        })
    }

    #[inline]
    pub fn root(&self) -> &Screen {
        &self.root
    }

    #[inline]
    pub fn timeline(&self) -> &Rc<Timeline> {
        &self.timeline
    }

    #[inline]
    pub fn display(&self) -> &DisplayMetrics {
        &self.display
    }

    /// Top-level view every presentation container is added to.
    #[inline]
    pub fn window_view(&self) -> &View {
        &self.window_view
    }

    /// Edit the window arrangement used for key-window resolution.
    pub fn with_application<R>(&self, f: impl FnOnce(&mut Application) -> R) -> R {
        f(&mut self.application.borrow_mut())
    }

    // --- Time ---

    /// Advance animations by `dt`.
    pub fn advance(&self, dt: Duration) -> usize {
        self.timeline.advance(dt)
    }

    /// Run every pending animation to its end.
    pub fn settle(&self) -> usize {
        self.timeline.finish_all()
    }

    // --- Inspection ---

    pub fn presentation_count(&self) -> usize {
        self.presentations.borrow().len()
    }

    pub fn active_transition_count(&self) -> usize {
        self.transitions.borrow().len()
    }

    /// Whether `screen` is currently presented by this host.
    pub fn is_presented(&self, screen: &Screen) -> bool {
        self.presentations
            .borrow()
            .iter()
            .any(|p| p.presented.ptr_eq(screen))
    }

    /// Container view the presentation of `screen` happens in.
    pub fn container_view(&self, screen: &Screen) -> Option<View> {
        self.presentations
            .borrow()
            .iter()
            .find(|p| p.presented.ptr_eq(screen))
            .map(|p| p.container.clone())
    }

    /// Most recently started transition that has not finished.
    pub fn active_transition(&self) -> Option<Rc<SimContext>> {
        self.transitions.borrow().last().cloned()
    }

    /// Cancel every running transition. Returns how many were marked.
    pub fn cancel_active_transitions(&self) -> usize {
        let transitions = self.transitions.borrow().clone();
        for ctx in &transitions {
            ctx.cancel();
        }
        transitions.len()
    }

    // --- Layout ---

    /// Run a layout pass over every presentation container.
    pub fn layout(&self) {
        let controllers: Vec<(View, Option<Rc<dyn PresentationController>>)> = self
            .presentations
            .borrow()
            .iter()
            .map(|p| (p.container.clone(), p.controller.clone()))
            .collect();
        for (container, controller) in controllers {
            container.take_needs_layout();
            if let Some(controller) = controller {
                controller.container_view_will_layout_subviews();
            }
        }
    }

    /// Simulate rotation or a window resize, followed by a layout pass.
    pub fn resize(&self, size: Size) {
        debug!(width = size.width, height = size.height, "display resize");
        let mut screens = vec![self.root.clone()];
        screens.extend(self.presentations.borrow().iter().map(|p| p.presented.clone()));
        for screen in &screens {
            screen.will_transition_to_size(size);
        }
        self.display.set_size(size);
        self.window_view.set_frame(Rect::from_size(self.display.size()));
        self.layout();
    }

    // --- Transitions ---

    fn delegate_for(presented: &Screen) -> Option<Rc<dyn TransitioningDelegate>> {
        match presented.modal_presentation_style() {
            ModalPresentationStyle::Custom => presented.transitioning_delegate(),
            ModalPresentationStyle::FullScreen => None,
        }
    }

    fn run(&self, ctx: Rc<SimContext>) {
        self.transitions.borrow_mut().push(Rc::clone(&ctx));
        let coordinator = SimCoordinator {
            context: Rc::clone(&ctx),
        };
        if let Some(controller) = &ctx.controller {
            match ctx.direction {
                TransitionDirection::Presenting => {
                    controller.presentation_transition_will_begin(Some(&coordinator));
                }
                TransitionDirection::Dismissing => {
                    controller.dismissal_transition_will_begin(Some(&coordinator));
                }
            }
        }

        let animator = ctx.animator.borrow().clone();
        match animator {
            Some(animator) => animator.animate_transition(ctx),
            None => {
                let view = ctx.presented.view();
                match ctx.direction {
                    TransitionDirection::Presenting => {
                        view.set_frame(ctx.container.bounds());
                        ctx.container.add_subview(&view);
                    }
                    TransitionDirection::Dismissing => view.remove_from_superview(),
                }
                ctx.complete_transition(true);
            }
        }
    }

    /// Called by [`SimContext`] once a transition reports completion.
    pub(crate) fn finish_transition(&self, ctx: &SimContext, did_complete: bool) {
        self.transitions
            .borrow_mut()
            .retain(|t| !std::ptr::eq(Rc::as_ptr(t), ctx));
        let completion = ctx.completion.borrow_mut().take();
        debug!(
            direction = ?ctx.direction,
            presented = %ctx.presented.name(),
            did_complete,
            "transition finished"
        );

        match ctx.direction {
            TransitionDirection::Presenting => {
                if let Some(controller) = &ctx.controller {
                    controller.presentation_transition_did_end(did_complete);
                }
                if did_complete {
                    if let Some(completion) = completion {
                        completion();
                    }
                } else {
                    self.remove_presentation(&ctx.presented);
                }
            }
            TransitionDirection::Dismissing => {
                if let Some(controller) = &ctx.controller {
                    controller.dismissal_transition_did_end(did_complete);
                }
                if did_complete {
                    self.remove_presentation(&ctx.presented);
                    if let Some(completion) = completion {
                        completion();
                    }
                }
            }
        }
    }

    fn remove_presentation(&self, presented: &Screen) {
        let removed = {
            let mut presentations = self.presentations.borrow_mut();
            let index = presentations
                .iter()
                .position(|p| p.presented.ptr_eq(presented));
            index.map(|i| presentations.remove(i))
        };
        let Some(removed) = removed else {
            return;
        };
        if removed
            .presenting
            .presented()
            .is_some_and(|p| p.ptr_eq(&removed.presented))
        {
            removed.presenting.unlink_presented();
        }
        removed.presented.view().remove_from_superview();
        removed.container.remove_from_superview();
    }

    fn has_running_transition(&self, presented: &Screen) -> bool {
        self.transitions
            .borrow()
            .iter()
            .any(|t| t.presented.ptr_eq(presented))
    }
}

impl PresentationHost for SimulatedHost {
    fn present(
        &self,
        presenting: &Screen,
        presented: Screen,
        animated: bool,
        completion: Option<Completion>,
    ) {
        if presenting.presented().is_some() {
            warn!(
                presenting = %presenting.name(),
                "already presenting a screen; ignoring present"
            );
            return;
        }
        presenting.link_presented(&presented);

        let delegate = Self::delegate_for(&presented);
        let controller = delegate
            .as_ref()
            .and_then(|d| d.presentation_controller(&presented, presenting));
        let animator: Option<Rc<dyn AnimatedTransitioning>> = delegate
            .as_ref()
            .and_then(|d| d.animation_controller_for_presented(&presented, presenting));

        let container = View::new(self.window_view.bounds());
        container.set_autoresizing_mask(AutoresizingMask::FLEXIBLE_SIZE);
        self.window_view.add_subview(&container);
        if let Some(controller) = &controller {
            controller.attach_container_view(container.clone());
        }
        self.presentations.borrow_mut().push(Presentation {
            presenting: presenting.clone(),
            presented: presented.clone(),
            container: container.clone(),
            controller: controller.clone(),
        });

        debug!(
            presenting = %presenting.name(),
            presented = %presented.name(),
            animated,
            custom = controller.is_some(),
            "present"
        );
        self.run(Rc::new(SimContext {
            host: self.this.clone(),
            direction: TransitionDirection::Presenting,
            presenting: presenting.clone(),
            presented,
            container,
            controller,
            animator: RefCell::new(animator),
            timeline: Rc::clone(&self.timeline),
            animated,
            cancelled: Default::default(),
            finished: Default::default(),
            completion: RefCell::new(completion),
        }));
    }

    fn dismiss(&self, screen: &Screen, animated: bool, completion: Option<Completion>) {
        let (presenting, presented) = match (screen.presented(), screen.presenting()) {
            (Some(presented), _) => (screen.clone(), presented),
            (None, Some(presenting)) => (presenting, screen.clone()),
            (None, None) => {
                debug!(screen = %screen.name(), "nothing to dismiss");
                return;
            }
        };
        if self.has_running_transition(&presented) {
            debug!(presented = %presented.name(), "transition in flight; ignoring dismiss");
            return;
        }
        let record = self
            .presentations
            .borrow()
            .iter()
            .find(|p| p.presented.ptr_eq(&presented))
            .map(|p| (p.container.clone(), p.controller.clone()));
        let Some((container, controller)) = record else {
            warn!(presented = %presented.name(), "dismissing a screen this host never presented");
            return;
        };

        let animator = Self::delegate_for(&presented)
            .and_then(|d| d.animation_controller_for_dismissed(&presented));
        debug!(presented = %presented.name(), animated, "dismiss");
        self.run(Rc::new(SimContext {
            host: self.this.clone(),
            direction: TransitionDirection::Dismissing,
            presenting,
            presented,
            container,
            controller,
            animator: RefCell::new(animator),
            timeline: Rc::clone(&self.timeline),
            animated,
            cancelled: Default::default(),
            finished: Default::default(),
            completion: RefCell::new(completion),
        }));
    }

    fn key_window(&self) -> Option<Window> {
        self.application.borrow().key_window().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn host() -> Rc<SimulatedHost> {
        SimulatedHost::new(Screen::new("root"), Size::new(400.0, 800.0))
    }

    #[test]
    fn full_screen_presentation_fills_container() {
        let host = host();
        let child = Screen::new("child");
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        host.present(host.root(), child.clone(), true, Some(Box::new(move || d.set(true))));

        assert!(done.get());
        assert_eq!(child.view().frame(), Rect::new(0.0, 0.0, 400.0, 800.0));
        assert!(host.is_presented(&child));
        assert!(child.presenting().is_some_and(|p| p.ptr_eq(host.root())));

        host.dismiss(&child, true, None);
        assert!(!host.is_presented(&child));
        assert!(child.view().superview().is_none());
        assert!(host.root().presented().is_none());
    }

    #[test]
    fn dismissing_nested_presentation_unlinks_only_its_presenter() {
        let host = host();
        let child = Screen::new("child");
        let grandchild = Screen::new("grandchild");
        host.present(host.root(), child.clone(), false, None);
        host.present(&child, grandchild.clone(), false, None);
        assert_eq!(host.presentation_count(), 2);

        host.dismiss(&grandchild, false, None);
        assert!(child.presented().is_none());
        assert!(grandchild.presenting().is_none());
        assert!(host.root().presented().is_some_and(|p| p.ptr_eq(&child)));
        assert!(host.is_presented(&child));
        assert_eq!(host.presentation_count(), 1);
    }

    #[test]
    fn dismissing_unpresented_screen_is_ignored() {
        let host = host();
        host.dismiss(&Screen::new("stray"), true, None);
        assert_eq!(host.presentation_count(), 0);
    }

    #[test]
    fn key_window_shows_root() {
        let host = host();
        let window = host.key_window().unwrap();
        assert!(window.root.is_some_and(|r| r.ptr_eq(host.root())));
    }

    #[test]
    fn resize_updates_display_and_window() {
        let host = host();
        host.resize(Size::new(800.0, 400.0));
        assert_eq!(host.display().size(), Size::new(800.0, 400.0));
        assert_eq!(host.window_view().bounds(), Rect::new(0.0, 0.0, 800.0, 400.0));
        assert_eq!(host.root().view().frame(), Rect::new(0.0, 0.0, 800.0, 400.0));
    }

    #[test]
    #[tracing_test::traced_test]
    fn presentation_is_logged() {
        let host = host();
        host.present(host.root(), Screen::new("child"), false, None);
        assert!(logs_contain("simulated host started"));
        assert!(logs_contain("transition finished"));
    }
}
