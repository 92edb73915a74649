#![forbid(unsafe_code)]

//! Transition controller for the overlay.
//!
//! One object plays all three roles the host asks a transitioning delegate
//! for: it vends itself as presentation controller and as animation
//! controller for both directions.
//!
//! # State machine
//!
//! ```text
//!        will_begin            animate_transition       did_end(true)
//! Idle ─────────────▶ PresentingBegin ─────▶ PresentingAnimating ─────▶ Presented
//!  ▲                                                 │ did_end(false)      │
//!  └─────────────────────────────────────────────────┘                     │
//!  ▲                                                                       │ will_begin
//!  │ did_end(true)                                                         ▼
//!  └──────────── DismissingAnimating ◀──────────────────────────── DismissingBegin
//!                        │ did_end(false)
//!                        └──────────────▶ Presented
//! ```
//!
//! A session (backdrop and shadow wrapper) exists from presentation
//! will-begin until teardown. Teardown happens when a dismissal completes
//! or a presentation is cancelled.
//!
//! # Invariants
//!
//! 1. At most one backdrop exists per controller.
//! 2. Styles are resolved once per direction, at transition begin, and stay
//!    fixed until that direction ends.
//! 3. No `RefCell` borrow is held while calling out to callbacks, the host,
//!    or the animator.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use alertkit_core::{Rect, Size, View, WeakView};
use alertkit_runtime::{
    AnimatedTransitioning, AnimationRequest, ModalPresentationStyle, PresentationController,
    PresentationHost, Screen, TransitionContext, TransitionCoordinator, TransitionDirection,
    TransitionKey, TransitioningDelegate, Track, WeakScreen,
};

use super::backdrop::Backdrop;
use super::config::{DismissalStyle, OverlayConfig, PresentationStyle};
use super::frames::{self, TransitionPlan};
use super::shadow::ShadowWrapper;

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    PresentingBegin,
    PresentingAnimating,
    Presented,
    DismissingBegin,
    DismissingAnimating,
}

/// Chrome created for one presentation.
struct TransitionSession {
    backdrop: Backdrop,
    wrapper: ShadowWrapper,
    presentation_style: Cell<PresentationStyle>,
    dismissal_style: Cell<DismissalStyle>,
}

type TapCallback = Rc<dyn Fn()>;
type WillBeginCallback = Rc<dyn Fn(TransitionDirection)>;

/// Presentation controller and animator for one overlay.
pub struct TransitionController {
    this: Weak<TransitionController>,
    presented: WeakScreen,
    presenting: WeakScreen,
    host: Option<Weak<dyn PresentationHost>>,
    config: RefCell<OverlayConfig>,
    phase: Cell<TransitionPhase>,
    resolved: Cell<Option<TransitionDirection>>,
    container: RefCell<Option<WeakView>>,
    session: RefCell<Option<TransitionSession>>,
    on_backdrop_tap: RefCell<Option<TapCallback>>,
    on_will_begin: RefCell<Option<WillBeginCallback>>,
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("phase", &self.phase.get())
            .field("has_session", &self.session.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl TransitionController {
    /// Controller for presenting `presented` over `presenting`.
    ///
    /// Marks `presented` for custom presentation. `host` is used to dismiss
    /// on backdrop taps; without it taps only notify.
    pub fn new(
        presented: &Screen,
        presenting: &Screen,
        host: Option<Weak<dyn PresentationHost>>,
    ) -> Rc<Self> {
        presented.set_modal_presentation_style(ModalPresentationStyle::Custom);
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            presented: presented.downgrade(),
            presenting: presenting.downgrade(),
            host,
            config: RefCell::new(OverlayConfig::default()),
            phase: Cell::new(TransitionPhase::Idle),
            resolved: Cell::new(None),
            container: RefCell::new(None),
            session: RefCell::new(None),
            on_backdrop_tap: RefCell::new(None),
            on_will_begin: RefCell::new(None),
        })
    }

    #[inline]
    pub fn phase(&self) -> TransitionPhase {
        self.phase.get()
    }

    /// Settings the next transition step will use.
    pub fn config(&self) -> OverlayConfig {
        self.config.borrow().clone()
    }

    /// Replace the settings. Takes effect for everything not yet resolved;
    /// cosmetic fields restyle a live session immediately.
    pub fn apply_config(&self, config: &OverlayConfig) {
        let previous = self.config.replace(config.clone());
        if previous == *config {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(phase = ?self.phase.get(), "overlay config applied");
        self.restyle_session(&previous, config);
    }

    pub fn set_on_backdrop_tap(&self, callback: Option<Rc<dyn Fn()>>) {
        *self.on_backdrop_tap.borrow_mut() = callback;
    }

    /// Called at the start of each direction, before styles are resolved.
    pub fn set_on_will_begin(&self, callback: Option<Rc<dyn Fn(TransitionDirection)>>) {
        *self.on_will_begin.borrow_mut() = callback;
    }

    pub fn container_view(&self) -> Option<View> {
        self.container.borrow().as_ref().and_then(WeakView::upgrade)
    }

    pub fn backdrop_view(&self) -> Option<View> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.backdrop.view().clone())
    }

    pub fn shadow_wrapper_view(&self) -> Option<View> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.wrapper.view().clone())
    }

    /// Entrance style in effect: the resolved one while a presentation is
    /// running, otherwise the configured one.
    pub fn presentation_style(&self) -> PresentationStyle {
        let resolved = self.resolved_session_style(TransitionDirection::Presenting, |s| {
            s.presentation_style.get()
        });
        resolved.unwrap_or_else(|| self.config.borrow().presentation_style)
    }

    /// Exit style in effect.
    pub fn dismissal_style(&self) -> DismissalStyle {
        let resolved = self.resolved_session_style(TransitionDirection::Dismissing, |s| {
            s.dismissal_style.get()
        });
        resolved.unwrap_or_else(|| self.config.borrow().dismissal_style)
    }

    fn resolved_session_style<T>(
        &self,
        direction: TransitionDirection,
        read: impl FnOnce(&TransitionSession) -> T,
    ) -> Option<T> {
        if self.resolved.get() != Some(direction) {
            return None;
        }
        self.session.borrow().as_ref().map(read)
    }

    /// Deliver a backdrop tap.
    ///
    /// Ignored unless taps dismiss. Otherwise notifies the tap callback, then
    /// asks the host to dismiss. Returns whether the tap was handled.
    pub fn handle_backdrop_tap(&self) -> bool {
        let dismisses = self.config.borrow().dimming_dismisses_on_tap;
        if !dismisses {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(phase = ?self.phase.get(), "backdrop tapped");
        let callback = self.on_backdrop_tap.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
        let host = self.host.as_ref().and_then(Weak::upgrade);
        if let (Some(host), Some(presenting)) = (host, self.presenting.upgrade()) {
            host.dismiss(&presenting, true, None);
        }
        true
    }

    fn set_phase(&self, phase: TransitionPhase) {
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?self.phase.get(), to = ?phase, "overlay transition phase");
        self.phase.set(phase);
    }

    fn direction_of(&self, ctx: &dyn TransitionContext) -> TransitionDirection {
        let presented = self.presented.upgrade();
        let is_presenting = match (ctx.screen(TransitionKey::To), presented) {
            (Some(to), Some(presented)) => to.ptr_eq(&presented),
            _ => false,
        };
        if is_presenting {
            TransitionDirection::Presenting
        } else {
            TransitionDirection::Dismissing
        }
    }

    /// Fire the will-begin callback, then freeze the style for `direction`.
    fn resolve_direction(&self, direction: TransitionDirection) {
        let callback = self.on_will_begin.borrow().clone();
        if let Some(callback) = callback {
            callback(direction);
        }
        let (presentation, dismissal) = {
            let config = self.config.borrow();
            (config.presentation_style, config.dismissal_style)
        };
        if let Some(session) = self.session.borrow().as_ref() {
            match direction {
                TransitionDirection::Presenting => session.presentation_style.set(presentation),
                TransitionDirection::Dismissing => session.dismissal_style.set(dismissal),
            }
        }
        self.resolved.set(Some(direction));
    }

    fn ensure_resolved(&self, direction: TransitionDirection) {
        if self.resolved.get() != Some(direction) {
            self.resolve_direction(direction);
        }
    }

    fn is_animated_direction(&self, direction: TransitionDirection) -> bool {
        match direction {
            TransitionDirection::Presenting => self.presentation_style().is_animated(),
            TransitionDirection::Dismissing => self.dismissal_style().is_animated(),
        }
    }

    fn plan_for(&self, direction: TransitionDirection, ctx: &dyn TransitionContext) -> TransitionPlan {
        match direction {
            TransitionDirection::Presenting => {
                let final_frame = ctx
                    .screen(TransitionKey::To)
                    .map(|to| ctx.final_frame(&to))
                    .unwrap_or(Rect::ZERO);
                frames::presentation_plan(
                    self.presentation_style(),
                    ctx.container_view().bounds(),
                    final_frame,
                )
            }
            TransitionDirection::Dismissing => {
                let current = ctx
                    .view(TransitionKey::From)
                    .map(|v| v.frame())
                    .unwrap_or(Rect::ZERO);
                frames::dismissal_plan(self.dismissal_style(), current)
            }
        }
    }

    fn start_session(&self, coordinator: Option<&dyn TransitionCoordinator>) {
        let Some(presented) = self.presented.upgrade() else {
            return;
        };
        let config = self.config();
        let wrapper = ShadowWrapper::new(
            self.frame_of_presented_view_in_container_view(),
            config.resolved_shadow(),
        );
        wrapper.wrap(&presented.view(), config.corner_radius, config.clips_content);

        let this = self.this.clone();
        let backdrop = Backdrop::new(
            config.dimming_color,
            Rc::new(move || {
                if let Some(controller) = this.upgrade() {
                    controller.handle_backdrop_tap();
                }
            }),
        );
        if let Some(container) = self.container_view() {
            backdrop.install(&container);
        }

        let previous = self.session.replace(Some(TransitionSession {
            backdrop: backdrop.clone(),
            wrapper,
            presentation_style: Cell::new(config.presentation_style),
            dismissal_style: Cell::new(config.dismissal_style),
        }));
        if let Some(previous) = previous {
            previous.backdrop.remove();
            previous.wrapper.discard();
        }
        self.resolved.set(None);
        self.set_phase(TransitionPhase::PresentingBegin);
        self.resolve_direction(TransitionDirection::Presenting);

        let dimming_alpha = self.config.borrow().resolved_dimming_alpha();
        backdrop.fade_to(dimming_alpha, coordinator);
    }

    /// Snap the session to its resting state using the latest settings.
    fn settle_presented(&self) {
        let frame = self.frame_of_presented_view_in_container_view();
        let dimming_alpha = self.config.borrow().resolved_dimming_alpha();
        let session = self.session.borrow();
        if let Some(session) = session.as_ref() {
            session.wrapper.set_frame(frame);
            session.wrapper.view().set_alpha(1.0);
            session.backdrop.view().set_alpha(dimming_alpha);
        }
    }

    fn teardown(&self) {
        let session = self.session.take();
        if let Some(session) = session {
            session.backdrop.remove();
            session.wrapper.discard();
        }
        self.resolved.set(None);
        self.set_phase(TransitionPhase::Idle);
    }

    fn restyle_session(&self, previous: &OverlayConfig, config: &OverlayConfig) {
        let session = self.session.borrow();
        let Some(session) = session.as_ref() else {
            return;
        };
        session.backdrop.set_color(config.dimming_color);
        session.wrapper.set_shadow(config.resolved_shadow());
        if let Some(content) = session.wrapper.content() {
            ShadowWrapper::style_content(&content, config.corner_radius, config.clips_content);
        }
        if self.phase.get() == TransitionPhase::Presented
            && previous.dimming_alpha != config.dimming_alpha
        {
            session.backdrop.view().set_alpha(config.resolved_dimming_alpha());
        }
    }
}

impl PresentationController for TransitionController {
    fn attach_container_view(&self, container: View) {
        *self.container.borrow_mut() = Some(container.downgrade());
    }

    fn presented_view(&self) -> Option<View> {
        self.shadow_wrapper_view()
            .or_else(|| self.presented.upgrade().map(|s| s.view()))
    }

    fn frame_of_presented_view_in_container_view(&self) -> Rect {
        let bounds = self.container_view().map(|c| c.bounds()).unwrap_or(Rect::ZERO);
        let content = match self.presented.upgrade() {
            Some(presented) => self.size_for_child(&presented, bounds.size),
            None => Size::ZERO,
        };
        frames::final_frame(bounds, content)
    }

    fn size_for_child(&self, child: &Screen, parent_size: Size) -> Size {
        match self.presented.upgrade() {
            Some(presented) if presented.ptr_eq(child) => presented.preferred_content_size(),
            _ => parent_size,
        }
    }

    fn preferred_content_size_did_change(&self, child: &Screen) {
        let is_presented = self.presented.upgrade().is_some_and(|p| p.ptr_eq(child));
        if let (true, Some(container)) = (is_presented, self.container_view()) {
            container.set_needs_layout();
        }
    }

    fn presentation_transition_will_begin(&self, coordinator: Option<&dyn TransitionCoordinator>) {
        self.start_session(coordinator);
    }

    fn presentation_transition_did_end(&self, completed: bool) {
        if completed {
            self.resolved.set(None);
            self.set_phase(TransitionPhase::Presented);
            self.settle_presented();
        } else {
            self.teardown();
        }
    }

    fn dismissal_transition_will_begin(&self, coordinator: Option<&dyn TransitionCoordinator>) {
        self.set_phase(TransitionPhase::DismissingBegin);
        self.resolve_direction(TransitionDirection::Dismissing);
        let backdrop = self.session.borrow().as_ref().map(|s| s.backdrop.clone());
        if let Some(backdrop) = backdrop {
            backdrop.fade_to(0.0, coordinator);
        }
    }

    fn dismissal_transition_did_end(&self, completed: bool) {
        if completed {
            self.teardown();
        } else {
            self.resolved.set(None);
            self.set_phase(TransitionPhase::Presented);
            self.settle_presented();
        }
    }

    fn container_view_will_layout_subviews(&self) {
        let Some(container) = self.container_view() else {
            return;
        };
        let frame = self.frame_of_presented_view_in_container_view();
        let session = self.session.borrow();
        if let Some(session) = session.as_ref() {
            session.backdrop.layout(container.bounds());
            session.wrapper.set_frame(frame);
        }
    }
}

impl AnimatedTransitioning for TransitionController {
    fn transition_duration(&self, ctx: Option<&dyn TransitionContext>) -> Duration {
        let Some(ctx) = ctx else {
            return Duration::ZERO;
        };
        if !ctx.is_animated() || !self.is_animated_direction(self.direction_of(ctx)) {
            return Duration::ZERO;
        }
        self.config.borrow().transition_duration()
    }

    fn animate_transition(&self, ctx: Rc<dyn TransitionContext>) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("overlay_animate_transition").entered();

        let (Some(_), Some(_)) = (ctx.screen(TransitionKey::From), ctx.screen(TransitionKey::To))
        else {
            #[cfg(feature = "tracing")]
            tracing::debug!("transition without both screens; completing");
            ctx.complete_transition(!ctx.transition_was_cancelled());
            return;
        };

        let direction = self.direction_of(&*ctx);
        self.ensure_resolved(direction);

        let container = ctx.container_view();
        let moving = match direction {
            TransitionDirection::Presenting => {
                let to_view = ctx.view(TransitionKey::To);
                if let Some(view) = &to_view {
                    container.add_subview(view);
                }
                to_view
            }
            TransitionDirection::Dismissing => ctx.view(TransitionKey::From),
        };

        let plan = self.plan_for(direction, &*ctx);
        self.set_phase(match direction {
            TransitionDirection::Presenting => TransitionPhase::PresentingAnimating,
            TransitionDirection::Dismissing => TransitionPhase::DismissingAnimating,
        });

        if !plan.animated || !ctx.is_animated() {
            if let Some(view) = &moving {
                view.set_frame(plan.to.frame);
                view.set_alpha(plan.to.alpha);
            }
            ctx.complete_transition(!ctx.transition_was_cancelled());
            return;
        }

        if let Some(view) = &moving {
            view.set_frame(plan.from.frame);
            view.set_alpha(plan.from.alpha);
        }
        let request = AnimationRequest::new(self.transition_duration(Some(&*ctx))).tracks(
            moving.map(|view| Track::new(&view).frame(plan.to.frame).alpha(plan.to.alpha)),
        );
        let animator = ctx.animator();
        let done = Rc::clone(&ctx);
        animator.animate(
            request,
            Some(Box::new(move |_finished| {
                done.complete_transition(!done.transition_was_cancelled());
            })),
        );
    }
}

impl TransitioningDelegate for TransitionController {
    fn presentation_controller(
        &self,
        _presented: &Screen,
        _presenting: &Screen,
    ) -> Option<Rc<dyn PresentationController>> {
        self.this
            .upgrade()
            .map(|c| c as Rc<dyn PresentationController>)
    }

    fn animation_controller_for_presented(
        &self,
        _presented: &Screen,
        _presenting: &Screen,
    ) -> Option<Rc<dyn AnimatedTransitioning>> {
        self.this.upgrade().map(|c| c as Rc<dyn AnimatedTransitioning>)
    }

    fn animation_controller_for_dismissed(
        &self,
        _dismissed: &Screen,
    ) -> Option<Rc<dyn AnimatedTransitioning>> {
        self.this.upgrade().map(|c| c as Rc<dyn AnimatedTransitioning>)
    }
}
