#![forbid(unsafe_code)]

//! The overlay container screen and its public entry points.
//!
//! [`OverlayContainer`] is a screen whose root view hosts caller-supplied
//! content. It owns the overlay configuration as an [`Observable`] and keeps
//! a bound [`TransitionController`] in sync with it, so setters called after
//! a transition has started still reach the running transition.
//!
//! # Example
//!
//! ```ignore
//! let overlay = OverlayContainer::present(&host, &content, &root, |o| {
//!     o.set_presentation_style(PresentationStyle::ZoomFade);
//!     o.set_has_shadow(true);
//! }, None);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use alertkit_core::{Rgba, Size, View, non_negative};
use alertkit_runtime::reactive::bind_mapped2;
use alertkit_runtime::{
    Binding, BindingScope, Completion, DisplayMetrics, Observable, PresentationController,
    PresentationHost, Screen, ScreenContent, TransitionDirection, TransitioningDelegate, WeakScreen,
    visible_screen,
};

use super::config::{DismissalStyle, OverlayConfig, PresentationStyle};
use super::transition::TransitionController;

/// Receives overlay events and may override animation styles.
///
/// Style overrides are consulted once per direction when that transition
/// begins. A returned style is written back into the container's
/// configuration.
pub trait OverlayDelegate {
    /// The backdrop was tapped while taps dismiss the overlay.
    fn did_tap_backdrop(&self, _container: &OverlayContainer) {}

    fn presentation_style(&self, _container: &OverlayContainer) -> Option<PresentationStyle> {
        None
    }

    fn dismissal_style(&self, _container: &OverlayContainer) -> Option<DismissalStyle> {
        None
    }
}

struct ContainerInner {
    screen: WeakScreen,
    config: Observable<OverlayConfig>,
    preferred_size: Binding<Size>,
    delegate: RefCell<Option<Weak<dyn OverlayDelegate>>>,
    controller: RefCell<Option<Rc<TransitionController>>>,
    bindings: RefCell<BindingScope>,
}

impl ContainerInner {
    fn controller(&self) -> Option<Rc<TransitionController>> {
        self.controller.borrow().clone()
    }

    fn store_preferred_size(&self, size: Size) {
        let Some(screen) = self.screen.upgrade() else {
            return;
        };
        if screen.set_preferred_content_size(size)
            && let Some(controller) = self.controller()
        {
            controller.preferred_content_size_did_change(&screen);
        }
    }

    fn refresh_preferred_size(&self) {
        self.store_preferred_size(self.preferred_size.get());
    }
}

impl ScreenContent for ContainerInner {
    fn will_transition_to_size(&self, size: Size) {
        let preferred = self.config.with(|c| c.content_size(size.width));
        self.store_preferred_size(preferred);
    }
}

/// A screen that presents caller content as a centered overlay.
#[derive(Clone)]
pub struct OverlayContainer {
    screen: Screen,
    inner: Rc<ContainerInner>,
}

impl fmt::Debug for OverlayContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayContainer")
            .field("screen", &self.screen)
            .field("config", &self.inner.config.get())
            .field("bound", &self.inner.controller.borrow().is_some())
            .finish()
    }
}

impl Default for OverlayContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayContainer {
    /// Container sized against the thread's global display.
    pub fn new() -> Self {
        Self::with_display(&DisplayMetrics::global())
    }

    /// Container sized against `display`.
    pub fn with_display(display: &DisplayMetrics) -> Self {
        let screen = Screen::new("overlay-container");
        screen.view().set_background_color(Some(Rgba::WHITE));

        let config = Observable::new(OverlayConfig::default());
        let preferred_size = bind_mapped2(&config, display.observable(), |config, size| {
            config.content_size(size.width)
        });
        let inner = Rc::new(ContainerInner {
            screen: screen.downgrade(),
            config,
            preferred_size,
            delegate: RefCell::new(None),
            controller: RefCell::new(None),
            bindings: RefCell::new(BindingScope::new()),
        });

        {
            let mut bindings = inner.bindings.borrow_mut();
            let weak = Rc::downgrade(&inner);
            bindings.subscribe(&inner.config, move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh_preferred_size();
                }
            });
            let weak = Rc::downgrade(&inner);
            bindings.hold(display.subscribe(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh_preferred_size();
                }
            }));
        }
        screen.set_content(Some(inner.clone() as Rc<dyn ScreenContent>));
        inner.refresh_preferred_size();

        Self { screen, inner }
    }

    // --- Entry points ---

    /// Present `content` over `from` as an overlay.
    ///
    /// `configure` runs after the transition controller is bound and before
    /// the host starts presenting, so every setting it makes is already in
    /// effect for the entrance animation.
    pub fn present<H>(
        host: &Rc<H>,
        content: &View,
        from: &Screen,
        configure: impl FnOnce(&OverlayContainer),
        on_presented: Option<Completion>,
    ) -> OverlayContainer
    where
        H: PresentationHost + 'static,
    {
        let container = Self::new();
        container.view().add_subview(content);

        let host_dyn: Rc<dyn PresentationHost> = host.clone();
        let controller =
            TransitionController::new(&container.screen, from, Some(Rc::downgrade(&host_dyn)));
        container.bind_transition_controller(controller);
        configure(&container);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from = %from.name(),
            style = ?container.presentation_style(),
            "presenting overlay"
        );
        host.present(from, container.screen.clone(), true, on_presented);
        container
    }

    /// Present `content` over `from` with only the height customized.
    pub fn present_with_height<H>(
        host: &Rc<H>,
        content: &View,
        from: &Screen,
        height: f64,
    ) -> OverlayContainer
    where
        H: PresentationHost + 'static,
    {
        Self::present(host, content, from, |c| c.set_height(height), None)
    }

    /// Dismiss whatever is visible in the host's key window.
    ///
    /// Returns `false` without side effects when there is no key window or
    /// nothing visible in it.
    pub fn dismiss<H>(host: &H, animated: bool, on_dismissed: Option<Completion>) -> bool
    where
        H: PresentationHost + ?Sized,
    {
        let Some(window) = host.key_window() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("dismiss requested without a key window");
            return false;
        };
        let Some(screen) = visible_screen(window.root.as_ref()) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("dismiss requested with nothing visible");
            return false;
        };
        host.dismiss(&screen, animated, on_dismissed);
        true
    }

    // --- Accessors ---

    #[inline]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Root view hosting the caller's content.
    pub fn view(&self) -> View {
        self.screen.view()
    }

    pub fn preferred_content_size(&self) -> Size {
        self.screen.preferred_content_size()
    }

    pub fn transition_controller(&self) -> Option<Rc<TransitionController>> {
        self.inner.controller()
    }

    /// Attach `controller` as this screen's transitioning delegate and keep
    /// it in sync with every later configuration change.
    pub fn bind_transition_controller(&self, controller: Rc<TransitionController>) {
        self.screen
            .set_transitioning_delegate(Some(controller.clone() as Rc<dyn TransitioningDelegate>));
        *self.inner.controller.borrow_mut() = Some(Rc::clone(&controller));

        let weak = Rc::downgrade(&controller);
        self.inner
            .bindings
            .borrow_mut()
            .subscribe(&self.inner.config, move |config| {
                if let Some(controller) = weak.upgrade() {
                    controller.apply_config(config);
                }
            });

        let screen = self.screen.downgrade();
        let inner = Rc::downgrade(&self.inner);
        controller.set_on_backdrop_tap(Some(Rc::new(move || {
            if let Some(container) = Self::from_parts(&screen, &inner) {
                container.notify_backdrop_tap();
            }
        })));

        let screen = self.screen.downgrade();
        let inner = Rc::downgrade(&self.inner);
        controller.set_on_will_begin(Some(Rc::new(move |direction| {
            if let Some(container) = Self::from_parts(&screen, &inner) {
                container.apply_delegate_style(direction);
            }
        })));

        self.sync_to_controller();
    }

    /// Push the current configuration to the bound controller.
    pub fn sync_to_controller(&self) {
        if let Some(controller) = self.inner.controller() {
            controller.apply_config(&self.config());
        }
    }

    fn from_parts(screen: &WeakScreen, inner: &Weak<ContainerInner>) -> Option<Self> {
        Some(Self {
            screen: screen.upgrade()?,
            inner: inner.upgrade()?,
        })
    }

    // --- Delegate ---

    /// Observe events with `delegate`. Held weakly.
    pub fn set_delegate<D>(&self, delegate: &Rc<D>)
    where
        D: OverlayDelegate + 'static,
    {
        let delegate: Rc<dyn OverlayDelegate> = delegate.clone();
        *self.inner.delegate.borrow_mut() = Some(Rc::downgrade(&delegate));
    }

    pub fn clear_delegate(&self) {
        *self.inner.delegate.borrow_mut() = None;
    }

    fn delegate(&self) -> Option<Rc<dyn OverlayDelegate>> {
        self.inner.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn notify_backdrop_tap(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.did_tap_backdrop(self);
        }
    }

    fn apply_delegate_style(&self, direction: TransitionDirection) {
        let Some(delegate) = self.delegate() else {
            return;
        };
        match direction {
            TransitionDirection::Presenting => {
                if let Some(style) = delegate.presentation_style(self) {
                    self.set_presentation_style(style);
                }
            }
            TransitionDirection::Dismissing => {
                if let Some(style) = delegate.dismissal_style(self) {
                    self.set_dismissal_style(style);
                }
            }
        }
    }

    // --- Configuration ---

    pub fn config(&self) -> OverlayConfig {
        self.inner.config.get()
    }

    /// Replace the whole configuration.
    pub fn set_config(&self, config: OverlayConfig) {
        self.inner.config.set(config);
    }

    /// Edit the configuration in place. Returns whether anything changed.
    pub fn update_config(&self, f: impl FnOnce(&mut OverlayConfig)) -> bool {
        self.inner.config.update(f)
    }

    fn read<T>(&self, f: impl FnOnce(&OverlayConfig) -> T) -> T {
        self.inner.config.with(f)
    }

    pub fn presentation_style(&self) -> PresentationStyle {
        self.read(|c| c.presentation_style)
    }

    pub fn set_presentation_style(&self, style: PresentationStyle) {
        self.update_config(|c| c.presentation_style = style);
    }

    pub fn dismissal_style(&self) -> DismissalStyle {
        self.read(|c| c.dismissal_style)
    }

    pub fn set_dismissal_style(&self, style: DismissalStyle) {
        self.update_config(|c| c.dismissal_style = style);
    }

    pub fn margin(&self) -> f64 {
        self.read(|c| c.margin)
    }

    pub fn set_margin(&self, margin: f64) {
        self.update_config(|c| c.margin = margin);
    }

    pub fn height(&self) -> f64 {
        self.read(|c| c.height)
    }

    /// Set the overlay height, clamped to `>= 0`.
    pub fn set_height(&self, height: f64) {
        self.update_config(|c| c.height = non_negative(height));
    }

    pub fn dimming_alpha(&self) -> f64 {
        self.read(|c| c.dimming_alpha)
    }

    pub fn set_dimming_alpha(&self, alpha: f64) {
        self.update_config(|c| c.dimming_alpha = alpha);
    }

    pub fn dimming_color(&self) -> Rgba {
        self.read(|c| c.dimming_color)
    }

    pub fn set_dimming_color(&self, color: Rgba) {
        self.update_config(|c| c.dimming_color = color);
    }

    pub fn dimming_dismisses_on_tap(&self) -> bool {
        self.read(|c| c.dimming_dismisses_on_tap)
    }

    pub fn set_dimming_dismisses_on_tap(&self, dismisses: bool) {
        self.update_config(|c| c.dimming_dismisses_on_tap = dismisses);
    }

    /// Transition duration in seconds.
    pub fn duration(&self) -> f64 {
        self.read(|c| c.duration)
    }

    pub fn set_duration(&self, seconds: f64) {
        self.update_config(|c| c.duration = seconds);
    }

    pub fn corner_radius(&self) -> f64 {
        self.read(|c| c.corner_radius)
    }

    pub fn set_corner_radius(&self, radius: f64) {
        self.update_config(|c| c.corner_radius = radius);
    }

    pub fn clips_content(&self) -> bool {
        self.read(|c| c.clips_content)
    }

    pub fn set_clips_content(&self, clips: bool) {
        self.update_config(|c| c.clips_content = clips);
    }

    pub fn has_shadow(&self) -> bool {
        self.read(|c| c.has_shadow)
    }

    pub fn set_has_shadow(&self, has_shadow: bool) {
        self.update_config(|c| c.has_shadow = has_shadow);
    }

    pub fn shadow_opacity(&self) -> f64 {
        self.read(|c| c.shadow.opacity)
    }

    pub fn set_shadow_opacity(&self, opacity: f64) {
        self.update_config(|c| c.shadow.opacity = opacity);
    }

    pub fn shadow_radius(&self) -> f64 {
        self.read(|c| c.shadow.radius)
    }

    pub fn set_shadow_radius(&self, radius: f64) {
        self.update_config(|c| c.shadow.radius = radius);
    }

    pub fn shadow_offset(&self) -> Size {
        self.read(|c| c.shadow.offset)
    }

    pub fn set_shadow_offset(&self, offset: Size) {
        self.update_config(|c| c.shadow.offset = offset);
    }

    pub fn shadow_color(&self) -> Rgba {
        self.read(|c| c.shadow.color)
    }

    pub fn set_shadow_color(&self, color: Rgba) {
        self.update_config(|c| c.shadow.color = color);
    }
}
