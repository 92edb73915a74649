#![forbid(unsafe_code)]

//! Integration tests: overlay presentation and dismissal through the
//! simulated host.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use alertkit_core::{Point, Rect, Size, View};
use alertkit_harness::{SimulatedHost, init_test_logging, path_to, view_tree};
use alertkit_runtime::{Application, PresentationHost, Screen};
use alertkit_widgets::{
    DismissalStyle, OverlayContainer, OverlayDelegate, PresentationStyle, TransitionPhase,
};
use proptest::prelude::*;
use serde_json::json;

const RESTING: Rect = Rect::new(40.0, 280.0, 320.0, 240.0);

fn host() -> Rc<SimulatedHost> {
    init_test_logging();
    SimulatedHost::new(Screen::new("root"), Size::new(400.0, 800.0))
}

fn flag() -> (Rc<Cell<bool>>, Option<Box<dyn FnOnce()>>) {
    let flag = Rc::new(Cell::new(false));
    let set = Rc::clone(&flag);
    (flag, Some(Box::new(move || set.set(true))))
}

fn wrapper(overlay: &OverlayContainer) -> View {
    overlay
        .transition_controller()
        .and_then(|c| c.shadow_wrapper_view())
        .expect("overlay has a live session")
}

fn backdrop(overlay: &OverlayContainer) -> View {
    overlay
        .transition_controller()
        .and_then(|c| c.backdrop_view())
        .expect("overlay has a live session")
}

fn phase(overlay: &OverlayContainer) -> TransitionPhase {
    overlay
        .transition_controller()
        .map(|c| c.phase())
        .unwrap_or_default()
}

// ============================================================================
// Presentation
// ============================================================================

#[test]
fn default_presentation_slides_up_to_center() {
    let host = host();
    let content = View::new(Rect::new(0.0, 0.0, 320.0, 240.0));
    let (presented, on_presented) = flag();
    let overlay = OverlayContainer::present(&host, &content, host.root(), |_| {}, on_presented);

    let wrapper = wrapper(&overlay);
    assert_eq!(wrapper.frame(), Rect::new(40.0, 800.0, 320.0, 240.0));
    assert_eq!(phase(&overlay), TransitionPhase::PresentingAnimating);
    assert!(!presented.get());

    host.settle();
    assert_eq!(wrapper.frame(), RESTING);
    assert_eq!(backdrop(&overlay).alpha(), 0.5);
    assert_eq!(phase(&overlay), TransitionPhase::Presented);
    assert!(presented.get());
    assert!(content.is_descendant_of(&wrapper));
    assert!(host.root().presented().is_some_and(|s| s.ptr_eq(overlay.screen())));
}

#[test]
fn container_layering_is_backdrop_then_wrapper() {
    let host = host();
    let content = View::new(Rect::ZERO);
    let overlay = OverlayContainer::present(&host, &content, host.root(), |o| {
        o.set_has_shadow(true);
    }, None);
    host.settle();

    let container = host.container_view(overlay.screen()).unwrap();
    assert_eq!(path_to(&container, &backdrop(&overlay)), Some(vec![0]));
    assert_eq!(path_to(&container, &wrapper(&overlay)), Some(vec![1]));
    assert_eq!(path_to(&container, &overlay.view()), Some(vec![1, 0]));
    assert_eq!(path_to(&container, &content), Some(vec![1, 0, 0]));

    let tree = view_tree(&container);
    assert_eq!(tree["subviews"][0]["tappable"], json!(true));
    assert_eq!(tree["subviews"][1]["shadow"]["radius"], json!(13.0));
    assert_eq!(tree["subviews"][1]["subviews"][0]["corner_radius"], json!(8.0));
    assert_eq!(tree["subviews"][1]["subviews"][0]["masks_to_bounds"], json!(true));
    assert_eq!(tree["subviews"][1]["subviews"][0]["background"], json!("#ffffffff"));
}

#[test]
fn zoom_fade_grows_and_fades_in() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_presentation_style(PresentationStyle::ZoomFade);
    }, None);

    let wrapper = wrapper(&overlay);
    assert_eq!(wrapper.alpha(), 0.0);
    assert_eq!(wrapper.frame(), Rect::collapsed_at(Point::new(200.0, 400.0)));

    host.advance(Duration::from_millis(150));
    assert!(wrapper.alpha() > 0.0 && wrapper.alpha() < 1.0);
    assert!(wrapper.frame().width() > 0.0 && wrapper.frame().width() < 320.0);

    host.settle();
    assert_eq!(wrapper.alpha(), 1.0);
    assert_eq!(wrapper.frame(), RESTING);
}

#[test]
fn no_style_completes_without_animation() {
    let host = host();
    let (presented, on_presented) = flag();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_presentation_style(PresentationStyle::None);
        o.set_dismissal_style(DismissalStyle::None);
        o.set_duration(5.0);
    }, on_presented);

    assert!(presented.get());
    assert!(host.timeline().is_idle());
    assert_eq!(wrapper(&overlay).frame(), RESTING);
    assert_eq!(backdrop(&overlay).alpha(), 0.5);

    let (dismissed, on_dismissed) = flag();
    assert!(OverlayContainer::dismiss(&*host, true, on_dismissed));
    assert!(dismissed.get());
    assert_eq!(host.presentation_count(), 0);
}

#[test]
fn present_with_height_sizes_overlay() {
    let host = host();
    let overlay =
        OverlayContainer::present_with_height(&host, &View::new(Rect::ZERO), host.root(), 100.0);
    host.settle();
    assert_eq!(overlay.preferred_content_size(), Size::new(320.0, 100.0));
    assert_eq!(wrapper(&overlay).frame(), Rect::new(40.0, 350.0, 320.0, 100.0));
}

#[test]
fn negative_height_collapses_to_zero() {
    let host = host();
    let overlay =
        OverlayContainer::present_with_height(&host, &View::new(Rect::ZERO), host.root(), -20.0);
    host.settle();
    assert_eq!(overlay.height(), 0.0);
    assert_eq!(wrapper(&overlay).frame(), Rect::new(40.0, 400.0, 320.0, 0.0));
}

#[test]
fn second_present_over_same_screen_is_ignored() {
    let host = host();
    let first = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    let (presented, on_presented) = flag();
    let _second =
        OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, on_presented);
    host.settle();

    assert!(!presented.get());
    assert_eq!(host.presentation_count(), 1);
    assert!(host.root().presented().is_some_and(|s| s.ptr_eq(first.screen())));
}

// ============================================================================
// Dismissal
// ============================================================================

#[test]
fn bottom_dismissal_exits_below_container() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    let wrapper = wrapper(&overlay);
    let backdrop = backdrop(&overlay);

    let (dismissed, on_dismissed) = flag();
    assert!(OverlayContainer::dismiss(&*host, true, on_dismissed));
    assert_eq!(phase(&overlay), TransitionPhase::DismissingAnimating);

    host.advance(Duration::from_millis(150));
    assert!(wrapper.frame().y() > RESTING.y() && wrapper.frame().y() < 800.0);
    assert!(backdrop.alpha() > 0.0 && backdrop.alpha() < 0.5);

    host.settle();
    assert_eq!(wrapper.frame(), Rect::new(40.0, 800.0, 320.0, 240.0));
    assert_eq!(backdrop.alpha(), 0.0);
    assert!(dismissed.get());
    assert_eq!(phase(&overlay), TransitionPhase::Idle);
    assert_eq!(host.presentation_count(), 0);
    assert!(host.root().presented().is_none());
    assert!(backdrop.superview().is_none());
}

#[test]
fn top_and_zoom_fade_dismissals() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_dismissal_style(DismissalStyle::Top);
    }, None);
    host.settle();
    let wrapper_view = wrapper(&overlay);
    OverlayContainer::dismiss(&*host, true, None);
    host.settle();
    assert_eq!(wrapper_view.frame(), Rect::new(40.0, -240.0, 320.0, 240.0));

    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_dismissal_style(DismissalStyle::ZoomFade);
    }, None);
    host.settle();
    let wrapper_view = wrapper(&overlay);
    OverlayContainer::dismiss(&*host, true, None);
    host.settle();
    assert_eq!(wrapper_view.frame(), Rect::collapsed_at(Point::new(200.0, 400.0)));
    assert_eq!(wrapper_view.alpha(), 0.0);
}

#[test]
fn dismiss_resolves_through_navigation_stack() {
    init_test_logging();
    let top = Screen::new("top");
    let nav = Screen::navigation("nav", vec![Screen::new("bottom"), top.clone()]);
    let host = SimulatedHost::new(nav, Size::new(400.0, 800.0));

    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), &top, |_| {}, None);
    host.settle();
    assert!(top.presented().is_some_and(|s| s.ptr_eq(overlay.screen())));

    assert!(OverlayContainer::dismiss(&*host, true, None));
    host.settle();
    assert!(top.presented().is_none());
}

#[test]
fn dismiss_without_key_window_does_nothing() {
    let host = host();
    let _overlay =
        OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    host.with_application(|app| *app = Application::default());

    assert!(!OverlayContainer::dismiss(&*host, true, None));
    host.settle();
    assert_eq!(host.presentation_count(), 1);
}

#[test]
fn non_animated_dismissal_is_immediate() {
    let host = host();
    let _overlay =
        OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    let (dismissed, on_dismissed) = flag();
    host.dismiss(host.root(), false, on_dismissed);
    assert!(dismissed.get());
    assert!(host.timeline().is_idle());
    assert_eq!(host.presentation_count(), 0);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancelled_presentation_removes_everything() {
    let host = host();
    let (presented, on_presented) = flag();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, on_presented);
    assert_eq!(host.cancel_active_transitions(), 1);
    host.settle();

    assert!(!presented.get());
    assert_eq!(phase(&overlay), TransitionPhase::Idle);
    assert!(overlay.transition_controller().unwrap().backdrop_view().is_none());
    assert!(host.root().presented().is_none());
    assert_eq!(host.presentation_count(), 0);
    assert_eq!(host.window_view().subview_count(), 1);
}

#[test]
fn cancelled_dismissal_keeps_overlay_on_screen() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();

    let (dismissed, on_dismissed) = flag();
    OverlayContainer::dismiss(&*host, true, on_dismissed);
    host.advance(Duration::from_millis(100));
    assert_eq!(host.cancel_active_transitions(), 1);
    host.settle();

    assert!(!dismissed.get());
    assert_eq!(phase(&overlay), TransitionPhase::Presented);
    assert_eq!(wrapper(&overlay).frame(), RESTING);
    assert_eq!(backdrop(&overlay).alpha(), 0.5);
    assert!(host.is_presented(overlay.screen()));
}

// ============================================================================
// Backdrop taps
// ============================================================================

struct TapCounter {
    taps: Cell<usize>,
}

impl OverlayDelegate for TapCounter {
    fn did_tap_backdrop(&self, _container: &OverlayContainer) {
        self.taps.set(self.taps.get() + 1);
    }
}

#[test]
fn tap_dismisses_and_notifies_delegate() {
    let host = host();
    let delegate = Rc::new(TapCounter { taps: Cell::new(0) });
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_delegate(&delegate);
    }, None);
    host.settle();

    assert!(backdrop(&overlay).tap());
    assert_eq!(delegate.taps.get(), 1);
    assert_eq!(host.active_transition_count(), 1);
    host.settle();
    assert_eq!(host.presentation_count(), 0);
}

#[test]
fn tap_is_ignored_when_disabled() {
    let host = host();
    let delegate = Rc::new(TapCounter { taps: Cell::new(0) });
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_delegate(&delegate);
        o.set_dimming_dismisses_on_tap(false);
    }, None);
    host.settle();

    backdrop(&overlay).tap();
    host.settle();
    assert_eq!(delegate.taps.get(), 0);
    assert_eq!(host.presentation_count(), 1);

    overlay.set_dimming_dismisses_on_tap(true);
    backdrop(&overlay).tap();
    host.settle();
    assert_eq!(delegate.taps.get(), 1);
    assert_eq!(host.presentation_count(), 0);
}

#[test]
fn clear_dimming_color_still_takes_taps() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_dimming_color(alertkit_core::Rgba::CLEAR);
    }, None);
    host.settle();
    assert!(backdrop(&overlay).tap());
    host.settle();
    assert_eq!(host.presentation_count(), 0);
}

// ============================================================================
// Live configuration
// ============================================================================

#[test]
fn settings_changed_mid_presentation_reach_the_transition() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.advance(Duration::from_millis(100));

    overlay.set_dismissal_style(DismissalStyle::Top);
    overlay.set_corner_radius(16.0);
    overlay.set_dimming_alpha(0.8);
    let controller = overlay.transition_controller().unwrap();
    assert_eq!(controller.config(), overlay.config());
    assert_eq!(overlay.view().layer().corner_radius, 16.0);

    host.settle();
    assert_eq!(backdrop(&overlay).alpha(), 0.8);

    let wrapper_view = wrapper(&overlay);
    OverlayContainer::dismiss(&*host, true, None);
    host.settle();
    assert_eq!(wrapper_view.frame().max_y(), 0.0);
}

#[test]
fn entrance_style_is_fixed_once_begun() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    overlay.set_presentation_style(PresentationStyle::Top);
    let wrapper_view = wrapper(&overlay);
    assert_eq!(wrapper_view.frame().y(), 800.0);
    host.settle();
    assert_eq!(wrapper_view.frame(), RESTING);
}

#[test]
fn identical_writes_change_nothing() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    let before = overlay.config();
    overlay.set_margin(40.0);
    overlay.set_height(240.0);
    assert!(!overlay.update_config(|c| c.dimming_alpha = 0.5));
    assert_eq!(overlay.config(), before);
    assert_eq!(wrapper(&overlay).frame(), RESTING);
}

#[test]
fn margin_change_relayouts_presented_overlay() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();
    let container = host.container_view(overlay.screen()).unwrap();
    container.take_needs_layout();

    overlay.set_margin(20.0);
    assert!(container.needs_layout());
    host.layout();
    assert_eq!(wrapper(&overlay).frame(), Rect::new(20.0, 280.0, 360.0, 240.0));
    assert_eq!(overlay.view().frame(), Rect::new(0.0, 0.0, 360.0, 240.0));
}

// ============================================================================
// Delegate style overrides
// ============================================================================

struct StyleOverride;

impl OverlayDelegate for StyleOverride {
    fn presentation_style(&self, _container: &OverlayContainer) -> Option<PresentationStyle> {
        Some(PresentationStyle::Top)
    }

    fn dismissal_style(&self, _container: &OverlayContainer) -> Option<DismissalStyle> {
        Some(DismissalStyle::ZoomFade)
    }
}

#[test]
fn delegate_overrides_are_written_back() {
    let host = host();
    let delegate = Rc::new(StyleOverride);
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
        o.set_delegate(&delegate);
    }, None);

    assert_eq!(overlay.presentation_style(), PresentationStyle::Top);
    let wrapper_view = wrapper(&overlay);
    assert_eq!(wrapper_view.frame(), Rect::new(40.0, -240.0, 320.0, 240.0));
    host.settle();

    OverlayContainer::dismiss(&*host, true, None);
    assert_eq!(overlay.dismissal_style(), DismissalStyle::ZoomFade);
    host.settle();
    assert_eq!(wrapper_view.alpha(), 0.0);
}

// ============================================================================
// Rotation
// ============================================================================

#[test]
fn rotation_recenters_overlay() {
    let host = host();
    let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |_| {}, None);
    host.settle();

    host.resize(Size::new(800.0, 400.0));
    assert_eq!(overlay.preferred_content_size(), Size::new(720.0, 240.0));
    assert_eq!(wrapper(&overlay).frame(), Rect::new(40.0, 80.0, 720.0, 240.0));
    assert_eq!(backdrop(&overlay).frame(), Rect::new(0.0, 0.0, 800.0, 400.0));
    assert_eq!(overlay.view().frame(), Rect::new(0.0, 0.0, 720.0, 240.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn presented_overlay_is_centered(
        width in 200.0f64..1200.0,
        height in 100.0f64..1200.0,
        margin in 0.0f64..60.0,
        overlay_height in 0.0f64..400.0,
    ) {
        let host = SimulatedHost::new(Screen::new("root"), Size::new(width, height));
        let overlay = OverlayContainer::present(&host, &View::new(Rect::ZERO), host.root(), |o| {
            o.set_margin(margin);
            o.set_height(overlay_height);
        }, None);
        host.settle();

        let frame = wrapper(&overlay).frame();
        prop_assert!((frame.width() - (width - 2.0 * margin)).abs() < 1e-9);
        prop_assert!((frame.height() - overlay_height).abs() < 1e-9);
        prop_assert!((frame.mid_x() - width / 2.0).abs() < 1e-9);
        prop_assert!((frame.mid_y() - height / 2.0).abs() < 1e-9);
    }
}
