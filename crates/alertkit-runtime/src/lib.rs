#![forbid(unsafe_code)]

//! Runtime services for alertkit: reactive state, the animation timeline,
//! the screen tree, and the contracts between the host's transition
//! machinery and custom transitions.

pub mod animation;
pub mod display;
pub mod host;
pub mod reactive;
pub mod screen;
pub mod transition;

pub use animation::{
    AnimationCompletion, AnimationId, AnimationRequest, Animator, Easing, Timeline, Track,
};
pub use display::{DEFAULT_DISPLAY_SIZE, DisplayMetrics};
pub use host::{Completion, PresentationHost};
pub use reactive::{Binding, BindingScope, Observable, Subscription};
pub use screen::{
    ActivationState, Application, ModalPresentationStyle, Screen, ScreenContent, ScreenId,
    ScreenKind, WeakScreen, Window, WindowScene, visible_screen,
};
pub use transition::{
    AnimatedTransitioning, PresentationController, TransitionContext, TransitionCoordinator,
    TransitionDirection, TransitionKey, TransitioningDelegate,
};
