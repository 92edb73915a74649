#![forbid(unsafe_code)]

//! Screens, windows, and the "currently visible screen" walk.
//!
//! A [`Screen`] is the host toolkit's unit of presentation: it owns a root
//! [`View`], may host children (navigation stack or tabs), and may present
//! one modal child. Presentation links are strong downward
//! (`presented`) and weak upward (`presenting`).
//!
//! [`visible_screen`] resolves the leaf a user is currently looking at by
//! following navigation "visible", tab "selected", and modal "presented"
//! relations recursively.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use alertkit_core::{Rect, Size, View};

use crate::transition::TransitioningDelegate;

static SCREEN_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(u64);

impl ScreenId {
    fn next() -> Self {
        Self(SCREEN_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// How a screen wants to be presented modally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPresentationStyle {
    /// Host-driven full-screen presentation.
    #[default]
    FullScreen,
    /// Presentation driven by the screen's transitioning delegate.
    Custom,
}

/// Container relation of a screen.
#[derive(Clone, Default)]
pub enum ScreenKind {
    #[default]
    Leaf,
    /// Stack of screens; the last one is on top.
    Navigation { stack: Vec<Screen> },
    /// Tabbed screens with an optional selection.
    Tabs {
        tabs: Vec<Screen>,
        selected: Option<usize>,
    },
}

/// Hooks a screen's owner can observe.
pub trait ScreenContent {
    /// The display is about to change to `size` (rotation, window resize).
    fn will_transition_to_size(&self, _size: Size) {}
}

struct ScreenInner {
    id: ScreenId,
    name: String,
    view: View,
    kind: ScreenKind,
    presented: Option<Screen>,
    presenting: Weak<RefCell<ScreenInner>>,
    modal_style: ModalPresentationStyle,
    transitioning_delegate: Option<Rc<dyn TransitioningDelegate>>,
    preferred_content_size: Size,
    content: Option<Rc<dyn ScreenContent>>,
}

/// Handle to a screen.
#[derive(Clone)]
pub struct Screen(Rc<RefCell<ScreenInner>>);

/// Non-owning screen handle.
#[derive(Clone, Default)]
pub struct WeakScreen(Weak<RefCell<ScreenInner>>);

impl WeakScreen {
    pub fn upgrade(&self) -> Option<Screen> {
        self.0.upgrade().map(Screen)
    }
}

impl fmt::Debug for WeakScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(screen) => write!(f, "WeakScreen({:?})", screen.name()),
            None => f.write_str("WeakScreen(<dropped>)"),
        }
    }
}

impl Screen {
    /// A leaf screen with an empty root view.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, ScreenKind::Leaf)
    }

    /// A navigation container over `stack` (last is on top).
    pub fn navigation(name: impl Into<String>, stack: Vec<Screen>) -> Self {
        Self::with_kind(name, ScreenKind::Navigation { stack })
    }

    /// A tab container with `selected` tab.
    pub fn tabs(name: impl Into<String>, tabs: Vec<Screen>, selected: Option<usize>) -> Self {
        Self::with_kind(name, ScreenKind::Tabs { tabs, selected })
    }

    pub fn with_kind(name: impl Into<String>, kind: ScreenKind) -> Self {
        Self(Rc::new(RefCell::new(ScreenInner {
            id: ScreenId::next(),
            name: name.into(),
            view: View::new(Rect::ZERO),
            kind,
            presented: None,
            presenting: Weak::new(),
            modal_style: ModalPresentationStyle::default(),
            transitioning_delegate: None,
            preferred_content_size: Size::ZERO,
            content: None,
        })))
    }

    #[inline]
    pub fn id(&self) -> ScreenId {
        self.0.borrow().id
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakScreen {
        WeakScreen(Rc::downgrade(&self.0))
    }

    /// Root view of the screen.
    pub fn view(&self) -> View {
        self.0.borrow().view.clone()
    }

    pub fn kind(&self) -> ScreenKind {
        self.0.borrow().kind.clone()
    }

    // --- Containers ---

    /// Push onto a navigation stack. No-op for other kinds.
    pub fn push(&self, screen: Screen) {
        if let ScreenKind::Navigation { stack } = &mut self.0.borrow_mut().kind {
            stack.push(screen);
        }
    }

    /// Pop from a navigation stack.
    pub fn pop(&self) -> Option<Screen> {
        match &mut self.0.borrow_mut().kind {
            ScreenKind::Navigation { stack } => stack.pop(),
            _ => None,
        }
    }

    /// Select a tab. Out-of-range indices clear the selection.
    pub fn select_tab(&self, index: usize) {
        if let ScreenKind::Tabs { tabs, selected } = &mut self.0.borrow_mut().kind {
            *selected = (index < tabs.len()).then_some(index);
        }
    }

    /// Top of a navigation stack.
    pub fn top_screen(&self) -> Option<Screen> {
        match &self.0.borrow().kind {
            ScreenKind::Navigation { stack } => stack.last().cloned(),
            _ => None,
        }
    }

    /// Selected tab of a tab container.
    pub fn selected_tab(&self) -> Option<Screen> {
        match &self.0.borrow().kind {
            ScreenKind::Tabs { tabs, selected } => selected.and_then(|i| tabs.get(i).cloned()),
            _ => None,
        }
    }

    // --- Modal presentation ---

    pub fn presented(&self) -> Option<Screen> {
        self.0.borrow().presented.clone()
    }

    pub fn presenting(&self) -> Option<Screen> {
        self.0.borrow().presenting.upgrade().map(Screen)
    }

    /// Record that `self` presents `child`.
    pub fn link_presented(&self, child: &Screen) {
        self.0.borrow_mut().presented = Some(child.clone());
        child.0.borrow_mut().presenting = Rc::downgrade(&self.0);
    }

    /// Break the link to the presented child, returning it.
    pub fn unlink_presented(&self) -> Option<Screen> {
        let child = self.0.borrow_mut().presented.take()?;
        child.0.borrow_mut().presenting = Weak::new();
        Some(child)
    }

    pub fn modal_presentation_style(&self) -> ModalPresentationStyle {
        self.0.borrow().modal_style
    }

    pub fn set_modal_presentation_style(&self, style: ModalPresentationStyle) {
        self.0.borrow_mut().modal_style = style;
    }

    pub fn transitioning_delegate(&self) -> Option<Rc<dyn TransitioningDelegate>> {
        self.0.borrow().transitioning_delegate.clone()
    }

    pub fn set_transitioning_delegate(&self, delegate: Option<Rc<dyn TransitioningDelegate>>) {
        self.0.borrow_mut().transitioning_delegate = delegate;
    }

    // --- Content ---

    pub fn preferred_content_size(&self) -> Size {
        self.0.borrow().preferred_content_size
    }

    /// Store a new preferred size. Returns whether it changed.
    pub fn set_preferred_content_size(&self, size: Size) -> bool {
        let mut inner = self.0.borrow_mut();
        if inner.preferred_content_size == size {
            return false;
        }
        inner.preferred_content_size = size;
        true
    }

    pub fn content(&self) -> Option<Rc<dyn ScreenContent>> {
        self.0.borrow().content.clone()
    }

    pub fn set_content(&self, content: Option<Rc<dyn ScreenContent>>) {
        self.0.borrow_mut().content = content;
    }

    /// Forward a display size change to this screen's content hook.
    pub fn will_transition_to_size(&self, size: Size) {
        if let Some(content) = self.content() {
            content.will_transition_to_size(size);
        }
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        let kind = match inner.kind {
            ScreenKind::Leaf => "leaf",
            ScreenKind::Navigation { .. } => "navigation",
            ScreenKind::Tabs { .. } => "tabs",
        };
        f.debug_struct("Screen")
            .field("id", &inner.id.0)
            .field("name", &inner.name)
            .field("kind", &kind)
            .field("presenting_child", &inner.presented.is_some())
            .finish()
    }
}

/// The screen currently visible from `root`.
///
/// - navigation: its presented child if any, else the top of the stack;
/// - tabs: the selected tab;
/// - anything else: its presented child if any, else itself.
///
/// Empty stacks and missing selections resolve to `None`.
pub fn visible_screen(root: Option<&Screen>) -> Option<Screen> {
    let screen = root?;
    match screen.kind() {
        ScreenKind::Navigation { stack } => {
            let visible = screen.presented().or_else(|| stack.last().cloned());
            visible_screen(visible.as_ref())
        }
        ScreenKind::Tabs { .. } => visible_screen(screen.selected_tab().as_ref()),
        ScreenKind::Leaf => match screen.presented() {
            Some(presented) => visible_screen(Some(&presented)),
            None => Some(screen.clone()),
        },
    }
}

/// A top-level window.
#[derive(Debug, Clone, Default)]
pub struct Window {
    pub root: Option<Screen>,
    pub is_key: bool,
}

impl Window {
    pub fn new(root: Screen) -> Self {
        Self {
            root: Some(root),
            is_key: false,
        }
    }

    #[must_use]
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }
}

/// Lifecycle state of a window scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    ForegroundActive,
    ForegroundInactive,
    Background,
    #[default]
    Unattached,
}

/// A group of windows sharing an activation state.
#[derive(Debug, Clone, Default)]
pub struct WindowScene {
    pub activation: ActivationState,
    pub windows: Vec<Window>,
}

/// The host application's windows.
#[derive(Debug, Clone, Default)]
pub struct Application {
    /// Single window owned by a legacy application delegate.
    pub delegate_window: Option<Window>,
    pub scenes: Vec<WindowScene>,
    /// Windows not attached to any scene.
    pub windows: Vec<Window>,
}

impl Application {
    /// Resolve the window that receives input.
    ///
    /// Order: the application-delegate window, then the key window of the
    /// first foreground-active scene, then any key window at all.
    pub fn key_window(&self) -> Option<&Window> {
        if let Some(window) = &self.delegate_window {
            return Some(window);
        }
        let active = self
            .scenes
            .iter()
            .find(|s| s.activation == ActivationState::ForegroundActive)
            .and_then(|s| s.windows.iter().find(|w| w.is_key));
        if active.is_some() {
            return active;
        }
        self.scenes
            .iter()
            .flat_map(|s| s.windows.iter())
            .chain(self.windows.iter())
            .find(|w| w.is_key)
    }

    /// The visible screen of the key window.
    pub fn visible_screen(&self) -> Option<Screen> {
        visible_screen(self.key_window()?.root.as_ref())
    }
}
