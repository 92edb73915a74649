#![forbid(unsafe_code)]

//! Retained view tree.
//!
//! A [`View`] is a cheap, clonable handle (`Rc<RefCell<..>>`) to a node with a
//! frame in its superview's coordinate space, an opacity, an optional
//! background color and [`Layer`] styling (corner radius, clipping, shadow).
//!
//! The tree models exactly what an overlay needs from the host toolkit:
//! reparenting, z-ordered insertion, removal, autoresizing on frame changes,
//! layout invalidation and a single tap handler per view. Drawing is the
//! host's concern.
//!
//! # Invariants
//!
//! - A view has at most one superview; adding it elsewhere removes it first.
//! - Subviews are ordered back to front (index 0 is bottom-most).
//! - `alpha` is always within `[0.0, 1.0]`.
//! - Superview links are weak, so dropping a root drops its subtree.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::color::Rgba;
use crate::geometry::{Rect, Size};

static VIEW_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        Self(VIEW_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

bitflags! {
    /// How a view's size follows its superview's size changes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AutoresizingMask: u8 {
        const FLEXIBLE_WIDTH  = 0b01;
        const FLEXIBLE_HEIGHT = 0b10;
        const FLEXIBLE_SIZE = Self::FLEXIBLE_WIDTH.bits() | Self::FLEXIBLE_HEIGHT.bits();
    }
}

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub opacity: f64,
    pub radius: f64,
    pub offset: Size,
    pub color: Rgba,
}

/// Layer styling attached to every view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layer {
    pub corner_radius: f64,
    pub masks_to_bounds: bool,
    pub shadow: Option<Shadow>,
}

type TapHandler = Rc<dyn Fn()>;

struct ViewInner {
    id: ViewId,
    frame: Rect,
    alpha: f64,
    background: Option<Rgba>,
    layer: Layer,
    autoresizing: AutoresizingMask,
    needs_layout: bool,
    subviews: Vec<View>,
    superview: Weak<RefCell<ViewInner>>,
    on_tap: Option<TapHandler>,
}

/// Handle to a node in the view tree.
#[derive(Clone)]
pub struct View(Rc<RefCell<ViewInner>>);

/// Non-owning view handle.
#[derive(Clone, Default)]
pub struct WeakView(Weak<RefCell<ViewInner>>);

impl WeakView {
    pub fn upgrade(&self) -> Option<View> {
        self.0.upgrade().map(View)
    }
}

impl fmt::Debug for WeakView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakView")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl View {
    /// Create a detached view with the given frame.
    pub fn new(frame: Rect) -> Self {
        Self(Rc::new(RefCell::new(ViewInner {
            id: ViewId::next(),
            frame,
            alpha: 1.0,
            background: None,
            layer: Layer::default(),
            autoresizing: AutoresizingMask::empty(),
            needs_layout: false,
            subviews: Vec::new(),
            superview: Weak::new(),
            on_tap: None,
        })))
    }

    #[inline]
    pub fn id(&self) -> ViewId {
        self.0.borrow().id
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakView {
        WeakView(Rc::downgrade(&self.0))
    }

    // --- Geometry ---

    pub fn frame(&self) -> Rect {
        self.0.borrow().frame
    }

    /// Local coordinate space: `(0, 0, frame.width, frame.height)`.
    pub fn bounds(&self) -> Rect {
        self.0.borrow().frame.bounds()
    }

    /// Set the frame, resizing flexible subviews by the size delta.
    pub fn set_frame(&self, frame: Rect) {
        let (old, children) = {
            let mut inner = self.0.borrow_mut();
            let old = inner.frame.size;
            inner.frame = frame;
            (old, inner.subviews.clone())
        };
        let dw = frame.size.width - old.width;
        let dh = frame.size.height - old.height;
        if dw == 0.0 && dh == 0.0 {
            return;
        }
        for child in children {
            let mask = child.autoresizing_mask();
            if mask.is_empty() {
                continue;
            }
            let mut child_frame = child.frame();
            if mask.contains(AutoresizingMask::FLEXIBLE_WIDTH) {
                child_frame.size.width += dw;
            }
            if mask.contains(AutoresizingMask::FLEXIBLE_HEIGHT) {
                child_frame.size.height += dh;
            }
            child.set_frame(child_frame);
        }
    }

    pub fn autoresizing_mask(&self) -> AutoresizingMask {
        self.0.borrow().autoresizing
    }

    pub fn set_autoresizing_mask(&self, mask: AutoresizingMask) {
        self.0.borrow_mut().autoresizing = mask;
    }

    // --- Appearance ---

    pub fn alpha(&self) -> f64 {
        self.0.borrow().alpha
    }

    /// Set opacity, clamped to `[0.0, 1.0]` (NaN becomes 0).
    pub fn set_alpha(&self, alpha: f64) {
        let alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        self.0.borrow_mut().alpha = alpha;
    }

    pub fn background_color(&self) -> Option<Rgba> {
        self.0.borrow().background
    }

    pub fn set_background_color(&self, color: Option<Rgba>) {
        self.0.borrow_mut().background = color;
    }

    pub fn layer(&self) -> Layer {
        self.0.borrow().layer
    }

    pub fn set_corner_radius(&self, radius: f64) {
        self.0.borrow_mut().layer.corner_radius = radius;
    }

    pub fn set_masks_to_bounds(&self, masks: bool) {
        self.0.borrow_mut().layer.masks_to_bounds = masks;
    }

    pub fn set_shadow(&self, shadow: Option<Shadow>) {
        self.0.borrow_mut().layer.shadow = shadow;
    }

    // --- Hierarchy ---

    pub fn superview(&self) -> Option<View> {
        self.0.borrow().superview.upgrade().map(View)
    }

    /// Snapshot of the subviews, back to front.
    pub fn subviews(&self) -> Vec<View> {
        self.0.borrow().subviews.clone()
    }

    pub fn subview_count(&self) -> usize {
        self.0.borrow().subviews.len()
    }

    /// Position of `child` among this view's subviews.
    pub fn index_of(&self, child: &View) -> Option<usize> {
        self.0
            .borrow()
            .subviews
            .iter()
            .position(|v| v.ptr_eq(child))
    }

    pub fn contains(&self, child: &View) -> bool {
        self.index_of(child).is_some()
    }

    /// Whether `self` is `ancestor` or lives somewhere below it.
    pub fn is_descendant_of(&self, ancestor: &View) -> bool {
        let mut current = Some(self.clone());
        while let Some(view) = current {
            if view.ptr_eq(ancestor) {
                return true;
            }
            current = view.superview();
        }
        false
    }

    /// Append `child` on top of the existing subviews.
    pub fn add_subview(&self, child: &View) {
        let index = self.subview_count();
        self.insert_subview(child, index);
    }

    /// Insert `child` at `index` (clamped), reparenting it if needed.
    ///
    /// Inserting a view into itself or into one of its own descendants is
    /// ignored.
    pub fn insert_subview(&self, child: &View, index: usize) {
        if self.is_descendant_of(child) {
            return;
        }
        child.remove_from_superview();
        child.0.borrow_mut().superview = Rc::downgrade(&self.0);
        let mut inner = self.0.borrow_mut();
        let index = index.min(inner.subviews.len());
        inner.subviews.insert(index, child.clone());
    }

    /// Detach from the superview. No-op for detached views.
    pub fn remove_from_superview(&self) {
        let parent = {
            let mut inner = self.0.borrow_mut();
            std::mem::take(&mut inner.superview)
        };
        if let Some(parent) = parent.upgrade() {
            parent.borrow_mut().subviews.retain(|v| !Rc::ptr_eq(&v.0, &self.0));
        }
    }

    // --- Layout ---

    pub fn set_needs_layout(&self) {
        self.0.borrow_mut().needs_layout = true;
    }

    pub fn needs_layout(&self) -> bool {
        self.0.borrow().needs_layout
    }

    /// Clear the layout flag, returning whether it was set.
    pub fn take_needs_layout(&self) -> bool {
        std::mem::take(&mut self.0.borrow_mut().needs_layout)
    }

    // --- Input ---

    pub fn set_tap_handler(&self, handler: Option<Rc<dyn Fn()>>) {
        self.0.borrow_mut().on_tap = handler;
    }

    pub fn has_tap_handler(&self) -> bool {
        self.0.borrow().on_tap.is_some()
    }

    /// Deliver a tap. Returns `true` if a handler ran.
    pub fn tap(&self) -> bool {
        let handler = self.0.borrow().on_tap.clone();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("View")
            .field("id", &inner.id.0)
            .field("frame", &inner.frame)
            .field("alpha", &inner.alpha)
            .field("subviews", &inner.subviews.len())
            .finish()
    }
}
