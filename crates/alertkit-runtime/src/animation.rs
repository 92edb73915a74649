#![forbid(unsafe_code)]

//! Property animations over the view tree.
//!
//! The [`Animator`] trait is the host's animation primitive: animate a set of
//! view properties from their current values to targets over a duration,
//! then report completion and whether the animation ran to its end.
//!
//! [`Timeline`] is a deterministic, tick-driven implementation. Hosts call
//! [`Timeline::tick`] once per frame (wall clock) or [`Timeline::advance`]
//! with an explicit delta (tests, replays).
//!
//! # Invariants
//!
//! - Start values are captured when the animation is scheduled.
//! - Every scheduled animation reports completion exactly once.
//! - Zero-length animations apply their targets and complete synchronously.
//! - Completion callbacks run after the timeline releases its internal
//!   borrow, so they may schedule further animations.
//!
//! # Failure Modes
//!
//! - Interrupting an unknown id returns `false`.
//! - Tracks whose view was dropped are skipped.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use alertkit_core::{Rect, View, WeakView};
use tracing::{debug, trace};
use web_time::Instant;

/// Timing curve applied to animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress in `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Target values for one view.
#[derive(Debug, Clone)]
pub struct Track {
    view: View,
    frame: Option<Rect>,
    alpha: Option<f64>,
}

impl Track {
    pub fn new(view: &View) -> Self {
        Self {
            view: view.clone(),
            frame: None,
            alpha: None,
        }
    }

    #[must_use]
    pub fn frame(mut self, frame: Rect) -> Self {
        self.frame = Some(frame);
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn target_frame(&self) -> Option<Rect> {
        self.frame
    }

    pub fn target_alpha(&self) -> Option<f64> {
        self.alpha
    }

    /// Jump straight to the target values.
    pub fn apply_targets(&self) {
        if let Some(frame) = self.frame {
            self.view.set_frame(frame);
        }
        if let Some(alpha) = self.alpha {
            self.view.set_alpha(alpha);
        }
    }
}

/// A batch of tracks animated together.
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub duration: Duration,
    pub easing: Easing,
    pub tracks: Vec<Track>,
}

impl AnimationRequest {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
            tracks: Vec::new(),
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    #[must_use]
    pub fn tracks(mut self, tracks: impl IntoIterator<Item = Track>) -> Self {
        self.tracks.extend(tracks);
        self
    }
}

/// Called once with `true` if the animation finished, `false` if interrupted.
pub type AnimationCompletion = Box<dyn FnOnce(bool)>;

/// Identifier of a scheduled animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The host's property-animation primitive.
pub trait Animator {
    /// Animate `request` from the current values, then call `completion`.
    fn animate(
        &self,
        request: AnimationRequest,
        completion: Option<AnimationCompletion>,
    ) -> AnimationId;
}

struct ActiveTrack {
    view: WeakView,
    from_frame: Rect,
    to_frame: Option<Rect>,
    from_alpha: f64,
    to_alpha: Option<f64>,
}

impl ActiveTrack {
    fn capture(track: Track) -> Self {
        Self {
            from_frame: track.view.frame(),
            from_alpha: track.view.alpha(),
            view: track.view.downgrade(),
            to_frame: track.frame,
            to_alpha: track.alpha,
        }
    }

    fn sample(&self, progress: f64) {
        let Some(view) = self.view.upgrade() else {
            return;
        };
        if let Some(to) = self.to_frame {
            view.set_frame(self.from_frame.lerp(to, progress));
        }
        if let Some(to) = self.to_alpha {
            view.set_alpha(self.from_alpha + (to - self.from_alpha) * progress);
        }
    }
}

struct ActiveAnimation {
    id: AnimationId,
    duration: Duration,
    easing: Easing,
    elapsed: Duration,
    tracks: Vec<ActiveTrack>,
    completion: Option<AnimationCompletion>,
}

impl ActiveAnimation {
    fn linear_progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn sample(&self) {
        let eased = self.easing.apply(self.linear_progress());
        for track in &self.tracks {
            track.sample(eased);
        }
    }

    fn finish_values(&self) {
        for track in &self.tracks {
            track.sample(1.0);
        }
    }
}

#[derive(Default)]
struct TimelineState {
    next_id: u64,
    active: Vec<ActiveAnimation>,
    last_tick: Option<Instant>,
}

/// Deterministic animation driver.
#[derive(Default)]
pub struct Timeline {
    state: RefCell<TimelineState>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("active", &self.active_count())
            .finish()
    }
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of animations still running.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    /// Advance all animations by `dt`, completing those that reach their end.
    ///
    /// Returns the number of animations that completed.
    pub fn advance(&self, dt: Duration) -> usize {
        let finished = {
            let mut state = self.state.borrow_mut();
            let mut finished = Vec::new();
            let mut i = 0;
            while i < state.active.len() {
                let anim = &mut state.active[i];
                anim.elapsed = anim.elapsed.saturating_add(dt);
                anim.sample();
                if anim.elapsed >= anim.duration {
                    finished.push(state.active.remove(i));
                } else {
                    i += 1;
                }
            }
            finished
        };
        let count = finished.len();
        for anim in finished {
            trace!(id = anim.id.0, "animation finished");
            if let Some(completion) = anim.completion {
                completion(true);
            }
        }
        count
    }

    /// Advance by the wall-clock time since the previous tick.
    ///
    /// The first tick only records the reference instant.
    pub fn tick(&self) -> usize {
        let now = Instant::now();
        let last = self.state.borrow_mut().last_tick.replace(now);
        match last {
            Some(last) => self.advance(now.saturating_duration_since(last)),
            None => 0,
        }
    }

    /// Run every animation to its end, including ones scheduled by
    /// completion callbacks along the way.
    pub fn finish_all(&self) -> usize {
        let mut total = 0;
        loop {
            let remaining = self
                .state
                .borrow()
                .active
                .iter()
                .map(|a| a.duration.saturating_sub(a.elapsed))
                .max();
            match remaining {
                Some(dt) => total += self.advance(dt),
                None => return total,
            }
        }
    }

    /// Stop `id`, snapping to its targets and reporting `finished = false`.
    pub fn interrupt(&self, id: AnimationId) -> bool {
        let anim = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.active.iter().position(|a| a.id == id) else {
                return false;
            };
            state.active.remove(index)
        };
        debug!(id = id.0, "animation interrupted");
        anim.finish_values();
        if let Some(completion) = anim.completion {
            completion(false);
        }
        true
    }

    /// Interrupt every running animation.
    pub fn interrupt_all(&self) -> usize {
        let all = std::mem::take(&mut self.state.borrow_mut().active);
        let count = all.len();
        for anim in all {
            debug!(id = anim.id.0, "animation interrupted");
            anim.finish_values();
            if let Some(completion) = anim.completion {
                completion(false);
            }
        }
        count
    }
}

impl Animator for Timeline {
    fn animate(
        &self,
        request: AnimationRequest,
        completion: Option<AnimationCompletion>,
    ) -> AnimationId {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            AnimationId(state.next_id)
        };
        let anim = ActiveAnimation {
            id,
            duration: request.duration,
            easing: request.easing,
            elapsed: Duration::ZERO,
            tracks: request.tracks.into_iter().map(ActiveTrack::capture).collect(),
            completion,
        };

        if anim.duration.is_zero() {
            trace!(id = id.0, "zero-length animation applied immediately");
            anim.finish_values();
            if let Some(completion) = anim.completion {
                completion(true);
            }
            return id;
        }

        trace!(
            id = id.0,
            duration_ms = anim.duration.as_millis() as u64,
            tracks = anim.tracks.len(),
            "animation scheduled"
        );
        self.state.borrow_mut().active.push(anim);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn linear_animation_interpolates() {
        let timeline = Timeline::new();
        let view = View::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        timeline.animate(
            AnimationRequest::new(ms(100))
                .easing(Easing::Linear)
                .track(Track::new(&view).frame(Rect::new(100.0, 0.0, 10.0, 10.0)).alpha(0.0)),
            None,
        );

        timeline.advance(ms(50));
        assert_eq!(view.frame().x(), 50.0);
        assert!((view.alpha() - 0.5).abs() < 1e-9);

        assert_eq!(timeline.advance(ms(50)), 1);
        assert_eq!(view.frame().x(), 100.0);
        assert_eq!(view.alpha(), 0.0);
        assert!(timeline.is_idle());
    }

    #[test]
    fn tick_advances_by_wall_clock() {
        let timeline = Timeline::new();
        let view = View::new(Rect::ZERO);
        timeline.animate(
            AnimationRequest::new(ms(5)).track(Track::new(&view).alpha(0.0)),
            None,
        );

        // First tick only records the reference instant.
        assert_eq!(timeline.tick(), 0);
        assert_eq!(view.alpha(), 1.0);

        std::thread::sleep(ms(20));
        assert_eq!(timeline.tick(), 1);
        assert_eq!(view.alpha(), 0.0);
        assert!(timeline.is_idle());
    }

    #[test]
    fn completion_reports_finished() {
        let timeline = Timeline::new();
        let view = View::new(Rect::ZERO);
        let result = Rc::new(Cell::new(None));
        let r = Rc::clone(&result);
        timeline.animate(
            AnimationRequest::new(ms(10)).track(Track::new(&view).alpha(0.0)),
            Some(Box::new(move |finished| r.set(Some(finished)))),
        );
        assert_eq!(result.get(), None);
        timeline.finish_all();
        assert_eq!(result.get(), Some(true));
    }

    #[test]
    fn zero_duration_completes_synchronously() {
        let timeline = Timeline::new();
        let view = View::new(Rect::ZERO);
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        timeline.animate(
            AnimationRequest::new(Duration::ZERO).track(Track::new(&view).alpha(0.25)),
            Some(Box::new(move |finished| d.set(finished))),
        );
        assert!(done.get());
        assert_eq!(view.alpha(), 0.25);
        assert!(timeline.is_idle());
    }

    #[test]
    fn interrupt_snaps_and_reports_unfinished() {
        let timeline = Timeline::new();
        let view = View::new(Rect::ZERO);
        let result = Rc::new(Cell::new(None));
        let r = Rc::clone(&result);
        let id = timeline.animate(
            AnimationRequest::new(ms(100)).track(Track::new(&view).frame(Rect::new(5.0, 5.0, 1.0, 1.0))),
            Some(Box::new(move |finished| r.set(Some(finished)))),
        );
        timeline.advance(ms(10));
        assert!(timeline.interrupt(id));
        assert_eq!(result.get(), Some(false));
        assert_eq!(view.frame(), Rect::new(5.0, 5.0, 1.0, 1.0));
        assert!(!timeline.interrupt(id));
    }

    #[test]
    #[tracing_test::traced_test]
    fn interruption_is_logged() {
        let timeline = Timeline::new();
        let view = View::new(Rect::ZERO);
        timeline.animate(
            AnimationRequest::new(ms(100)).track(Track::new(&view).alpha(0.0)),
            None,
        );
        assert_eq!(timeline.interrupt_all(), 1);
        assert!(logs_contain("animation interrupted"));
    }

    #[test]
    fn completion_may_schedule_more_work() {
        let timeline = Rc::new(Timeline::new());
        let view = View::new(Rect::ZERO);
        let t = Rc::clone(&timeline);
        let v = view.clone();
        timeline.animate(
            AnimationRequest::new(ms(10)).track(Track::new(&view).alpha(0.0)),
            Some(Box::new(move |_| {
                t.animate(
                    AnimationRequest::new(ms(10)).track(Track::new(&v).alpha(1.0)),
                    None,
                );
            })),
        );
        assert_eq!(timeline.finish_all(), 2);
        assert_eq!(view.alpha(), 1.0);
    }

    #[test]
    fn dropped_view_is_skipped() {
        let timeline = Timeline::new();
        {
            let view = View::new(Rect::ZERO);
            timeline.animate(
                AnimationRequest::new(ms(10)).track(Track::new(&view).alpha(0.0)),
                None,
            );
        }
        assert_eq!(timeline.finish_all(), 1);
    }

    proptest! {
        #[test]
        fn easing_stays_in_unit_range(t in 0.0f64..=1.0) {
            for easing in [Easing::Linear, Easing::EaseInOut] {
                let v = easing.apply(t);
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }
}
