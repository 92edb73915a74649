#![forbid(unsafe_code)]

//! The host screen stack.

use crate::screen::{Screen, Window};

/// Called once a presentation or dismissal has finished.
pub type Completion = Box<dyn FnOnce()>;

/// Operations the host toolkit provides for modal presentation.
///
/// The host owns presented screens for as long as they are on screen and
/// runs custom transitions through each screen's transitioning delegate.
pub trait PresentationHost {
    /// Present `presented` modally over `presenting`.
    fn present(
        &self,
        presenting: &Screen,
        presented: Screen,
        animated: bool,
        completion: Option<Completion>,
    );

    /// Dismiss the screen presented by `screen`, or `screen` itself when it
    /// presents nothing and was itself presented.
    fn dismiss(&self, screen: &Screen, animated: bool, completion: Option<Completion>);

    /// The window currently receiving input.
    fn key_window(&self) -> Option<Window>;
}
