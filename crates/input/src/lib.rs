//! Control input: panel clicks and keyboard shortcuts mapped to shared actions.
//!
//! # Invariants
//! - Panel buttons and shortcuts produce the same `Action` values.
//! - Shape selections only ever name catalog ids.

pub mod action;
pub mod shortcuts;

pub use action::Action;
pub use shortcuts::action_for_key;
