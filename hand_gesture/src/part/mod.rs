//! Detectors, the atomic building blocks of a gesture.
//!
//! A [`GesturePart`] watches exactly one hand slot of a step.  Static-pose
//! parts ([`pose`]) test thresholds on the current frame, some of them with
//! monotonic-progress memory; dynamic-motion parts ([`motion`]) run a small
//! phase machine over successive positions.
//!
//! Contract shared by every part:
//!
//! * `init` clears all progress and may be called at any time.
//! * `is_recognized` never panics on missing data; an absent hand is simply
//!   `false`.
//! * A `false` answer keeps accumulated state unless the part defines a
//!   permanent failure (see [`pose::PalmPinching`]).

use std::fmt::Debug;

use crate::frame::Frame;

pub mod pose;
pub mod motion;

pub use pose::{GrabReady, Grabbing, PalmClosed, PalmFlat, PalmOpen, PalmPinching, PalmRotating};
pub use motion::{Brace, Climb, Landmark, Stroke, StrokePhase};

/// Stateful predicate over successive frames for one hand.
pub trait GesturePart: Send + Debug {
    /// Clear all internal progress.
    fn init(&mut self);

    /// Feed one frame and report whether the condition currently holds.
    fn is_recognized(&mut self, frame: &Frame) -> bool;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
