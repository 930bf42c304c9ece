//! # hand_gesture
//!
//! Recognition of short, multi-hand temporal gestures from a stream of
//! hand-pose frames (LeapMotion style samples).
//!
//! A gesture is built from three layers:
//!
//! | Layer | Type | Role |
//! |---|---|---|
//! | Detector | [`GesturePart`] | Stateful predicate over successive frames for one hand |
//! | Step | [`Step`] | One detector per hand slot; satisfied only when all agree on the same frame |
//! | Gesture | [`Gesture`] | Ordered steps plus a monotonic progress counter |
//!
//! A [`GestureCatalog`] maps identifiers to pre-built gestures together with
//! their attempt duration and illustration, and hands out one
//! [`RecognitionSession`] at a time per gesture.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use hand_gesture::{Frame, GestureCatalog, HandSample, Side};
//!
//! let catalog = GestureCatalog::standard().unwrap();
//! let start = Instant::now();
//! let mut session = catalog.session_at("PINCH1", start).unwrap();
//!
//! for strength in [0.0, 0.5, 0.9] {
//!     let frame = Frame::new(vec![
//!         HandSample::new(Side::Left).with_pinch(strength),
//!         HandSample::new(Side::Right).with_pinch(strength),
//!     ]);
//!     session.offer(&frame, start);
//! }
//!
//! assert!(session.finish().recognized);
//! ```

pub mod frame;
pub mod part;
pub mod gesture;
pub mod catalog;
pub mod session;

pub use frame::{Finger, Frame, HandSample, HandSelector, Side, Vec3};
pub use part::GesturePart;
pub use gesture::{Gesture, Step};
pub use catalog::{CatalogEntry, CatalogSession, GestureCatalog};
pub use session::{RecognitionSession, Verdict};

// ════════════════════════════════════════════════════════════════════════════
// Error
// ════════════════════════════════════════════════════════════════════════════

/// Errors raised while building gestures or looking them up.
///
/// Recognition itself never fails: missing or partial hand data resolves to
/// "not recognized".
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown gesture \"{0}\"")]
    UnknownGesture(String),

    #[error("gesture \"{0}\" already has an attempt in progress")]
    GestureBusy(String),

    #[error("gesture \"{0}\" is registered twice")]
    DuplicateGesture(String),

    #[error("a gesture needs at least one step")]
    NoSteps,

    #[error("step {0} has no hand slots")]
    EmptyStep(usize),

    #[error("step {step} has {found} hand slots, expected {expected}")]
    RaggedStep { step: usize, expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
