//! Synchronized multi-hand step sequences.
//!
//! A [`Gesture`] is an ordered list of [`Step`]s.  Each step holds one
//! detector per hand slot and is satisfied only when every slot reports
//! `true` on the same frame.  Progress moves `i → i + 1` one step per frame
//! at most, never backwards, and the gesture is recognized when the last
//! step has been passed.
//!
//! Detectors are stateful, so a hand that reached its pose early keeps
//! reporting `true` while it waits for the other hand.  Detectors of steps
//! not yet reached never see a frame.

use tracing::{debug, trace};

use crate::frame::Frame;
use crate::part::GesturePart;
use crate::{Error, Result};

// ════════════════════════════════════════════════════════════════════════════
// Step
// ════════════════════════════════════════════════════════════════════════════

/// One synchronization point: a detector per participating hand.
#[derive(Debug)]
pub struct Step {
    parts: Vec<Box<dyn GesturePart>>,
}

impl Step {
    pub fn new(parts: Vec<Box<dyn GesturePart>>) -> Self {
        Step { parts }
    }

    /// Step with a single hand slot.
    pub fn single(part: impl GesturePart + 'static) -> Self {
        Step { parts: vec![Box::new(part)] }
    }

    /// Step with a left slot followed by a right slot.
    pub fn pair(left: impl GesturePart + 'static, right: impl GesturePart + 'static) -> Self {
        Step { parts: vec![Box::new(left), Box::new(right)] }
    }

    pub fn width(&self) -> usize {
        self.parts.len()
    }

    fn init(&mut self) {
        self.parts.iter_mut().for_each(|p| p.init());
    }

    /// Every slot sees the frame, even after one has already failed, so
    /// order-sensitive detectors never miss a sample.
    fn is_satisfied(&mut self, frame: &Frame) -> bool {
        self.parts
            .iter_mut()
            .fold(true, |all, part| part.is_recognized(frame) && all)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// An ordered, hand-synchronized sequence of steps with monotonic progress.
///
/// One attempt at a time: `init`, then `check` per frame, then the
/// consuming [`is_recognized`](Gesture::is_recognized) read.
#[derive(Debug)]
pub struct Gesture {
    steps:      Vec<Step>,
    hand_count: usize,
    progress:   usize,
    recognized: bool,
}

impl Gesture {
    /// Build a gesture.  All steps must have the same, non-zero width; that
    /// width is the number of hands a frame must carry to be considered.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let hand_count = steps.first().ok_or(Error::NoSteps)?.width();
        for (i, step) in steps.iter().enumerate() {
            if step.width() == 0 {
                return Err(Error::EmptyStep(i));
            }
            if step.width() != hand_count {
                return Err(Error::RaggedStep { step: i, expected: hand_count, found: step.width() });
            }
        }
        let mut gesture = Gesture { steps, hand_count, progress: 0, recognized: false };
        gesture.init();
        Ok(gesture)
    }

    /// Reset progress and every detector of every step.
    pub fn init(&mut self) {
        self.progress = 0;
        self.recognized = false;
        self.steps.iter_mut().for_each(Step::init);
    }

    /// Consume one frame, possibly advancing by one step.
    pub fn check(&mut self, frame: &Frame) {
        if frame.hand_count() != self.hand_count {
            trace!(expected = self.hand_count, found = frame.hand_count(), "hand count mismatch, frame skipped");
            return;
        }
        if self.progress == self.steps.len() {
            return;
        }

        if self.steps[self.progress].is_satisfied(frame) {
            self.progress += 1;
            debug!(progress = self.progress, total = self.steps.len(), frame = frame.id, "step passed");
        }
        self.recognized = self.progress == self.steps.len();
    }

    /// Consuming read: return the verdict, then reset for the next attempt.
    pub fn is_recognized(&mut self) -> bool {
        let recognized = self.recognized;
        self.init();
        recognized
    }

    /// Non-consuming view of the current verdict.
    pub fn peek_recognized(&self) -> bool {
        self.recognized
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn expected_hand_count(&self) -> usize {
        self.hand_count
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
