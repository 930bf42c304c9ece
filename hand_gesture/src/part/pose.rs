//! Static-pose detectors: thresholds on pinch/grab strength and palm
//! orientation, some with monotonic-progress memory.

use tracing::{debug, trace};

use crate::frame::{dot, Frame, HandSelector, Vec3};
use super::GesturePart;

/// Pinch strength at or below which a hand counts as open.
pub const OPEN_PINCH_MAX: f32 = 0.2;
/// Pinch strength at or above which a hand counts as pinched.
pub const CLOSED_PINCH_MIN: f32 = 0.8;
/// Palm-normal projection a flat or fully rotated palm must pass.
pub const FLAT_PALM: f32 = 0.8;
/// Per-frame regression allowed while a palm rotates.
pub const ROTATION_TOLERANCE: f32 = 0.1;
/// Grab strength of a closed fist.
pub const FIST_GRAB: f32 = 1.0;
/// Grab strength slack for the start pose, the per-frame regression and the end pose.
pub const GRAB_TOLERANCE: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Pinch family
// ════════════════════════════════════════════════════════════════════════════

/// Hand open: pinch strength ≤ [`OPEN_PINCH_MAX`].
#[derive(Clone, Debug)]
pub struct PalmOpen {
    hand: HandSelector,
}

impl PalmOpen {
    pub fn new(hand: impl Into<HandSelector>) -> Self {
        PalmOpen { hand: hand.into() }
    }
}

impl GesturePart for PalmOpen {
    fn init(&mut self) {}

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        frame.hand(self.hand)
            .map_or(false, |h| h.pinch_strength <= OPEN_PINCH_MAX)
    }

    fn name(&self) -> &'static str { "palm-open" }
}

/// Pinch in progress.
///
/// The strength must never loosen: the best value seen below
/// [`CLOSED_PINCH_MIN`] is remembered, and a sample below it means the hand
/// opened again.  That sample reports `false`, and so does every later one
/// until [`init`](GesturePart::init).  Any other sample reports `true`, even
/// a hand that has not started closing yet.
#[derive(Clone, Debug)]
pub struct PalmPinching {
    hand:         HandSelector,
    best:         f32,
    opened_again: bool,
}

impl PalmPinching {
    pub fn new(hand: impl Into<HandSelector>) -> Self {
        PalmPinching { hand: hand.into(), best: 0.0, opened_again: false }
    }

    pub fn has_opened_again(&self) -> bool {
        self.opened_again
    }
}

impl GesturePart for PalmPinching {
    fn init(&mut self) {
        self.best = 0.0;
        self.opened_again = false;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        if self.opened_again {
            return false;
        }
        let Some(hand) = frame.hand(self.hand) else { return false };
        let strength = hand.pinch_strength;

        if strength < self.best {
            self.opened_again = true;
            debug!(hand = ?self.hand, best = self.best, strength, "pinch opened again");
            return false;
        }
        if strength < CLOSED_PINCH_MIN {
            self.best = strength;
        }
        true
    }

    fn name(&self) -> &'static str { "palm-pinching" }
}

/// Hand pinched: pinch strength ≥ [`CLOSED_PINCH_MIN`].
#[derive(Clone, Debug)]
pub struct PalmClosed {
    hand: HandSelector,
}

impl PalmClosed {
    pub fn new(hand: impl Into<HandSelector>) -> Self {
        PalmClosed { hand: hand.into() }
    }
}

impl GesturePart for PalmClosed {
    fn init(&mut self) {}

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        frame.hand(self.hand)
            .map_or(false, |h| h.pinch_strength >= CLOSED_PINCH_MIN)
    }

    fn name(&self) -> &'static str { "palm-closed" }
}

// ════════════════════════════════════════════════════════════════════════════
// Rotation family
// ════════════════════════════════════════════════════════════════════════════

/// Palm flat against `axis`: the normal's projection on `axis` is below
/// `-FLAT_PALM`.  With `axis = +Y` that is a palm facing the floor.
#[derive(Clone, Debug)]
pub struct PalmFlat {
    hand: HandSelector,
    axis: Vec3,
}

impl PalmFlat {
    pub fn new(hand: impl Into<HandSelector>, axis: Vec3) -> Self {
        PalmFlat { hand: hand.into(), axis }
    }
}

impl GesturePart for PalmFlat {
    fn init(&mut self) {}

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        frame.hand(self.hand)
            .map_or(false, |h| dot(h.palm_normal, self.axis) < -FLAT_PALM)
    }

    fn name(&self) -> &'static str { "palm-flat" }
}

/// Palm turning over until its normal points along `axis`.
///
/// The projection may dip by at most [`ROTATION_TOLERANCE`] below the best
/// projection seen; a larger dip reports `false` for that sample without
/// moving the best.  The hand must not be a fist.
#[derive(Clone, Debug)]
pub struct PalmRotating {
    hand: HandSelector,
    axis: Vec3,
    best: f32,
}

impl PalmRotating {
    pub fn new(hand: impl Into<HandSelector>, axis: Vec3) -> Self {
        PalmRotating { hand: hand.into(), axis, best: -1.0 }
    }
}

impl GesturePart for PalmRotating {
    fn init(&mut self) {
        self.best = -1.0;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        let Some(hand) = frame.hand(self.hand) else { return false };
        let projection = dot(hand.palm_normal, self.axis);

        if projection < self.best - ROTATION_TOLERANCE {
            trace!(hand = ?self.hand, best = self.best, projection, "palm turning backward");
            return false;
        }
        self.best = self.best.max(projection);

        projection >= FLAT_PALM && hand.grab_strength < FIST_GRAB
    }

    fn name(&self) -> &'static str { "palm-rotating" }
}

// ════════════════════════════════════════════════════════════════════════════
// Grab family
// ════════════════════════════════════════════════════════════════════════════

fn grab_progress(grab_strength: f32, closing: bool) -> f32 {
    if closing { grab_strength } else { 1.0 - grab_strength }
}

/// Start pose of a grab (`closing`) or release: the hand is fully open, or
/// fully closed for a release.
#[derive(Clone, Debug)]
pub struct GrabReady {
    hand:    HandSelector,
    closing: bool,
}

impl GrabReady {
    pub fn new(hand: impl Into<HandSelector>, closing: bool) -> Self {
        GrabReady { hand: hand.into(), closing }
    }
}

impl GesturePart for GrabReady {
    fn init(&mut self) {}

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        frame.hand(self.hand)
            .map_or(false, |h| grab_progress(h.grab_strength, self.closing) <= GRAB_TOLERANCE)
    }

    fn name(&self) -> &'static str { "grab-ready" }
}

/// Grab (or release) in progress, finishing at the opposite extreme.
#[derive(Clone, Debug)]
pub struct Grabbing {
    hand:    HandSelector,
    closing: bool,
    best:    f32,
}

impl Grabbing {
    pub fn new(hand: impl Into<HandSelector>, closing: bool) -> Self {
        Grabbing { hand: hand.into(), closing, best: 0.0 }
    }
}

impl GesturePart for Grabbing {
    fn init(&mut self) {
        self.best = 0.0;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        let Some(hand) = frame.hand(self.hand) else { return false };
        let progress = grab_progress(hand.grab_strength, self.closing);

        if progress < self.best - GRAB_TOLERANCE {
            trace!(hand = ?self.hand, best = self.best, progress, "grab loosening");
            return false;
        }
        self.best = self.best.max(progress);

        progress >= 1.0 - GRAB_TOLERANCE
    }

    fn name(&self) -> &'static str { "grabbing" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{HandSample, Side};

    fn left_pinch(strength: f32) -> Frame {
        Frame::new(vec![HandSample::new(Side::Left).with_pinch(strength)])
    }

    fn left_normal(normal: Vec3, grab: f32) -> Frame {
        Frame::new(vec![HandSample::new(Side::Left).with_palm_normal(normal).with_grab(grab)])
    }

    #[test]
    fn open_palm_threshold() {
        let mut part = PalmOpen::new(HandSelector::Any);
        assert!(part.is_recognized(&left_pinch(0.1)));
        assert!(part.is_recognized(&left_pinch(0.2)));
        assert!(!part.is_recognized(&left_pinch(0.5)));
    }

    #[test]
    fn absent_hand_is_not_recognized() {
        let empty = Frame::empty();
        assert!(!PalmOpen::new(Side::Right).is_recognized(&left_pinch(0.0)));
        assert!(!PalmClosed::new(HandSelector::Any).is_recognized(&empty));
        assert!(!PalmPinching::new(HandSelector::Any).is_recognized(&empty));
        assert!(!PalmRotating::new(HandSelector::Any, [0.0, 1.0, 0.0]).is_recognized(&empty));
        assert!(!Grabbing::new(HandSelector::Any, true).is_recognized(&empty));
    }

    #[test]
    fn closed_palm_threshold() {
        let mut part = PalmClosed::new(Side::Left);
        assert!(!part.is_recognized(&left_pinch(0.79)));
        assert!(part.is_recognized(&left_pinch(0.8)));
    }

    #[test]
    fn pinching_reports_while_not_loosening() {
        let mut part = PalmPinching::new(Side::Left);
        assert!(part.is_recognized(&left_pinch(0.0)));
        assert!(part.is_recognized(&left_pinch(0.1)));
        assert!(part.is_recognized(&left_pinch(0.1)));
        assert!(part.is_recognized(&left_pinch(0.5)));
        assert!(part.is_recognized(&left_pinch(0.5)));
        assert!(part.is_recognized(&left_pinch(0.9)));
    }

    #[test]
    fn pinching_opened_again_is_permanent() {
        let mut part = PalmPinching::new(Side::Left);
        assert!(part.is_recognized(&left_pinch(0.6)));
        assert!(!part.is_recognized(&left_pinch(0.4)));
        assert!(part.has_opened_again());
        assert!(!part.is_recognized(&left_pinch(0.9)));
        assert!(!part.is_recognized(&left_pinch(1.0)));

        part.init();
        assert!(!part.has_opened_again());
        assert!(part.is_recognized(&left_pinch(0.9)));
    }

    #[test]
    fn pinching_missing_hand_keeps_state() {
        let mut part = PalmPinching::new(Side::Left);
        assert!(part.is_recognized(&left_pinch(0.5)));
        assert!(!part.is_recognized(&Frame::empty()));
        assert!(!part.has_opened_again());
        assert!(part.is_recognized(&left_pinch(0.6)));
    }

    #[test]
    fn pinching_above_closed_does_not_raise_best() {
        let mut part = PalmPinching::new(Side::Left);
        assert!(part.is_recognized(&left_pinch(0.95)));
        // Relaxing inside the pinched band is not an opening.
        assert!(part.is_recognized(&left_pinch(0.85)));
        assert!(!part.has_opened_again());
    }

    #[test]
    fn flat_palm_along_axis() {
        let mut down = PalmFlat::new(Side::Left, [0.0, 1.0, 0.0]);
        assert!(down.is_recognized(&left_normal([0.0, -0.9, 0.1], 0.0)));
        assert!(!down.is_recognized(&left_normal([0.0, -0.7, 0.7], 0.0)));

        let mut up = PalmFlat::new(Side::Left, [0.0, -1.0, 0.0]);
        assert!(up.is_recognized(&left_normal([0.0, 0.95, 0.0], 0.0)));
    }

    #[test]
    fn rotation_progresses_to_flipped_palm() {
        let mut part = PalmRotating::new(Side::Left, [0.0, 1.0, 0.0]);
        assert!(!part.is_recognized(&left_normal([0.0, -0.9, 0.0], 0.0)));
        assert!(!part.is_recognized(&left_normal([1.0, 0.0, 0.0], 0.0)));
        assert!(part.is_recognized(&left_normal([0.0, 0.9, 0.0], 0.0)));
    }

    #[test]
    fn rotation_tolerates_small_regression_only() {
        let mut part = PalmRotating::new(Side::Left, [0.0, 1.0, 0.0]);
        assert!(!part.is_recognized(&left_normal([0.0, 0.5, 0.0], 0.0)));
        // 0.45 is within tolerance of 0.5
        assert!(!part.is_recognized(&left_normal([0.0, 0.45, 0.0], 0.0)));
        assert!(part.is_recognized(&left_normal([0.0, 0.85, 0.0], 0.0)));
        // Dip of 0.3 below best 0.85 fails this sample.
        assert!(!part.is_recognized(&left_normal([0.0, 0.55, 0.0], 0.0)));
        assert!(part.is_recognized(&left_normal([0.0, 0.9, 0.0], 0.0)));
    }

    #[test]
    fn rotation_rejects_fist() {
        let mut part = PalmRotating::new(Side::Left, [0.0, 1.0, 0.0]);
        assert!(!part.is_recognized(&left_normal([0.0, 1.0, 0.0], 1.0)));
        assert!(part.is_recognized(&left_normal([0.0, 1.0, 0.0], 0.5)));
    }

    #[test]
    fn grab_and_release() {
        let grab = |g: f32| Frame::new(vec![HandSample::new(Side::Right).with_grab(g)]);

        let mut ready = GrabReady::new(HandSelector::Any, true);
        assert!(ready.is_recognized(&grab(0.02)));
        assert!(!ready.is_recognized(&grab(0.3)));

        let mut closing = Grabbing::new(HandSelector::Any, true);
        assert!(!closing.is_recognized(&grab(0.5)));
        assert!(!closing.is_recognized(&grab(0.3)));
        assert!(closing.is_recognized(&grab(0.97)));

        let mut release_ready = GrabReady::new(HandSelector::Any, false);
        assert!(release_ready.is_recognized(&grab(1.0)));
        let mut opening = Grabbing::new(HandSelector::Any, false);
        assert!(!opening.is_recognized(&grab(0.6)));
        assert!(opening.is_recognized(&grab(0.0)));
    }
}
