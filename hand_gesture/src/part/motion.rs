//! Dynamic-motion detectors: short strokes and staged hand travel.
//!
//! Motion parts compare the current sample with remembered positions, so
//! they are sensitive to frame order.  Feed them every frame, in order.

use tracing::debug;

use crate::frame::{dot, Finger, Frame, HandSample, HandSelector, Side, Vec3};
use super::GesturePart;

/// Travel (sensor units) a stroke must cover out and back.
pub const STROKE_TRAVEL: f32 = 30.0;
/// Rise (sensor units) a climbing hand must cover.
pub const CLIMB_TRAVEL: f32 = 50.0;
/// Height drift (sensor units) below which a hand counts as still.
pub const STILL_TOLERANCE: f32 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// Stroke: out-and-back motion along one axis
// ════════════════════════════════════════════════════════════════════════════

/// Phase of a [`Stroke`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokePhase {
    /// Waiting for the landmark to start moving outward.
    Poised,
    /// Moving outward; waiting for enough travel and a turn back.
    Outbound,
    /// Coming back; waiting for enough return travel.
    Returning,
    /// Stroke complete.
    Done,
}

/// Which point of the hand a motion part follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Landmark {
    Palm,
    Tip(Finger),
}

impl Landmark {
    fn locate(self, hand: &HandSample) -> Option<Vec3> {
        match self {
            Landmark::Palm        => Some(hand.palm_position),
            Landmark::Tip(finger) => hand.finger_tip(finger),
        }
    }
}

/// An out-and-back stroke, e.g. a hammer blow or a scratch.
///
/// Positions are projected on `axis`, which points in the outbound
/// direction.  Every sample becomes the new "previous" reference whatever
/// the phase, so turns are always judged against the immediately preceding
/// sample.  The first sample after `init` only seeds that reference.
#[derive(Clone, Debug)]
pub struct Stroke {
    name:     &'static str,
    hand:     HandSelector,
    landmark: Landmark,
    axis:     Vec3,
    phase:    StrokePhase,
    previous: Option<f32>,
    /// Projection of the last turning point (start of the current leg).
    extreme:  f32,
}

impl Stroke {
    pub fn new(hand: impl Into<HandSelector>, landmark: Landmark, axis: Vec3) -> Self {
        Stroke {
            name: "stroke",
            hand: hand.into(),
            landmark,
            axis,
            phase: StrokePhase::Poised,
            previous: None,
            extreme: 0.0,
        }
    }

    /// Index finger strikes down and comes back up.
    pub fn hammer(hand: impl Into<HandSelector>) -> Self {
        Stroke { name: "hammer", ..Stroke::new(hand, Landmark::Tip(Finger::Index), [0.0, -1.0, 0.0]) }
    }

    /// Palm sweeps towards -X and comes back.
    pub fn scratch(hand: impl Into<HandSelector>) -> Self {
        Stroke { name: "scratch", ..Stroke::new(hand, Landmark::Palm, [-1.0, 0.0, 0.0]) }
    }

    pub fn phase(&self) -> StrokePhase {
        self.phase
    }

    /// Transition table.  `None` means stay in the current phase.
    fn next_phase(&self, previous: f32, current: f32) -> Option<StrokePhase> {
        let outward = current > previous;
        let inward  = current < previous;
        match self.phase {
            StrokePhase::Poised if outward => Some(StrokePhase::Outbound),
            StrokePhase::Outbound
                if current - self.extreme > STROKE_TRAVEL && inward => Some(StrokePhase::Returning),
            StrokePhase::Returning
                if self.extreme - current > STROKE_TRAVEL => Some(StrokePhase::Done),
            _ => None,
        }
    }
}

impl GesturePart for Stroke {
    fn init(&mut self) {
        self.phase = StrokePhase::Poised;
        self.previous = None;
        self.extreme = 0.0;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        if self.phase == StrokePhase::Done {
            return true;
        }
        let Some(point) = frame.hand(self.hand).and_then(|h| self.landmark.locate(h)) else {
            return false;
        };
        let current = dot(point, self.axis);

        if let Some(previous) = self.previous {
            if let Some(next) = self.next_phase(previous, current) {
                debug!(part = self.name, hand = ?self.hand, from = ?self.phase, to = ?next, "stroke phase");
                self.phase = next;
                self.extreme = previous;
            }
        }
        self.previous = Some(current);

        self.phase == StrokePhase::Done
    }

    fn name(&self) -> &'static str { self.name }
}

// ════════════════════════════════════════════════════════════════════════════
// Stairs: one hand climbs while the other holds still
// ════════════════════════════════════════════════════════════════════════════

/// The moving hand of a stairs step: palm rises more than [`CLIMB_TRAVEL`]
/// above where it was when the step began.
#[derive(Clone, Debug)]
pub struct Climb {
    side:     Side,
    baseline: Option<f32>,
}

impl Climb {
    pub fn new(side: Side) -> Self {
        Climb { side, baseline: None }
    }
}

impl GesturePart for Climb {
    fn init(&mut self) {
        self.baseline = None;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        let Some(hand) = frame.side(self.side) else { return false };
        let height = hand.palm_position[1];
        match self.baseline {
            None => {
                self.baseline = Some(height);
                false
            }
            Some(base) => height - base > CLIMB_TRAVEL,
        }
    }

    fn name(&self) -> &'static str { "climb" }
}

/// The static hand of a stairs step.
///
/// Until `partner` starts moving, this hand may still be settling from the
/// previous step, so its anchor follows it.  Once the partner has moved, the
/// hand must stay within [`STILL_TOLERANCE`] of that anchor.
#[derive(Clone, Debug)]
pub struct Brace {
    side:          Side,
    partner:       Side,
    anchor:        Option<f32>,
    partner_start: Option<f32>,
}

impl Brace {
    pub fn new(side: Side, partner: Side) -> Self {
        Brace { side, partner, anchor: None, partner_start: None }
    }
}

impl GesturePart for Brace {
    fn init(&mut self) {
        self.anchor = None;
        self.partner_start = None;
    }

    fn is_recognized(&mut self, frame: &Frame) -> bool {
        let (Some(own), Some(partner)) = (frame.side(self.side), frame.side(self.partner)) else {
            return false;
        };
        let own_y = own.palm_position[1];
        let partner_y = partner.palm_position[1];

        let (Some(anchor), Some(partner_start)) = (self.anchor, self.partner_start) else {
            self.anchor = Some(own_y);
            self.partner_start = Some(partner_y);
            return false;
        };

        if (partner_y - partner_start).abs() < STILL_TOLERANCE {
            self.anchor = Some(own_y);
            return true;
        }
        (own_y - anchor).abs() < STILL_TOLERANCE
    }

    fn name(&self) -> &'static str { "brace" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
