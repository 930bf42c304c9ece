//! Hand-pose frames as delivered by the sensor.
//!
//! A [`Frame`] is one instant's snapshot of every tracked hand.  Positions are
//! in sensor units (millimetres for LeapMotion), normals and directions are
//! unit vectors, strengths are normalised to `0.0..=1.0`.

use serde::{Deserialize, Serialize};

pub type Vec3 = [f32; 3];

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

// ════════════════════════════════════════════════════════════════════════════
// Side / HandSelector / Finger
// ════════════════════════════════════════════════════════════════════════════

/// Which hand a sample belongs to, as tagged by the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left  => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left  => "left",
            Side::Right => "right",
        }
    }
}

/// How a detector picks its hand out of a frame.
///
/// `Any` takes the first tracked hand.  The sensor does not promise a stable
/// hand order across frames, so `Any` is only reliable for one-hand gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandSelector {
    Left,
    Right,
    Any,
}

impl From<Side> for HandSelector {
    fn from(side: Side) -> Self {
        match side {
            Side::Left  => HandSelector::Left,
            Side::Right => HandSelector::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub fn index(self) -> usize {
        self as usize
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// Per-hand measurement bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub side:           Side,
    pub palm_position:  Vec3,
    pub palm_normal:    Vec3,
    /// Direction from the palm towards the fingers.
    pub direction:      Vec3,
    /// 0.0 = open hand, 1.0 = thumb and finger touching.
    pub pinch_strength: f32,
    /// 0.0 = open hand, 1.0 = fist.
    pub grab_strength:  f32,
    /// Tip positions ordered thumb → pinky.  May be shorter than five.
    #[serde(default)]
    pub finger_tips:    Vec<Vec3>,
}

impl HandSample {
    /// A relaxed hand hovering 200 units above the sensor, palm facing down.
    pub fn new(side: Side) -> Self {
        HandSample {
            side,
            palm_position:  [0.0, 200.0, 0.0],
            palm_normal:    [0.0, -1.0, 0.0],
            direction:      [0.0, 0.0, -1.0],
            pinch_strength: 0.0,
            grab_strength:  0.0,
            finger_tips:    Vec::new(),
        }
    }

    pub fn with_pinch(mut self, strength: f32) -> Self {
        self.pinch_strength = strength;
        self
    }

    pub fn with_grab(mut self, strength: f32) -> Self {
        self.grab_strength = strength;
        self
    }

    pub fn with_palm_position(mut self, position: Vec3) -> Self {
        self.palm_position = position;
        self
    }

    pub fn with_palm_normal(mut self, normal: Vec3) -> Self {
        self.palm_normal = normal;
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    /// Set one finger tip, padding earlier fingers with the palm position.
    pub fn with_finger_tip(mut self, finger: Finger, position: Vec3) -> Self {
        let i = finger.index();
        if self.finger_tips.len() <= i {
            self.finger_tips.resize(i + 1, self.palm_position);
        }
        self.finger_tips[i] = position;
        self
    }

    pub fn finger_tip(&self, finger: Finger) -> Option<Vec3> {
        self.finger_tips.get(finger.index()).copied()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One timestamped snapshot of all currently tracked hands.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub id:           u64,
    /// Sensor clock in microseconds.  Only used for replay pacing.
    #[serde(default)]
    pub timestamp_us: u64,
    #[serde(default)]
    pub hands:        Vec<HandSample>,
}

impl Frame {
    pub fn new(hands: Vec<HandSample>) -> Self {
        Frame { id: 0, timestamp_us: 0, hands }
    }

    pub fn empty() -> Self {
        Frame::default()
    }

    pub fn with_timestamp(mut self, id: u64, timestamp_us: u64) -> Self {
        self.id = id;
        self.timestamp_us = timestamp_us;
        self
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    /// Resolve a selector to a hand sample, if that hand is tracked.
    pub fn hand(&self, selector: HandSelector) -> Option<&HandSample> {
        match selector {
            HandSelector::Any   => self.hands.first(),
            HandSelector::Left  => self.hands.iter().find(|h| h.side == Side::Left),
            HandSelector::Right => self.hands.iter().find(|h| h.side == Side::Right),
        }
    }

    pub fn side(&self, side: Side) -> Option<&HandSample> {
        self.hand(side.into())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
