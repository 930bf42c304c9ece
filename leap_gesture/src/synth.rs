//! Scripted frame sequences for every catalog gesture.
//!
//! These stand in for a performer when no hardware is attached: the `demo`
//! and `record` commands replay them, and the tests use them to exercise the
//! whole pipeline.  Frames are spaced [`FRAME_INTERVAL_US`] apart.
//!
//! An [`Outcome::Incomplete`] script is the first half of the complete one,
//! which always stops short of the final step.

use hand_gesture::{Finger, Frame, HandSample, Side};

/// 100 Hz, the LeapMotion's usual tracking rate.
pub const FRAME_INTERVAL_US: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Incomplete,
}

/// Frames performing `id`, or `None` for an unknown gesture.
pub fn script(id: &str, outcome: Outcome) -> Option<Vec<Frame>> {
    let hands = match id {
        "HAMMER1"           => hammer(1),
        "HAMMER3"           => hammer(3),
        "GRAB"              => grab(true),
        "UNGRAB"            => grab(false),
        "ROTATION"          => rotation(1.0),
        "REVERSED_ROTATION" => rotation(-1.0),
        "STAIRS"            => stairs(),
        "SCRATCH"           => scratch(3),
        "PINCH1"            => pinch(1),
        "PINCH3"            => pinch(3),
        _                   => return None,
    };
    let keep = match outcome {
        Outcome::Complete   => hands.len(),
        Outcome::Incomplete => hands.len() / 2,
    };
    Some(
        hands.into_iter()
            .take(keep)
            .enumerate()
            .map(|(i, hands)| Frame::new(hands).with_timestamp(i as u64, i as u64 * FRAME_INTERVAL_US))
            .collect(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Per-gesture choreography, one Vec<HandSample> per frame
// ════════════════════════════════════════════════════════════════════════════

const LEFT_X:  f32 = -100.0;
const RIGHT_X: f32 = 100.0;

fn both(make: impl Fn(Side, f32) -> HandSample) -> Vec<HandSample> {
    vec![make(Side::Left, LEFT_X), make(Side::Right, RIGHT_X)]
}

fn pinch(repeats: usize) -> Vec<Vec<HandSample>> {
    const STRENGTHS: [f32; 6] = [0.0, 0.1, 0.4, 0.6, 0.9, 0.95];
    (0..repeats)
        .flat_map(|_| STRENGTHS)
        .map(|s| both(|side, _| HandSample::new(side).with_pinch(s)))
        .collect()
}

fn hammer(strikes: usize) -> Vec<Vec<HandSample>> {
    const TIP_HEIGHTS: [f32; 8] = [200.0, 190.0, 170.0, 150.0, 155.0, 170.0, 190.0, 200.0];
    (0..strikes)
        .flat_map(|_| TIP_HEIGHTS)
        .map(|y| {
            both(|side, x| {
                HandSample::new(side)
                    .with_palm_position([x, y + 40.0, 0.0])
                    .with_finger_tip(Finger::Index, [x, y, -20.0])
            })
        })
        .collect()
}

fn scratch(count: usize) -> Vec<Vec<HandSample>> {
    const PALM_X: [f32; 5] = [0.0, -10.0, -40.0, -35.0, 0.0];
    (0..count)
        .flat_map(|_| PALM_X)
        .map(|x| vec![HandSample::new(Side::Right).with_palm_position([x, 200.0, 0.0])])
        .collect()
}

fn grab(closing: bool) -> Vec<Vec<HandSample>> {
    const CLOSING: [f32; 5] = [0.0, 0.3, 0.6, 0.9, 1.0];
    CLOSING
        .iter()
        .map(|&g| if closing { g } else { 1.0 - g })
        .map(|g| vec![HandSample::new(Side::Right).with_grab(g)])
        .collect()
}

/// `turn = 1.0` turns palms from down to up, `-1.0` the reverse.
fn rotation(turn: f32) -> Vec<Vec<HandSample>> {
    const NORMAL_Y: [f32; 7] = [-1.0, -0.6, -0.2, 0.3, 0.7, 0.95, 1.0];
    NORMAL_Y
        .iter()
        .map(|&y| {
            let y = y * turn;
            let normal = [(1.0 - y * y).max(0.0).sqrt(), y, 0.0];
            both(|side, x| {
                HandSample::new(side)
                    .with_palm_position([x, 200.0, 0.0])
                    .with_palm_normal(normal)
            })
        })
        .collect()
}

fn stairs() -> Vec<Vec<HandSample>> {
    const HEIGHTS: [(f32, f32); 10] = [
        (150.0, 150.0), (150.0, 180.0), (150.0, 210.0),
        (150.0, 210.0), (180.0, 210.0), (210.0, 212.0),
        (210.0, 212.0), (210.0, 265.0),
        (210.0, 265.0), (265.0, 265.0),
    ];
    HEIGHTS
        .iter()
        .map(|&(left, right)| {
            vec![
                HandSample::new(Side::Left).with_palm_position([LEFT_X, left, 0.0]),
                HandSample::new(Side::Right).with_palm_position([RIGHT_X, right, 0.0]),
            ]
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::GestureCatalog;

    fn verdict(catalog: &GestureCatalog, id: &str, outcome: Outcome) -> bool {
        let hands = catalog.get(id).unwrap().hand_count();
        let frames = script(id, outcome).unwrap();
        assert!(frames.iter().all(|f| f.hand_count() == hands), "{id}: hand count");

        let start = std::time::Instant::now();
        let mut session = catalog.session_at(id, start).unwrap();
        for f in &frames {
            session.offer(f, start);
        }
        session.finish().recognized
    }

    #[test]
    fn every_catalog_gesture_has_a_script() {
        let catalog = GestureCatalog::standard().unwrap();
        for id in catalog.ids() {
            assert!(script(id, Outcome::Complete).is_some(), "{id}");
        }
        assert!(script("WAVE", Outcome::Complete).is_none());
    }

    #[test]
    fn complete_scripts_are_recognized() {
        let catalog = GestureCatalog::standard().unwrap();
        for id in catalog.ids() {
            assert!(verdict(&catalog, id, Outcome::Complete), "{id} should be recognized");
        }
    }

    #[test]
    fn incomplete_scripts_are_not_recognized() {
        let catalog = GestureCatalog::standard().unwrap();
        for id in catalog.ids() {
            assert!(!verdict(&catalog, id, Outcome::Incomplete), "{id} should not be recognized");
        }
    }

    #[test]
    fn scripts_fit_their_duration() {
        let catalog = GestureCatalog::standard().unwrap();
        for entry in catalog.entries() {
            let frames = script(entry.id(), Outcome::Complete).unwrap();
            let span_us = frames.last().map_or(0, |f| f.timestamp_us);
            assert!(
                (span_us as u128) < entry.duration().as_micros() / 2,
                "{} script too long",
                entry.id()
            );
        }
    }

    #[test]
    fn timestamps_are_evenly_spaced() {
        let frames = script("PINCH1", Outcome::Complete).unwrap();
        for pair in frames.windows(2) {
            assert_eq!(pair[1].timestamp_us - pair[0].timestamp_us, FRAME_INTERVAL_US);
        }
    }
}
