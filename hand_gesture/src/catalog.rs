//! The fixed set of recognizable gestures and their static metadata.
//!
//! | Id | Duration | Hands | Steps |
//! |---|---|---|---|
//! | `HAMMER1` | 0.7 s | 2 | one strike of both index fingers |
//! | `HAMMER3` | 1.5 s | 2 | three strikes |
//! | `GRAB` | 0.7 s | 1 | open hand → fist |
//! | `UNGRAB` | 0.7 s | 1 | fist → open hand |
//! | `ROTATION` | 1.5 s | 2 | palms down → palms up |
//! | `REVERSED_ROTATION` | 1.5 s | 2 | palms up → palms down |
//! | `STAIRS` | 2.8 s | 2 | right, left, right, left hand climb in turn |
//! | `SCRATCH` | 1.5 s | 1 | three sideways scratches |
//! | `PINCH1` | 1.0 s | 2 | open → pinching → pinched |
//! | `PINCH3` | 2.5 s | 2 | the pinch sequence three times |
//!
//! Metadata is immutable once built and readable at any time.  Each gesture
//! sits behind its own lock: [`GestureCatalog::session`] takes that lock for
//! the lifetime of the attempt, so a second attempt at the same gesture is
//! refused with [`Error::GestureBusy`] while other lookups keep working.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use crate::frame::{HandSelector, Side, Vec3};
use crate::gesture::{Gesture, Step};
use crate::part::{Brace, Climb, GrabReady, Grabbing, PalmClosed, PalmFlat, PalmOpen, PalmPinching, PalmRotating, Stroke};
use crate::session::RecognitionSession;
use crate::{Error, Result};

pub const ILLUSTRATION_ROOT: &str = "/assets/data/gestures-illustrations";

const UP:   Vec3 = [0.0, 1.0, 0.0];
const DOWN: Vec3 = [0.0, -1.0, 0.0];

// ════════════════════════════════════════════════════════════════════════════
// CatalogEntry
// ════════════════════════════════════════════════════════════════════════════

/// A gesture plus its attempt duration and illustration reference.
#[derive(Debug)]
pub struct CatalogEntry {
    id:           String,
    duration:     Duration,
    illustration: String,
    hand_count:   usize,
    total_steps:  usize,
    gesture:      Mutex<Gesture>,
}

impl CatalogEntry {
    pub fn new(id: &str, duration: Duration, illustration: &str, gesture: Gesture) -> Self {
        CatalogEntry {
            id: id.to_string(),
            duration,
            illustration: illustration.to_string(),
            hand_count: gesture.expected_hand_count(),
            total_steps: gesture.total_steps(),
            gesture: Mutex::new(gesture),
        }
    }

    pub fn id(&self)           -> &str      { &self.id }
    pub fn duration(&self)     -> Duration  { self.duration }
    pub fn illustration(&self) -> &str      { &self.illustration }
    pub fn hand_count(&self)   -> usize     { self.hand_count }
    pub fn total_steps(&self)  -> usize     { self.total_steps }

    /// Exclusive access to the gesture, or `GestureBusy` while an attempt
    /// holds it.
    fn lock_gesture(&self) -> Result<MutexGuard<'_, Gesture>> {
        match self.gesture.try_lock() {
            Ok(guard)                      => Ok(guard),
            Err(TryLockError::Poisoned(e)) => Ok(PoisonError::into_inner(e)),
            Err(TryLockError::WouldBlock)  => Err(Error::GestureBusy(self.id.clone())),
        }
    }
}

/// A session holding one catalog gesture for the length of an attempt.
pub type CatalogSession<'c> = RecognitionSession<MutexGuard<'c, Gesture>>;

// ════════════════════════════════════════════════════════════════════════════
// GestureCatalog
// ════════════════════════════════════════════════════════════════════════════

/// Identifier → gesture lookup, in registration order.
#[derive(Debug)]
pub struct GestureCatalog {
    entries: Vec<CatalogEntry>,
}

impl GestureCatalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(Error::DuplicateGesture(entry.id.clone()));
            }
        }
        Ok(GestureCatalog { entries })
    }

    /// The standard LeapMotion gesture set.
    pub fn standard() -> Result<Self> {
        let entry = |id: &str, secs: f32, gif: &str, gesture: Gesture| {
            CatalogEntry::new(
                id,
                Duration::from_secs_f32(secs),
                &format!("{}/{}.gif", ILLUSTRATION_ROOT, gif),
                gesture,
            )
        };
        GestureCatalog::from_entries(vec![
            entry("HAMMER1",           0.7, "hammer",            hammer(1)?),
            entry("HAMMER3",           1.5, "hammer3",           hammer(3)?),
            entry("GRAB",              0.7, "grab",              grab(true)?),
            entry("UNGRAB",            0.7, "ungrab",            grab(false)?),
            entry("ROTATION",          1.5, "rotation",          rotation(UP)?),
            entry("REVERSED_ROTATION", 1.5, "reversed-rotation", rotation(DOWN)?),
            entry("STAIRS",            2.8, "stairs",            stairs(4)?),
            entry("SCRATCH",           1.5, "scratch",           scratch(3)?),
            entry("PINCH1",            1.0, "pinch1",            pinch(1)?),
            entry("PINCH3",            2.5, "pinch3",            pinch(3)?),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry(&self, id: &str) -> Result<&CatalogEntry> {
        self.get(id).ok_or_else(|| Error::UnknownGesture(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn duration(&self, id: &str) -> Option<Duration> {
        self.get(id).map(CatalogEntry::duration)
    }

    pub fn illustration(&self, id: &str) -> Option<&str> {
        self.get(id).map(CatalogEntry::illustration)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start an attempt at `id` now, bounded by the catalog duration.
    pub fn session(&self, id: &str) -> Result<CatalogSession<'_>> {
        self.session_at(id, Instant::now())
    }

    /// Start an attempt at `id` with an explicit start instant.
    pub fn session_at(&self, id: &str, started: Instant) -> Result<CatalogSession<'_>> {
        let entry = self.entry(id)?;
        self.session_for(id, entry.duration, started)
    }

    /// Start an attempt at `id` with a caller-chosen duration.
    pub fn session_for(&self, id: &str, duration: Duration, started: Instant) -> Result<CatalogSession<'_>> {
        let entry = self.entry(id)?;
        let gesture = entry.lock_gesture()?;
        Ok(RecognitionSession::start_at(&entry.id, gesture, duration, started))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture builders
// ════════════════════════════════════════════════════════════════════════════

/// open → pinching → pinched on both hands, `repeats` times.
pub fn pinch(repeats: usize) -> Result<Gesture> {
    let steps = (0..repeats)
        .flat_map(|_| {
            [
                Step::pair(PalmOpen::new(Side::Left),     PalmOpen::new(Side::Right)),
                Step::pair(PalmPinching::new(Side::Left), PalmPinching::new(Side::Right)),
                Step::pair(PalmClosed::new(Side::Left),   PalmClosed::new(Side::Right)),
            ]
        })
        .collect();
    Gesture::new(steps)
}

/// Both index fingers strike down and back, `strikes` times.
pub fn hammer(strikes: usize) -> Result<Gesture> {
    Gesture::new(
        (0..strikes)
            .map(|_| Step::pair(Stroke::hammer(Side::Left), Stroke::hammer(Side::Right)))
            .collect(),
    )
}

/// One hand closes into a fist (`closing`) or opens out of one.
pub fn grab(closing: bool) -> Result<Gesture> {
    Gesture::new(vec![
        Step::single(GrabReady::new(HandSelector::Any, closing)),
        Step::single(Grabbing::new(HandSelector::Any, closing)),
    ])
}

/// Both palms start flat against `axis` and turn over until they face it.
pub fn rotation(axis: Vec3) -> Result<Gesture> {
    Gesture::new(vec![
        Step::pair(PalmFlat::new(Side::Left, axis),     PalmFlat::new(Side::Right, axis)),
        Step::pair(PalmRotating::new(Side::Left, axis), PalmRotating::new(Side::Right, axis)),
    ])
}

/// Hands climb in turn, right hand first, while the other holds still.
pub fn stairs(flights: usize) -> Result<Gesture> {
    Gesture::new(
        (0..flights)
            .map(|i| {
                if i % 2 == 0 {
                    Step::pair(Brace::new(Side::Left, Side::Right), Climb::new(Side::Right))
                } else {
                    Step::pair(Climb::new(Side::Left), Brace::new(Side::Right, Side::Left))
                }
            })
            .collect(),
    )
}

/// One hand scratches sideways `count` times.
pub fn scratch(count: usize) -> Result<Gesture> {
    Gesture::new((0..count).map(|_| Step::single(Stroke::scratch(HandSelector::Any))).collect())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
