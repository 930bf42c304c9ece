//! Time-boxed recognition attempts.
//!
//! A [`RecognitionSession`] owns one attempt at one gesture: it resets the
//! gesture when it starts, feeds it every frame that arrives before the
//! deadline, and yields exactly one [`Verdict`] when finished.  The session
//! holds exclusive access to the gesture (a `&mut Gesture`, or the catalog's
//! lock guard), so a second attempt on the same gesture cannot start before
//! the first is finished, cancelled or dropped.
//!
//! The deadline is wall-clock: a stalled frame source still ends the attempt
//! on time, with whatever progress was made.

use std::ops::DerefMut;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::frame::Frame;
use crate::gesture::Gesture;

/// Outcome of one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub gesture_id:          String,
    pub recognized:          bool,
    /// Frames fed to the gesture.
    pub frames_processed:    usize,
    /// Frames refused because they arrived at or after the deadline.
    pub frames_skipped_late: usize,
    /// Time from session start to the verdict.
    pub elapsed:             Duration,
}

#[derive(Debug)]
pub struct RecognitionSession<G: DerefMut<Target = Gesture>> {
    gesture_id:  String,
    gesture:     G,
    started:     Instant,
    duration:    Duration,
    processed:   usize,
    skipped:     usize,
    finished:    bool,
}

impl<G: DerefMut<Target = Gesture>> RecognitionSession<G> {
    /// Reset `gesture` and start the clock now.
    pub fn start(gesture_id: &str, gesture: G, duration: Duration) -> Self {
        Self::start_at(gesture_id, gesture, duration, Instant::now())
    }

    /// Reset `gesture` and start the clock at `started`.
    pub fn start_at(gesture_id: &str, mut gesture: G, duration: Duration, started: Instant) -> Self {
        gesture.init();
        debug!(gesture = gesture_id, ?duration, "session started");
        RecognitionSession {
            gesture_id: gesture_id.to_string(),
            gesture,
            started,
            duration,
            processed: 0,
            skipped:   0,
            finished:  false,
        }
    }

    pub fn gesture_id(&self) -> &str {
        &self.gesture_id
    }

    pub fn deadline(&self) -> Instant {
        self.started + self.duration
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline()
    }

    /// Steps passed so far in this attempt.
    pub fn progress(&self) -> usize {
        self.gesture.progress()
    }

    /// Feed one frame that arrived at `at`.  Returns whether it was processed;
    /// frames at or after the deadline are refused.
    pub fn offer(&mut self, frame: &Frame, at: Instant) -> bool {
        if self.is_expired(at) {
            self.skipped += 1;
            return false;
        }
        self.gesture.check(frame);
        self.processed += 1;
        true
    }

    /// Read the verdict.  This also resets the gesture for the next attempt.
    pub fn finish(mut self) -> Verdict {
        self.finish_at(Instant::now())
    }

    fn finish_at(&mut self, now: Instant) -> Verdict {
        self.finished = true;
        let recognized = self.gesture.is_recognized();
        let verdict = Verdict {
            gesture_id:          self.gesture_id.clone(),
            recognized,
            frames_processed:    self.processed,
            frames_skipped_late: self.skipped,
            elapsed:             now.saturating_duration_since(self.started),
        };
        info!(
            gesture = %self.gesture_id,
            recognized,
            frames = self.processed,
            late = self.skipped,
            "session finished"
        );
        verdict
    }

    /// Abandon the attempt without a verdict.
    pub fn cancel(mut self) {
        self.abandon();
    }

    fn abandon(&mut self) {
        self.finished = true;
        self.gesture.init();
        debug!(gesture = %self.gesture_id, frames = self.processed, "session cancelled");
    }

    /// Drive the session from a frame channel until the deadline, then
    /// finish.  Frames still queued after the deadline are left unread.
    pub fn run(mut self, frames: &Receiver<Frame>) -> Verdict {
        loop {
            let now = Instant::now();
            let deadline = self.deadline();
            if now >= deadline {
                break;
            }
            match frames.recv_timeout(deadline - now) {
                Ok(frame) => {
                    self.offer(&frame, Instant::now());
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!(gesture = %self.gesture_id, "frame source gone, waiting out the deadline");
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    break;
                }
            }
        }
        self.finish_at(Instant::now())
    }
}

impl<G: DerefMut<Target = Gesture>> Drop for RecognitionSession<G> {
    fn drop(&mut self) {
        if !self.finished {
            self.abandon();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::catalog::pinch;
    use crate::frame::{HandSample, Side};

    fn hands(strength: f32) -> Frame {
        Frame::new(vec![
            HandSample::new(Side::Left).with_pinch(strength),
            HandSample::new(Side::Right).with_pinch(strength),
        ])
    }

    #[test]
    fn session_resets_gesture_on_start() {
        let mut g = pinch(1).unwrap();
        g.check(&hands(0.0));
        assert_eq!(g.progress(), 1);
        let session = RecognitionSession::start("PINCH1", &mut g, Duration::from_secs(1));
        assert_eq!(session.progress(), 0);
    }

    #[test]
    fn frames_before_deadline_recognize() {
        let mut g = pinch(1).unwrap();
        let t0 = Instant::now();
        let mut s = RecognitionSession::start_at("PINCH1", &mut g, Duration::from_secs(1), t0);
        assert!(s.offer(&hands(0.0), t0 + Duration::from_millis(100)));
        assert!(s.offer(&hands(0.5), t0 + Duration::from_millis(500)));
        assert!(s.offer(&hands(0.9), t0 + Duration::from_millis(999)));
        let v = s.finish();
        assert!(v.recognized);
        assert_eq!(v.frames_processed, 3);
        assert_eq!(v.frames_skipped_late, 0);
    }

    #[test]
    fn frames_after_deadline_are_not_processed() {
        let mut g = pinch(1).unwrap();
        let t0 = Instant::now();
        let mut s = RecognitionSession::start_at("PINCH1", &mut g, Duration::from_secs(1), t0);
        s.offer(&hands(0.0), t0 + Duration::from_millis(100));
        s.offer(&hands(0.5), t0 + Duration::from_millis(500));
        assert!(!s.offer(&hands(0.9), t0 + Duration::from_secs(1)));
        assert_eq!(s.progress(), 2);
        let v = s.finish();
        assert!(!v.recognized);
        assert_eq!(v.frames_skipped_late, 1);
    }

    #[test]
    fn finish_resets_for_next_attempt() {
        let mut g = pinch(1).unwrap();
        let t0 = Instant::now();
        let mut s = RecognitionSession::start_at("PINCH1", &mut g, Duration::from_secs(1), t0);
        for strength in [0.0, 0.5, 0.9] {
            s.offer(&hands(strength), t0);
        }
        assert!(s.finish().recognized);
        assert_eq!(g.progress(), 0);
        assert!(!g.is_recognized());
    }

    #[test]
    fn cancel_and_drop_reset_without_verdict() {
        let mut g = pinch(1).unwrap();
        let t0 = Instant::now();
        {
            let mut s = RecognitionSession::start_at("PINCH1", &mut g, Duration::from_secs(1), t0);
            s.offer(&hands(0.0), t0);
            s.cancel();
        }
        assert_eq!(g.progress(), 0);
        {
            let mut s = RecognitionSession::start_at("PINCH1", &mut g, Duration::from_secs(1), t0);
            s.offer(&hands(0.0), t0);
            assert_eq!(s.progress(), 1);
        }
        assert_eq!(g.progress(), 0);
    }

    #[test]
    fn run_consumes_channel_until_deadline() {
        let mut g = pinch(1).unwrap();
        let (tx, rx) = mpsc::channel();
        for strength in [0.0, 0.5, 0.9] {
            tx.send(hands(strength)).unwrap();
        }
        let v = RecognitionSession::start("PINCH1", &mut g, Duration::from_millis(50)).run(&rx);
        assert!(v.recognized);
        assert_eq!(v.frames_processed, 3);
        assert!(v.elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn stalled_source_times_out_false() {
        let mut g = pinch(1).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(hands(0.0)).unwrap();
        let v = RecognitionSession::start("PINCH1", &mut g, Duration::from_millis(30)).run(&rx);
        drop(tx);
        assert!(!v.recognized);
        assert_eq!(v.frames_processed, 1);
        assert!(v.elapsed >= Duration::from_millis(30));
    }

    #[test]
    fn disconnected_source_still_waits_for_deadline() {
        let mut g = pinch(1).unwrap();
        let (tx, rx) = mpsc::channel::<Frame>();
        drop(tx);
        let v = RecognitionSession::start("PINCH1", &mut g, Duration::from_millis(30)).run(&rx);
        assert!(!v.recognized);
        assert!(v.elapsed >= Duration::from_millis(30));
    }
}
