//! Frame sources: LeapMotion hardware or recorded/scripted replay.
//!
//! A source runs on its own thread and pushes [`Frame`]s into a channel.
//! The [`FrameHub`] forwards that channel to whoever is subscribed at the
//! moment; a recognition attempt subscribes when it starts and drops its
//! receiver when it ends.  Frames published while nobody listens are lost,
//! as with a live sensor.

use std::ops::Deref;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hand_gesture::Frame;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`Frame`]s over a channel, in sensor order.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<Frame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<Frame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// FrameHub: per-attempt subscriptions
// ════════════════════════════════════════════════════════════════════════════

/// Fan-out point between a frame source and recognition attempts.
#[derive(Clone, Default)]
pub struct FrameHub {
    inner: Arc<Mutex<HubState>>,
}

#[derive(Default)]
struct HubState {
    next_id:     u64,
    subscribers: Vec<(u64, Sender<Frame>)>,
}

/// A live subscription.  Derefs to the frame receiver; dropping it
/// unsubscribes.
pub struct Subscription {
    id:  u64,
    rx:  Receiver<Frame>,
    hub: FrameHub,
}

impl Deref for Subscription {
    type Target = Receiver<Frame>;

    fn deref(&self) -> &Receiver<Frame> {
        &self.rx
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.lock().subscribers.retain(|(id, _)| *id != self.id);
    }
}

impl FrameHub {
    pub fn new() -> Self {
        FrameHub::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start receiving frames.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, tx));
        Subscription { id, rx, hub: self.clone() }
    }

    /// Deliver one frame to every subscriber; returns how many got it.
    pub fn publish(&self, frame: &Frame) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|(_, tx)| tx.send(frame.clone()).is_ok());
        state.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Block until someone subscribes or `timeout` passes.
    pub fn wait_for_subscriber(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.subscriber_count() > 0 {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.subscriber_count() > 0
    }

    /// Forward every frame of `frames` to the hub until the source ends.
    pub fn attach(&self, frames: Receiver<Frame>) -> JoinHandle<()> {
        let hub = self.clone();
        thread::spawn(move || {
            let mut forwarded = 0usize;
            for frame in frames {
                hub.publish(&frame);
                forwarded += 1;
            }
            debug!(forwarded, "frame source ended");
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayFrameSource: recordings and scripted sequences
// ════════════════════════════════════════════════════════════════════════════

/// Replays frames in order, paced by their sensor timestamps.
///
/// When two consecutive frames carry no usable timestamp delta the
/// `fallback_interval` is used instead.  A replay built with
/// [`ReplayFrameSource::awaiting_subscriber`] holds its first frame until the
/// hub has a subscriber, and gives up without sending anything if none
/// arrives in time.
pub struct ReplayFrameSource {
    frames:            Vec<Frame>,
    fallback_interval: Duration,
    gate:              Option<(FrameHub, Duration)>,
}

impl ReplayFrameSource {
    pub fn new(frames: Vec<Frame>, fallback_interval: Duration) -> Self {
        ReplayFrameSource { frames, fallback_interval, gate: None }
    }

    /// Start only once `hub` has a subscriber, waiting at most `timeout`.
    pub fn awaiting_subscriber(mut self, hub: &FrameHub, timeout: Duration) -> Self {
        self.gate = Some((hub.clone(), timeout));
        self
    }

    /// Pause to observe between `previous` and `next`.
    pub fn pause_between(&self, previous: &Frame, next: &Frame) -> Duration {
        if next.timestamp_us > previous.timestamp_us {
            Duration::from_micros(next.timestamp_us - previous.timestamp_us)
        } else {
            self.fallback_interval
        }
    }
}

impl FrameSource for ReplayFrameSource {
    fn run(self: Box<Self>, tx: Sender<Frame>) {
        if let Some((hub, timeout)) = &self.gate {
            if !hub.wait_for_subscriber(*timeout) {
                warn!(?timeout, frames = self.frames.len(), "no attempt subscribed, replay skipped");
                return;
            }
        }
        let mut previous: Option<&Frame> = None;
        for frame in &self.frames {
            if let Some(prev) = previous {
                thread::sleep(self.pause_between(prev, frame));
            }
            if tx.send(frame.clone()).is_err() {
                return;
            }
            previous = Some(frame);
        }
        info!(frames = self.frames.len(), "replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each tracking event becomes one [`Frame`] carrying the sensor's frame id
/// and clock; only the fields the detectors read are copied.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<Frame>) {
        use leaprs::{Connection, ConnectionConfig, EventRef};
        use tracing::error;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                error!("failed to create LeapC connection: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            error!("failed to open LeapMotion device: {:?}", e);
            return;
        }
        info!("LeapMotion connected");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let EventRef::Tracking(tracking) = msg.event() {
                let header = tracking.info();
                let hands = tracking.hands().iter().map(hand_sample).collect();
                let frame = Frame::new(hands)
                    .with_timestamp(sensor_count(header.frame_id), sensor_count(header.timestamp));
                if tx.send(frame).is_err() {
                    return;
                }
            }
        }
    }
}

/// LeapC reports ids and clocks as `i64`; negative values never occur in
/// practice and are clamped to zero.
#[cfg(feature = "leap")]
fn sensor_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(feature = "leap")]
fn hand_sample(hand: &leaprs::HandRef<'_>) -> hand_gesture::HandSample {
    use hand_gesture::{HandSample, Side};

    let side = match hand.hand_type() {
        leaprs::HandType::Left  => Side::Left,
        leaprs::HandType::Right => Side::Right,
    };
    let palm = hand.palm();
    HandSample {
        side,
        palm_position:  palm.position().array(),
        palm_normal:    palm.normal().array(),
        direction:      palm.direction().array(),
        pinch_strength: hand.pinch_strength,
        grab_strength:  hand.grab_strength,
        finger_tips:    hand.digits().iter().map(|d| d.distal().next_joint().array()).collect(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{HandSample, Side};

    fn frame(id: u64, ts: u64) -> Frame {
        Frame::new(vec![HandSample::new(Side::Left)]).with_timestamp(id, ts)
    }

    #[test]
    fn replay_preserves_order() {
        let frames: Vec<Frame> = (0..5).map(|i| frame(i, i * 1_000)).collect();
        let rx = spawn_frame_source(ReplayFrameSource::new(frames, Duration::from_millis(1)));
        let ids: Vec<u64> = rx.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn replay_pacing_uses_timestamps_or_fallback() {
        let replay = ReplayFrameSource::new(vec![], Duration::from_millis(7));
        assert_eq!(replay.pause_between(&frame(0, 1_000), &frame(1, 4_000)), Duration::from_millis(3));
        assert_eq!(replay.pause_between(&frame(0, 0), &frame(1, 0)), Duration::from_millis(7));
        assert_eq!(replay.pause_between(&frame(0, 9_000), &frame(1, 2_000)), Duration::from_millis(7));
    }

    #[test]
    fn hub_delivers_only_to_current_subscribers() {
        let hub = FrameHub::new();
        assert_eq!(hub.publish(&frame(0, 0)), 0);

        let rx = hub.subscribe();
        assert_eq!(hub.publish(&frame(1, 0)), 1);
        assert_eq!(rx.try_recv().map(|f| f.id), Ok(1));

        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(&frame(2, 0)), 0);
    }

    #[test]
    fn dropping_one_subscription_keeps_others() {
        let hub = FrameHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();
        drop(first);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.publish(&frame(3, 0)), 1);
        assert_eq!(second.try_recv().map(|f| f.id), Ok(3));
    }

    #[test]
    fn hub_attach_forwards_source() {
        let hub = FrameHub::new();
        let rx = hub.subscribe();
        let (tx, source) = mpsc::channel();
        let pump = hub.attach(source);
        for i in 0..3 {
            tx.send(frame(i, 0)).unwrap();
        }
        drop(tx);
        pump.join().unwrap();
        let ids: Vec<u64> = rx.try_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn gated_replay_waits_for_late_subscriber() {
        let hub = FrameHub::new();
        let frames: Vec<Frame> = (0..4).map(|i| frame(i, i * 1_000)).collect();
        let replay = ReplayFrameSource::new(frames, Duration::from_millis(1))
            .awaiting_subscriber(&hub, Duration::from_secs(2));
        let pump = hub.attach(spawn_frame_source(replay));

        thread::sleep(Duration::from_millis(30));
        let rx = hub.subscribe();
        pump.join().unwrap();
        let ids: Vec<u64> = rx.try_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn gated_replay_without_subscriber_sends_nothing() {
        let hub = FrameHub::new();
        let replay = ReplayFrameSource::new(vec![frame(0, 0)], Duration::from_millis(1))
            .awaiting_subscriber(&hub, Duration::from_millis(5));
        let rx = spawn_frame_source(replay);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn wait_for_subscriber_times_out() {
        let hub = FrameHub::new();
        assert!(!hub.wait_for_subscriber(Duration::from_millis(5)));
        let _rx = hub.subscribe();
        assert!(hub.wait_for_subscriber(Duration::from_millis(5)));
    }
}

#[cfg(all(test, feature = "leap"))]
mod leap_tests {
    use super::*;

    #[test]
    fn hand_mapping_takes_leaprs_hand_refs() {
        let map: fn(&leaprs::HandRef<'_>) -> hand_gesture::HandSample = hand_sample;
        let _ = map;
    }

    #[test]
    fn sensor_counts_clamp_negative() {
        assert_eq!(sensor_count(-5), 0);
        assert_eq!(sensor_count(1_234_567), 1_234_567);
    }
}
