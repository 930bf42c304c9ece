//! # leap_gesture
//!
//! LeapMotion front-end for the [`hand_gesture`] engine.
//!
//! Frames come from a [`source::FrameSource`] (hardware, a recording, or a
//! scripted sequence), fan out through a [`source::FrameHub`], and are fed
//! to one time-boxed recognition attempt at a time by the
//! [`service::GestureService`].
//!
//! ## Commands
//!
//! | Command | Action |
//! |---|---|
//! | `list` | Print every catalog gesture with its duration and illustration |
//! | `info <ID>` | Print one gesture's metadata and step layout |
//! | `recognize <ID>` | Run attempts against the LeapMotion (or `--replay FILE`) |
//! | `demo <ID>` | Run one attempt against a scripted frame sequence |
//! | `record <ID> -o FILE` | Write a scripted sequence as a JSON-lines recording |
//!
//! ## Feature flags
//!
//! * (default): **Replay mode**: recordings and scripted frames only.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.

use std::path::PathBuf;

pub mod config;
pub mod recording;
pub mod source;
pub mod synth;
pub mod service;

// ════════════════════════════════════════════════════════════════════════════
// Error
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path:?} line {line}: {source}")]
    Recording {
        path:   PathBuf,
        line:   usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Gesture(#[from] hand_gesture::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
