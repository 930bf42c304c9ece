//! JSON-lines frame recordings: one serialized [`Frame`] per line.
//!
//! Blank lines are skipped on load, so hand-edited files may be spaced out.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use hand_gesture::Frame;
use tracing::debug;

use crate::{Error, Result};

pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<Frame>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = serde_json::from_str(&line).map_err(|source| Error::Recording {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        frames.push(frame);
    }
    debug!(?path, frames = frames.len(), "recording loaded");
    Ok(frames)
}

pub fn save_frames(path: impl AsRef<Path>, frames: &[Frame]) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    for (idx, frame) in frames.iter().enumerate() {
        serde_json::to_writer(&mut out, frame).map_err(|source| Error::Recording {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    debug!(?path, frames = frames.len(), "recording saved");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
