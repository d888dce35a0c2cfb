//! Frame Sinks
//!
//! The output side of the render loop. A sink receives every finished
//! frame and commits it to whatever device it drives: an LED controller,
//! a terminal preview, a log line. Sink failures are reported to the loop,
//! which logs them and keeps rendering.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::render::RenderedFrame;

/// Receives finished frames
pub trait FrameSink: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Commit one frame to the device
    ///
    /// # Errors
    ///
    /// Returns an error when the device rejected or could not take the frame.
    fn commit(&mut self, frame: &RenderedFrame) -> anyhow::Result<()>;

    /// Called once after the last frame
    fn close(&mut self) {}
}

/// Keeps the most recent frame in memory
///
/// Clones share the same slot, so one clone can be handed to the render loop
/// while another is read from elsewhere (a "jump to host" lookup, tests).
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    last: Arc<Mutex<Option<RenderedFrame>>>,
    commits: Arc<Mutex<u64>>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently committed frame
    #[must_use]
    pub fn last_frame(&self) -> Option<RenderedFrame> {
        self.last.lock().clone()
    }

    /// Frames committed so far
    #[must_use]
    pub fn commits(&self) -> u64 {
        *self.commits.lock()
    }
}

impl FrameSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn commit(&mut self, frame: &RenderedFrame) -> anyhow::Result<()> {
        *self.last.lock() = Some(frame.clone());
        *self.commits.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_memory_sink_shares_slot_between_clones() {
        let reader = MemorySink::new();
        let mut writer = reader.clone();
        assert!(reader.last_frame().is_none());

        let frame = RenderedFrame {
            colors: vec![Rgb::RED],
            cell_hosts: vec![Some("srv".to_string())],
        };
        writer.commit(&frame).unwrap();
        writer.commit(&frame).unwrap();

        assert_eq!(reader.commits(), 2);
        assert_eq!(reader.last_frame(), Some(frame));
    }
}
