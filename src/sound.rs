// File: ./src/sound.rs
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Add,
    Done,
}

/// Fire-and-forget feedback. Implementations swallow their own errors.
pub trait SoundPlayer {
    fn play(&self, kind: SoundKind);
}

/// Rings the terminal bell; twice for a completed task.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self, kind: SoundKind) {
        let bell: &[u8] = match kind {
            SoundKind::Add => b"\x07",
            SoundKind::Done => b"\x07\x07",
        };
        let mut out = std::io::stdout();
        if let Err(e) = out.write_all(bell).and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "bell failed");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&self, _kind: SoundKind) {}
}
