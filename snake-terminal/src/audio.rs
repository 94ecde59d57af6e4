use snake_core::{AudioEvent, AudioSink};
use std::io::{Write, stdout};

/// Terminal-bell audio: one BEL per cue, nothing on `Move` (a beep every
/// turn is unbearable at arcade tick rates). Honors the global mute and
/// never blocks the tick.
#[derive(Debug, Default)]
pub struct TerminalAudio {
    muted: bool,
}

impl TerminalAudio {
    pub fn new() -> Self {
        TerminalAudio::default()
    }

    pub fn muted(&self) -> bool {
        self.muted
    }
}

impl AudioSink for TerminalAudio {
    fn play(&mut self, event: AudioEvent) {
        if self.muted {
            return;
        }
        match event {
            AudioEvent::Eat | AudioEvent::Die => {
                let mut out = stdout();
                let _ = out.write_all(b"\x07");
                let _ = out.flush();
            }
            AudioEvent::Move => {}
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
