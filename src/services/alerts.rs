//! Alert playback
//!
//! Turns clock alert cues into tones. Playback here is a terminal bell plus a
//! log line; a failure never reaches the clock.

use std::io::{self, Write};
use serde::Serialize;
use tracing::info;

use crate::engine::AlertKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
}

/// A single tone to play for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    pub waveform: Waveform,
}

impl Tone {
    pub fn for_alert(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Pip => Self {
                frequency_hz: 1000,
                duration_ms: 120,
                waveform: Waveform::Square,
            },
            AlertKind::OneMinuteWarning => Self {
                frequency_hz: 1200,
                duration_ms: 250,
                waveform: Waveform::Sine,
            },
            AlertKind::LevelEnd => Self {
                frequency_hz: 900,
                duration_ms: 800,
                waveform: Waveform::Sine,
            },
        }
    }
}

/// Plays alert tones
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertPlayer {
    /// Ring the terminal bell in addition to logging
    pub bell: bool,
}

impl AlertPlayer {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    pub fn play(&self, kind: AlertKind) -> io::Result<Tone> {
        let tone = Tone::for_alert(kind);
        info!(
            alert = ?kind,
            frequency_hz = tone.frequency_hz,
            duration_ms = tone.duration_ms,
            "Playing alert"
        );

        if self.bell {
            let mut out = io::stdout().lock();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_end_is_long_tone() {
        let tone = Tone::for_alert(AlertKind::LevelEnd);
        assert_eq!(tone.duration_ms, 800);
        assert!(tone.duration_ms > Tone::for_alert(AlertKind::Pip).duration_ms);
    }

    #[test]
    fn test_play_without_bell() {
        let tone = AlertPlayer::new(false).play(AlertKind::Pip).unwrap();
        assert_eq!(tone.waveform, Waveform::Square);
    }
}
