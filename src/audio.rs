use log::warn;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::f32::consts::TAU;
use std::time::Duration;

use crate::arena::ArenaEvent;
use crate::config::AudioConfig;

const SAMPLE_RATE: u32 = 44_100;

/// A short synthesized blip whose pitch slides from `start_hz` to `end_hz`
/// while its amplitude fades out.
#[derive(Debug, Clone)]
pub struct Sweep {
    start_hz: f32,
    end_hz: f32,
    gain: f32,
    total: u32,
    index: u32,
    phase: f32,
}

impl Sweep {
    pub fn new(start_hz: f32, end_hz: f32, seconds: f32, gain: f32) -> Self {
        Self {
            start_hz,
            end_hz,
            gain,
            total: (seconds * SAMPLE_RATE as f32) as u32,
            index: 0,
            phase: 0.0,
        }
    }

    /// The blip played for an event. Kills between bots are silent.
    pub fn for_event(event: &ArenaEvent) -> Option<Self> {
        let sweep = match event {
            ArenaEvent::Shot { by_player } => {
                let gain = if *by_player { 0.3 } else { 0.1 };
                Self::new(500.0, 100.0, 0.1, gain)
            }
            ArenaEvent::OrbCollected { .. } => Self::new(1000.0, 2000.0, 0.1, 0.5),
            ArenaEvent::Kill { by_player: true, .. } => Self::new(200.0, 50.0, 0.3, 1.0),
            ArenaEvent::Kill { by_player: false, .. } => return None,
            ArenaEvent::LevelUp { .. } => Self::new(440.0, 880.0, 0.5, 1.0),
            ArenaEvent::PlayerDied { .. } => Self::new(300.0, 40.0, 0.8, 1.0),
        };
        Some(sweep)
    }
}

impl Iterator for Sweep {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.total {
            return None;
        }

        let t = self.index as f32 / self.total as f32;
        let freq = self.start_hz + (self.end_hz - self.start_hz) * t;
        self.phase = (self.phase + TAU * freq / SAMPLE_RATE as f32) % TAU;
        self.index += 1;
        Some(self.phase.sin() * self.gain * (1.0 - t))
    }
}

impl Source for Sweep {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total - self.index) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(self.total as f32 / SAMPLE_RATE as f32))
    }
}

/// Audio manager for playing sound effects
pub struct AudioManager {
    /// Held to keep the device open; `None` when muted or unavailable
    output: Option<(OutputStream, OutputStreamHandle)>,
    volume: f32,
}

impl AudioManager {
    /// Opens the default output device. Failure leaves the manager silent.
    pub fn new(config: &AudioConfig) -> Self {
        if !config.enabled {
            return Self::silent();
        }

        match OutputStream::try_default() {
            Ok(output) => Self {
                output: Some(output),
                volume: config.volume,
            },
            Err(err) => {
                warn!("failed to initialize audio, continuing without sound: {err}");
                Self::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Self {
            output: None,
            volume: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    pub fn play_event(&self, event: &ArenaEvent) {
        if let Some(sweep) = Sweep::for_event(event) {
            self.play(sweep);
        }
    }

    fn play(&self, sweep: Sweep) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        // Playback errors never interrupt the game
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(self.volume);
            sink.append(sweep);
            sink.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_length_matches_duration() {
        let sweep = Sweep::new(440.0, 880.0, 0.5, 1.0);
        assert_eq!(sweep.total_duration(), Some(Duration::from_secs_f32(0.5)));
        assert_eq!(sweep.count(), 22_050);
    }

    #[test]
    fn test_sweep_fades_out() {
        let samples: Vec<f32> = Sweep::new(1000.0, 2000.0, 0.1, 1.0).collect();
        let head = samples[..200].iter().fold(0f32, |m, s| m.max(s.abs()));
        let tail = samples[samples.len() - 200..]
            .iter()
            .fold(0f32, |m, s| m.max(s.abs()));
        assert!(tail < head);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_player_shots_louder_than_bot_shots() {
        let player = Sweep::for_event(&ArenaEvent::Shot { by_player: true }).unwrap();
        let bot = Sweep::for_event(&ArenaEvent::Shot { by_player: false }).unwrap();
        assert!(player.gain > bot.gain);
        assert_eq!(player.total, bot.total);
    }

    #[test]
    fn test_only_player_kills_are_heard() {
        let kill = |by_player| ArenaEvent::Kill {
            by_player,
            victim: "Neo".to_string(),
        };
        let heard = Sweep::for_event(&kill(true)).unwrap();
        assert_eq!(heard.gain, 1.0);
        assert!(Sweep::for_event(&kill(false)).is_none());
    }

    #[test]
    fn test_disabled_audio_is_silent() {
        let config = AudioConfig {
            enabled: false,
            volume: 1.0,
        };
        let audio = AudioManager::new(&config);
        assert!(!audio.is_enabled());
        audio.play_event(&ArenaEvent::LevelUp { level: 2 });
    }
}
