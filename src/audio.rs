//! Bond feedback audio
//!
//! The simulation only reports events; this module turns them into
//! fire-and-forget cues. Each cue picks a random clip from its pool and hands
//! it to whatever backend the host provides.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::Result;
use crate::settings::SimSettings;
use crate::sim::SimEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Two catoms bonded
    BondSuccess,
    /// A bond attempt did not fit the target
    BondFailure,
}

impl SoundCue {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &SimEvent) -> Option<Self> {
        match event {
            SimEvent::BondFormed { .. } => Some(SoundCue::BondSuccess),
            SimEvent::BondFailed { .. } => Some(SoundCue::BondFailure),
            _ => None,
        }
    }
}

/// Where clips actually get played
pub trait AudioBackend {
    fn play(&mut self, clip: &Path, volume: f32);
}

/// Backend that only logs what would be played
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, clip: &Path, volume: f32) {
        log::info!("Playing {} at {:.2}", clip.display(), volume);
    }
}

/// Clip pools per cue
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    pub success: Vec<PathBuf>,
    pub failure: Vec<PathBuf>,
}

impl SoundBank {
    /// Every file in `success_dir` and `failure_dir`, sorted by name
    pub fn from_dirs(success_dir: impl AsRef<Path>, failure_dir: impl AsRef<Path>) -> Result<Self> {
        let bank = Self {
            success: list_clips(success_dir.as_ref())?,
            failure: list_clips(failure_dir.as_ref())?,
        };
        log::info!(
            "Loaded {} success and {} failure clips",
            bank.success.len(),
            bank.failure.len()
        );
        Ok(bank)
    }

    pub fn pool(&self, cue: SoundCue) -> &[PathBuf] {
        match cue {
            SoundCue::BondSuccess => &self.success,
            SoundCue::BondFailure => &self.failure,
        }
    }
}

fn list_clips(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut clips = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            clips.push(path);
        }
    }
    // read_dir order is platform dependent
    clips.sort();
    Ok(clips)
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    bank: SoundBank,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, bank: SoundBank) -> Self {
        Self {
            backend,
            bank,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Take volume and mute preferences from settings
    pub fn apply_settings(&mut self, settings: &SimSettings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a random clip for the cue; returns the clip chosen
    pub fn play<R: Rng>(&mut self, cue: SoundCue, rng: &mut R) -> Option<PathBuf> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return None;
        }

        let pool = self.bank.pool(cue);
        if pool.is_empty() {
            log::debug!("No clips loaded for {:?}", cue);
            return None;
        }
        let clip = pool[rng.random_range(0..pool.len())].clone();
        self.backend.play(&clip, vol);
        Some(clip)
    }

    /// Play the cues for a batch of simulation events
    pub fn play_events<R: Rng>(&mut self, events: &[SimEvent], rng: &mut R) {
        for cue in events.iter().filter_map(SoundCue::for_event) {
            self.play(cue, rng);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(PathBuf, f32)>,
    }

    impl AudioBackend for Recorder {
        fn play(&mut self, clip: &Path, volume: f32) {
            self.played.push((clip.to_path_buf(), volume));
        }
    }

    fn bank() -> SoundBank {
        SoundBank {
            success: vec![PathBuf::from("happy/1.wav"), PathBuf::from("happy/2.wav")],
            failure: vec![PathBuf::from("sad/1.wav")],
        }
    }

    #[test]
    fn test_cue_for_event() {
        let formed = SimEvent::BondFormed { a: 1, b: 2, consumed: None };
        let failed = SimEvent::BondFailed { a: 1, b: 2 };
        assert_eq!(SoundCue::for_event(&formed), Some(SoundCue::BondSuccess));
        assert_eq!(SoundCue::for_event(&failed), Some(SoundCue::BondFailure));
        assert_eq!(SoundCue::for_event(&SimEvent::BodyRemoved { id: 1 }), None);
    }

    #[test]
    fn test_play_picks_from_right_pool() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut audio = AudioManager::new(Recorder::default(), bank());
        for _ in 0..10 {
            let clip = audio.play(SoundCue::BondSuccess, &mut rng).unwrap();
            assert!(clip.starts_with("happy"));
        }
        let clip = audio.play(SoundCue::BondFailure, &mut rng).unwrap();
        assert_eq!(clip, PathBuf::from("sad/1.wav"));
        assert_eq!(audio.backend().played.len(), 11);
        assert!((audio.backend().played[0].1 - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut audio = AudioManager::new(Recorder::default(), bank());
        audio.apply_settings(&SimSettings {
            muted: true,
            ..Default::default()
        });
        assert!(audio.play(SoundCue::BondSuccess, &mut rng).is_none());
        assert!(audio.backend().played.is_empty());
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut audio = AudioManager::new(Recorder::default(), SoundBank::default());
        assert!(audio.play(SoundCue::BondFailure, &mut rng).is_none());
    }

    #[test]
    fn test_play_events() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut audio = AudioManager::new(Recorder::default(), bank());
        let events = [
            SimEvent::BondFormed { a: 1, b: 2, consumed: Some("H".into()) },
            SimEvent::BodyRemoved { id: 3 },
            SimEvent::BondFailed { a: 4, b: 5 },
        ];
        audio.play_events(&events, &mut rng);
        let played = &audio.backend().played;
        assert_eq!(played.len(), 2);
        assert!(played[1].0.starts_with("sad"));
    }

    #[test]
    fn test_bank_from_dirs() {
        let root = std::env::temp_dir().join(format!("molecats_audio_{}", std::process::id()));
        let happy = root.join("happy");
        let sad = root.join("sad");
        std::fs::create_dir_all(&happy).unwrap();
        std::fs::create_dir_all(&sad).unwrap();
        std::fs::write(happy.join("b.wav"), b"").unwrap();
        std::fs::write(happy.join("a.wav"), b"").unwrap();
        std::fs::write(sad.join("x.wav"), b"").unwrap();

        let bank = SoundBank::from_dirs(&happy, &sad).unwrap();
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(bank.success.len(), 2);
        assert!(bank.success[0].ends_with("a.wav"));
        assert_eq!(bank.pool(SoundCue::BondFailure).len(), 1);
        assert!(SoundBank::from_dirs(root.join("missing"), &sad).is_err());
    }
}
