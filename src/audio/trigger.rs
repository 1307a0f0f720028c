// ============================================
// Sound Trigger - Случайный звук по запросу
// ============================================
// Idle -> Playing -> (ждём длину клипа + запас) -> Released
// Каждый вызов независим: свой плеер, своя отложенная задача.

use rand::Rng;
use ultraviolet::Vec3;

use super::components::{Clip, RELEASE_SLACK_SECS};
use super::config::TriggerConfig;
use super::error::TriggerError;
use super::host::{PlaybackHandle, PlayerFactory};
use super::scheduler::Scheduler;

/// Результат одного проигрывания
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    pub clip_index: usize,
    pub volume: f32,
    pub pitch: f32,
    /// Через сколько секунд плеер будет уничтожен.
    /// Отложенное уничтожение не отменяется поштучно, только вместе со сценой.
    pub release_after: f64,
}

/// Проигрывает случайный клип со случайной громкостью и высотой тона
pub struct SoundTrigger<C, F, R> {
    config: TriggerConfig<C>,
    prefab: String,
    factory: F,
    rng: R,
    position: Vec3,
}

impl<C, F, R> SoundTrigger<C, F, R>
where
    C: Clip + 'static,
    F: PlayerFactory<C>,
    R: Rng,
{
    /// Проверяет конфигурацию и наличие шаблона у фабрики
    pub fn new(config: TriggerConfig<C>, factory: F, rng: R) -> Result<Self, TriggerError> {
        let config = config.validated()?;
        let prefab = config.sound_player_prefab.clone().unwrap_or_default();
        if !factory.has_prefab(&prefab) {
            return Err(TriggerError::Configuration(format!(
                "prefab '{}' is not known to the player factory",
                prefab
            )));
        }

        log::info!(
            "Sound trigger ready: prefab '{}', {} clip(s)",
            prefab,
            config.sounds.len()
        );

        Ok(Self {
            config,
            prefab,
            factory,
            rng,
            position: Vec3::zero(),
        })
    }

    pub fn config(&self) -> &TriggerConfig<C> {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Позиция в мире, где будут появляться плееры
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    /// Проиграть звук. Ошибки логируются и не выходят наружу.
    pub fn play_randomized_sound<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> Option<Playback> {
        match self.try_play_randomized_sound(scheduler) {
            Ok(playback) => playback,
            Err(TriggerError::EmptySoundSet) => {
                log::warn!("No sounds configured, nothing to play");
                None
            }
            Err(e) => {
                log::error!("Failed to play randomized sound: {}", e);
                None
            }
        }
    }

    /// То же, но с ошибкой. `Ok(None)` если триггер выключен.
    pub fn try_play_randomized_sound<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> Result<Option<Playback>, TriggerError> {
        if self.config.disabled {
            return Ok(None);
        }

        let (clip_index, clip) = self.config.sounds.pick(&mut self.rng)?;
        let clip = clip.clone();
        let volume = self.config.volume.sample(&mut self.rng);
        let pitch = self.config.pitch.sample(&mut self.rng);

        let mut handle = self.factory.instantiate(&self.prefab, self.position)?;
        handle.set_clip(clip);
        handle.set_volume(volume);
        handle.set_pitch(pitch);
        if let Err(e) = handle.play() {
            self.factory.destroy(handle);
            return Err(e);
        }

        let length = handle.clip().map(|c| c.length()).unwrap_or(0.0);
        let release_after = length.max(0.0) as f64 + RELEASE_SLACK_SECS;

        log::debug!(
            "Playing clip #{} ({:.2}s) volume {:.2} pitch {:.2}, release in {:.2}s",
            clip_index, length, volume, pitch, release_after
        );

        let factory = self.factory.clone();
        scheduler.schedule_after(release_after, Box::new(move || factory.destroy(handle)));

        Ok(Some(Playback {
            clip_index,
            volume,
            pitch,
            release_after,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::components::{RandomizationRange, SoundSet};
    use crate::audio::headless::{ClipInfo, HeadlessPlayerFactory, PlayerEvent};
    use crate::audio::scheduler::FrameScheduler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestTrigger = SoundTrigger<ClipInfo, HeadlessPlayerFactory, StdRng>;

    fn clips(lengths: &[f32]) -> SoundSet<ClipInfo> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| ClipInfo::new(format!("clip{}", i), len))
            .collect()
    }

    fn trigger(config: TriggerConfig<ClipInfo>) -> (TestTrigger, HeadlessPlayerFactory) {
        let factory = HeadlessPlayerFactory::new().with_prefab("player");
        let trigger = SoundTrigger::new(config, factory.clone(), StdRng::seed_from_u64(42)).unwrap();
        (trigger, factory)
    }

    #[test]
    fn test_fixed_config_scenario() {
        let set: SoundSet<ClipInfo> = vec![ClipInfo::new("clipA", 2.0)].into_iter().collect();
        let config = TriggerConfig::new("player", set)
            .with_volume(0.7, 0.7)
            .with_pitch(1.0, 1.0);
        let (mut trigger, factory) = trigger(config);
        trigger.set_position(Vec3::new(4.0, 0.0, -2.0));
        let mut scheduler = FrameScheduler::new();

        let playback = trigger.play_randomized_sound(&mut scheduler).unwrap();
        assert_eq!(playback.clip_index, 0);
        assert_eq!(playback.volume, 0.7);
        assert_eq!(playback.pitch, 1.0);
        assert_eq!(playback.release_after, 2.1);

        assert_eq!(
            factory.events(),
            vec![
                PlayerEvent::Spawned { id: 0, prefab: "player".into(), position: [4.0, 0.0, -2.0] },
                PlayerEvent::Played { id: 0, clip: "clipA".into(), volume: 0.7, pitch: 1.0 },
            ]
        );

        scheduler.tick(2.0);
        assert!(factory.is_live(0), "released before clip finished");
        scheduler.tick(0.05);
        assert!(factory.is_live(0), "released before slack elapsed");
        scheduler.tick(0.05);
        assert!(!factory.is_live(0));
        assert_eq!(factory.destroy_count(0), 1);
    }

    #[test]
    fn test_disabled_does_nothing() {
        let config = TriggerConfig::new("player", clips(&[1.0, 2.0])).with_disabled(true);
        let (mut trigger, factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        assert_eq!(trigger.try_play_randomized_sound(&mut scheduler).unwrap(), None);
        assert_eq!(factory.spawned(), 0);
        assert!(scheduler.is_idle());

        trigger.set_disabled(false);
        assert!(trigger.play_randomized_sound(&mut scheduler).is_some());
        assert_eq!(factory.spawned(), 1);
    }

    #[test]
    fn test_empty_set_is_a_logged_noop() {
        let config = TriggerConfig::new("player", clips(&[]));
        let (mut trigger, factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        assert!(matches!(
            trigger.try_play_randomized_sound(&mut scheduler),
            Err(TriggerError::EmptySoundSet)
        ));
        assert_eq!(trigger.play_randomized_sound(&mut scheduler), None);
        assert_eq!(factory.spawned(), 0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_missing_prefab_fails_at_setup() {
        let mut config = TriggerConfig::new("player", clips(&[1.0]));
        config.sound_player_prefab = None;
        let factory = HeadlessPlayerFactory::new().with_prefab("player");
        let result = SoundTrigger::new(config, factory, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(TriggerError::Configuration(_))));
    }

    #[test]
    fn test_unknown_prefab_fails_at_setup() {
        let config = TriggerConfig::new("speaker", clips(&[1.0]));
        let factory = HeadlessPlayerFactory::new().with_prefab("player");
        let result = SoundTrigger::new(config, factory, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(TriggerError::Configuration(_))));
    }

    #[test]
    fn test_samples_stay_in_ranges() {
        let config = TriggerConfig::new("player", clips(&[0.1, 0.2, 0.3]))
            .with_volume(0.25, 0.75)
            .with_pitch(0.5, 2.5);
        let (mut trigger, _factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        for _ in 0..5_000 {
            let p = trigger.play_randomized_sound(&mut scheduler).unwrap();
            assert!(p.clip_index < 3);
            assert!(RandomizationRange::new(0.25, 0.75).contains(p.volume), "volume {}", p.volume);
            assert!(RandomizationRange::new(0.5, 2.5).contains(p.pitch), "pitch {}", p.pitch);
        }
    }

    #[test]
    fn test_clip_index_is_uniform() {
        const CLIPS: usize = 8;
        const TRIALS: usize = 16_000;

        let config = TriggerConfig::new("player", clips(&[0.5; CLIPS]));
        let (mut trigger, _factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        let mut counts = [0usize; CLIPS];
        for _ in 0..TRIALS {
            let p = trigger.play_randomized_sound(&mut scheduler).unwrap();
            counts[p.clip_index] += 1;
        }

        // Хи-квадрат, 7 степеней свободы: критическое значение 24.32 при p = 0.001
        let expected = (TRIALS / CLIPS) as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < 24.32, "chi-square {} counts {:?}", chi_square, counts);
    }

    #[test]
    fn test_concurrent_playbacks_release_independently() {
        let config = TriggerConfig::new("player", clips(&[1.0, 3.0]));
        let (mut trigger, factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        let mut releases = Vec::new();
        for _ in 0..20 {
            releases.push(trigger.play_randomized_sound(&mut scheduler).unwrap().release_after);
        }
        assert_eq!(factory.live_count(), 20);

        let short = releases.iter().filter(|&&r| r < 2.0).count();
        scheduler.tick(1.5);
        assert_eq!(factory.live_count(), 20 - short);

        scheduler.tick(2.0);
        assert_eq!(factory.live_count(), 0);
        for id in 0..20 {
            assert_eq!(factory.destroy_count(id), 1);
        }
    }

    #[test]
    fn test_dropping_trigger_keeps_pending_releases() {
        let config = TriggerConfig::new("player", clips(&[1.0]));
        let (mut trigger, factory) = trigger(config);
        let mut scheduler = FrameScheduler::new();

        let playback = trigger.play_randomized_sound(&mut scheduler).unwrap();
        trigger.play_randomized_sound(&mut scheduler).unwrap();
        drop(trigger);
        assert_eq!(scheduler.pending(), 2);

        scheduler.tick(playback.release_after as f32 + 0.1);
        assert!(scheduler.is_idle());
        assert_eq!(factory.live_count(), 0);
        assert_eq!(factory.destroy_count(0), 1);
        assert_eq!(factory.destroy_count(1), 1);
    }

    #[test]
    fn test_scene_teardown_never_touches_handles() {
        let config = TriggerConfig::new("player", clips(&[1.0]));
        let (mut trigger, factory) = trigger(config);

        let mut scheduler = FrameScheduler::new();
        trigger.play_randomized_sound(&mut scheduler).unwrap();
        trigger.play_randomized_sound(&mut scheduler).unwrap();
        drop(scheduler);

        let mut scheduler = FrameScheduler::new();
        trigger.play_randomized_sound(&mut scheduler).unwrap();
        assert_eq!(scheduler.cancel_all(), 1);
        scheduler.tick(5.0);

        for id in 0..3 {
            assert_eq!(factory.destroy_count(id), 0);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let run = || {
            let config = TriggerConfig::new("player", clips(&[1.0, 1.0, 1.0, 1.0]));
            let (mut trigger, _factory) = trigger(config);
            let mut scheduler = FrameScheduler::new();
            (0..10)
                .map(|_| {
                    let p = trigger.play_randomized_sound(&mut scheduler).unwrap();
                    (p.clip_index, p.volume, p.pitch)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
