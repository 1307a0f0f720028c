// ============================================
// Kira Host - Воспроизведение через kira
// ============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use kira::{
    manager::AudioManager,
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Volume,
};
use serde::{Deserialize, Serialize};
use ultraviolet::Vec3;

use super::components::Clip;
use super::config::TriggerConfigFile;
use super::error::TriggerError;
use super::host::{PlaybackHandle, PlayerFactory};

/// Загруженный клип
#[derive(Clone)]
pub struct KiraClip {
    name: String,
    data: StaticSoundData,
}

impl KiraClip {
    pub fn new(name: impl Into<String>, data: StaticSoundData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

impl Clip for KiraClip {
    fn length(&self) -> f32 {
        self.data.duration().as_secs_f32()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Библиотека клипов - загруженные аудио данные
#[derive(Default)]
pub struct ClipLibrary {
    clips: HashMap<String, KiraClip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Загрузить клип с диска под именем `name`
    pub fn load_file<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<(), TriggerError> {
        let path = path.as_ref();
        match StaticSoundData::from_file(path) {
            Ok(data) => {
                log::info!("Loaded clip '{}' from {}", name, path.display());
                self.insert(KiraClip::new(name, data));
                Ok(())
            }
            Err(e) => Err(TriggerError::Playback(format!(
                "failed to load clip {}: {:?}",
                path.display(),
                e
            ))),
        }
    }

    pub fn insert(&mut self, clip: KiraClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    pub fn get(&self, name: &str) -> Option<KiraClip> {
        self.clips.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn default_one() -> f32 { 1.0 }

/// Шаблон плеера: множители поверх случайных громкости и высоты тона
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPrefab {
    #[serde(default = "default_one")]
    pub gain: f32,
    #[serde(default = "default_one")]
    pub pitch_mult: f32,
}

impl Default for PlayerPrefab {
    fn default() -> Self {
        Self {
            gain: 1.0,
            pitch_mult: 1.0,
        }
    }
}

impl PlayerPrefab {
    /// Применить шаблон к громкости и высоте тона
    pub fn apply(&self, volume: f32, pitch: f32) -> (f64, f64) {
        ((volume * self.gain) as f64, (pitch * self.pitch_mult) as f64)
    }
}

/// Файл сцены: шаблоны плееров + триггер
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub prefabs: HashMap<String, PlayerPrefab>,
    pub trigger: TriggerConfigFile,
}

impl SceneFile {
    pub fn from_json(json: &str) -> Result<Self, TriggerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TriggerError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

/// Плеер поверх kira
pub struct KiraPlaybackHandle {
    manager: Rc<RefCell<AudioManager>>,
    prefab: PlayerPrefab,
    position: Vec3,
    clip: Option<KiraClip>,
    volume: f32,
    pitch: f32,
    sound: Option<StaticSoundHandle>,
}

impl KiraPlaybackHandle {
    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl PlaybackHandle<KiraClip> for KiraPlaybackHandle {
    fn set_clip(&mut self, clip: KiraClip) {
        self.clip = Some(clip);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    fn play(&mut self) -> Result<(), TriggerError> {
        let clip = self
            .clip
            .as_ref()
            .ok_or_else(|| TriggerError::Playback("player has no clip".to_string()))?;

        let (volume, pitch) = self.prefab.apply(self.volume, self.pitch);
        let settings = StaticSoundSettings::new()
            .volume(Volume::Amplitude(volume))
            .playback_rate(pitch);

        let sound = self
            .manager
            .borrow_mut()
            .play(clip.data.clone().with_settings(settings))
            .map_err(|e| TriggerError::Playback(format!("{:?}", e)))?;
        self.sound = Some(sound);
        Ok(())
    }

    fn clip(&self) -> Option<&KiraClip> {
        self.clip.as_ref()
    }
}

/// Фабрика плееров на общем AudioManager
#[derive(Clone)]
pub struct KiraPlayerFactory {
    manager: Rc<RefCell<AudioManager>>,
    prefabs: Rc<HashMap<String, PlayerPrefab>>,
}

impl KiraPlayerFactory {
    pub fn new(manager: AudioManager, prefabs: HashMap<String, PlayerPrefab>) -> Self {
        Self {
            manager: Rc::new(RefCell::new(manager)),
            prefabs: Rc::new(prefabs),
        }
    }
}

impl PlayerFactory<KiraClip> for KiraPlayerFactory {
    type Handle = KiraPlaybackHandle;

    fn has_prefab(&self, prefab: &str) -> bool {
        self.prefabs.contains_key(prefab)
    }

    fn instantiate(&self, prefab: &str, position: Vec3) -> Result<KiraPlaybackHandle, TriggerError> {
        let template = self
            .prefabs
            .get(prefab)
            .copied()
            .ok_or_else(|| TriggerError::Configuration(format!("unknown prefab '{}'", prefab)))?;

        Ok(KiraPlaybackHandle {
            manager: self.manager.clone(),
            prefab: template,
            position,
            clip: None,
            volume: 1.0,
            pitch: 1.0,
            sound: None,
        })
    }

    fn destroy(&self, mut handle: KiraPlaybackHandle) {
        if let Some(mut sound) = handle.sound.take() {
            // Клип уже доигран, stop лишь освобождает слот
            let _ = sound.stop(Tween::default());
        }
        log::trace!(
            "Destroyed player '{}'",
            handle.clip.as_ref().map(|c| c.name()).unwrap_or("<none>")
        );
    }
}
