// ============================================
// Trigger Config - Data-Driven из JSON
// ============================================
// Настройка задаётся один раз, во время проигрывания только читается

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::components::{Clip, RandomizationRange, SoundSet, PITCH_BOUNDS, VOLUME_BOUNDS};
use super::error::TriggerError;

/// Статическая конфигурация триггера
#[derive(Debug, Clone)]
pub struct TriggerConfig<C> {
    /// Шаблон плеера (обязателен)
    pub sound_player_prefab: Option<String>,
    pub sounds: SoundSet<C>,
    pub volume: RandomizationRange,
    pub pitch: RandomizationRange,
    pub disabled: bool,
}

impl<C: Clip> TriggerConfig<C> {
    pub fn new(prefab: impl Into<String>, sounds: SoundSet<C>) -> Self {
        let defaults = TriggerConfigFile::default();
        Self {
            sound_player_prefab: Some(prefab.into()),
            sounds,
            volume: RandomizationRange::new(defaults.min_volume, defaults.max_volume),
            pitch: RandomizationRange::new(defaults.min_pitch, defaults.max_pitch),
            disabled: defaults.disabled,
        }
    }

    pub fn with_volume(mut self, min: f32, max: f32) -> Self {
        self.volume = RandomizationRange::new(min, max);
        self
    }

    pub fn with_pitch(mut self, min: f32, max: f32) -> Self {
        self.pitch = RandomizationRange::new(min, max);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Проверка при настройке: префаб обязателен, диапазоны чинятся
    pub fn validated(mut self) -> Result<Self, TriggerError> {
        match self.sound_player_prefab.as_deref() {
            None | Some("") => {
                return Err(TriggerError::Configuration(
                    "soundPlayerPrefab is not set".to_string(),
                ));
            }
            Some(_) => {}
        }

        self.volume = self.volume.validated(VOLUME_BOUNDS, "volume")?;
        self.pitch = self.pitch.validated(PITCH_BOUNDS, "pitch")?;

        if self.sounds.is_empty() {
            log::warn!("Sound set is empty, playback will be skipped");
        }
        Ok(self)
    }
}

/// Конфигурация триггера в файле
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfigFile {
    #[serde(default)]
    pub sound_player_prefab: Option<String>,
    /// Имена клипов, разрешаются через систему ассетов
    #[serde(default)]
    pub sounds: Vec<String>,
    #[serde(default = "default_min_volume")]
    pub min_volume: f32,
    #[serde(default = "default_max_volume")]
    pub max_volume: f32,
    #[serde(default = "default_min_pitch")]
    pub min_pitch: f32,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: f32,
    #[serde(default)]
    pub disabled: bool,
}

fn default_min_volume() -> f32 { 0.5 }
fn default_max_volume() -> f32 { 1.0 }
fn default_min_pitch() -> f32 { 0.8 }
fn default_max_pitch() -> f32 { 1.2 }

impl Default for TriggerConfigFile {
    fn default() -> Self {
        Self {
            sound_player_prefab: None,
            sounds: Vec::new(),
            min_volume: default_min_volume(),
            max_volume: default_max_volume(),
            min_pitch: default_min_pitch(),
            max_pitch: default_max_pitch(),
            disabled: false,
        }
    }
}

impl TriggerConfigFile {
    pub fn from_json(json: &str) -> Result<Self, TriggerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TriggerError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Разрешить имена клипов. Неизвестные пропускаются с предупреждением.
    pub fn resolve<C, F>(&self, mut lookup: F) -> Result<TriggerConfig<C>, TriggerError>
    where
        C: Clip,
        F: FnMut(&str) -> Option<C>,
    {
        let mut clips = Vec::with_capacity(self.sounds.len());
        for name in &self.sounds {
            match lookup(name) {
                Some(clip) => clips.push(clip),
                None => log::warn!("Unknown clip '{}', skipping", name),
            }
        }

        TriggerConfig {
            sound_player_prefab: self.sound_player_prefab.clone(),
            sounds: SoundSet::new(clips),
            volume: RandomizationRange::new(self.min_volume, self.max_volume),
            pitch: RandomizationRange::new(self.min_pitch, self.max_pitch),
            disabled: self.disabled,
        }
        .validated()
    }
}
