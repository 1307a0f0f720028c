// ============================================
// Headless Host - Мир без звуковой карты
// ============================================
// Плееры живут в общей арене, каждое действие пишется в журнал.
// Используется на серверах и в тестах.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use ultraviolet::Vec3;

use super::components::Clip;
use super::error::TriggerError;
use super::host::{PlaybackHandle, PlayerFactory};

/// Метаданные клипа без аудио данных
#[derive(Clone, Debug, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    pub length: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

impl Clip for ClipInfo {
    fn length(&self) -> f32 {
        self.length
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Идентификатор плеера в арене
pub type PlayerId = u64;

/// Запись журнала арены
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    Spawned { id: PlayerId, prefab: String, position: [f32; 3] },
    Played { id: PlayerId, clip: String, volume: f32, pitch: f32 },
    Destroyed { id: PlayerId },
}

#[derive(Default)]
struct Arena {
    prefabs: HashSet<String>,
    next_id: PlayerId,
    live: HashMap<PlayerId, String>,
    events: Vec<PlayerEvent>,
}

/// Фабрика плееров без вывода звука
#[derive(Clone, Default)]
pub struct HeadlessPlayerFactory {
    arena: Rc<RefCell<Arena>>,
}

impl HeadlessPlayerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать шаблон плеера
    pub fn with_prefab(self, prefab: impl Into<String>) -> Self {
        self.arena.borrow_mut().prefabs.insert(prefab.into());
        self
    }

    /// Сколько плееров ещё не уничтожено
    pub fn live_count(&self) -> usize {
        self.arena.borrow().live.len()
    }

    pub fn is_live(&self, id: PlayerId) -> bool {
        self.arena.borrow().live.contains_key(&id)
    }

    /// Копия журнала
    pub fn events(&self) -> Vec<PlayerEvent> {
        self.arena.borrow().events.clone()
    }

    /// Сколько плееров было создано за всё время
    pub fn spawned(&self) -> usize {
        self.arena
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, PlayerEvent::Spawned { .. }))
            .count()
    }

    /// Сколько раз уничтожен конкретный плеер
    pub fn destroy_count(&self, id: PlayerId) -> usize {
        self.arena
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, PlayerEvent::Destroyed { id: d } if *d == id))
            .count()
    }

    fn release(&self, id: PlayerId) {
        let mut arena = self.arena.borrow_mut();
        if arena.live.remove(&id).is_some() {
            arena.events.push(PlayerEvent::Destroyed { id });
        } else {
            log::debug!("Player {} already destroyed, ignoring", id);
        }
    }
}

/// Плеер в арене
pub struct HeadlessHandle {
    id: PlayerId,
    arena: Rc<RefCell<Arena>>,
    clip: Option<ClipInfo>,
    volume: f32,
    pitch: f32,
    playing: bool,
}

impl HeadlessHandle {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl PlaybackHandle<ClipInfo> for HeadlessHandle {
    fn set_clip(&mut self, clip: ClipInfo) {
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
            .ok_or_else(|| TriggerError::Playback(format!("player {} has no clip", self.id)))?;

        self.arena.borrow_mut().events.push(PlayerEvent::Played {
            id: self.id,
            clip: clip.name.clone(),
            volume: self.volume,
            pitch: self.pitch,
        });
        self.playing = true;
        Ok(())
    }

    fn clip(&self) -> Option<&ClipInfo> {
        self.clip.as_ref()
    }
}

impl PlayerFactory<ClipInfo> for HeadlessPlayerFactory {
    type Handle = HeadlessHandle;

    fn has_prefab(&self, prefab: &str) -> bool {
        self.arena.borrow().prefabs.contains(prefab)
    }

    fn instantiate(&self, prefab: &str, position: Vec3) -> Result<HeadlessHandle, TriggerError> {
        let mut arena = self.arena.borrow_mut();
        if !arena.prefabs.contains(prefab) {
            return Err(TriggerError::Configuration(format!("unknown prefab '{}'", prefab)));
        }

        let id = arena.next_id;
        arena.next_id += 1;
        arena.live.insert(id, prefab.to_string());
        arena.events.push(PlayerEvent::Spawned {
            id,
            prefab: prefab.to_string(),
            position: [position.x, position.y, position.z],
        });

        Ok(HeadlessHandle {
            id,
            arena: self.arena.clone(),
            clip: None,
            volume: 1.0,
            pitch: 1.0,
            playing: false,
        })
    }

    fn destroy(&self, handle: HeadlessHandle) {
        self.release(handle.id);
    }
}
