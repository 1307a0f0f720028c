// ============================================
// Host Contracts - Контракты движка
// ============================================
// Триггер не знает объектной модели движка: плееры создаёт и
// уничтожает внешняя фабрика.

use ultraviolet::Vec3;

use super::components::Clip;
use super::error::TriggerError;

/// Временный объект, владеющий ровно одним звучанием
pub trait PlaybackHandle<C: Clip> {
    fn set_clip(&mut self, clip: C);
    fn set_volume(&mut self, volume: f32);
    fn set_pitch(&mut self, pitch: f32);
    fn play(&mut self) -> Result<(), TriggerError>;

    /// Текущий клип
    fn clip(&self) -> Option<&C>;
}

/// Сервис инстанцирования плееров.
///
/// Клон фабрики должен ссылаться на тот же мир: отложенное уничтожение
/// уносит клон в колбэк планировщика.
pub trait PlayerFactory<C: Clip>: Clone + 'static {
    type Handle: PlaybackHandle<C> + 'static;

    /// Знает ли фабрика такой шаблон
    fn has_prefab(&self, prefab: &str) -> bool;

    /// Создать плеер из шаблона в позиции мира
    fn instantiate(&self, prefab: &str, position: Vec3) -> Result<Self::Handle, TriggerError>;

    /// Уничтожить плеер (ровно один раз на плеер)
    fn destroy(&self, handle: Self::Handle);
}
