// ============================================
// Audio Components - Чистые данные
// ============================================

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::TriggerError;

/// Допустимый диапазон громкости
pub const VOLUME_BOUNDS: (f32, f32) = (0.0, 1.0);

/// Допустимый диапазон высоты тона
pub const PITCH_BOUNDS: (f32, f32) = (0.1, 3.0);

/// Запас после конца клипа перед уничтожением плеера (сек)
pub const RELEASE_SLACK_SECS: f64 = 0.1;

/// Аудио клип с фиксированной длительностью.
///
/// Клипом владеет внешняя система ассетов, триггер хранит только ссылки
/// (дешёвые клоны).
pub trait Clip: Clone {
    /// Длительность в секундах
    fn length(&self) -> f32;

    /// Имя для логов
    fn name(&self) -> &str;
}

/// Упорядоченный набор клипов
#[derive(Debug, Clone)]
pub struct SoundSet<C> {
    clips: Vec<C>,
}

impl<C: Clip> SoundSet<C> {
    pub fn new(clips: Vec<C>) -> Self {
        Self { clips }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.clips.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.clips.iter()
    }

    /// Случайный клип, равномерно по `[0, len)`
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(usize, &C), TriggerError> {
        if self.clips.is_empty() {
            return Err(TriggerError::EmptySoundSet);
        }
        let index = rng.gen_range(0..self.clips.len());
        Ok((index, &self.clips[index]))
    }
}

impl<C: Clip> Default for SoundSet<C> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<C: Clip> FromIterator<C> for SoundSet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Пара (min, max) для рандомизации громкости или высоты тона
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomizationRange {
    pub min: f32,
    pub max: f32,
}

impl RandomizationRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Фиксированное значение (min == max)
    pub fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Равномерная выборка из `[min, max]` включительно.
    ///
    /// Диапазон должен быть провалидирован: `min <= max`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Проверить диапазон: перевёрнутый меняем местами, выход за границы
    /// обрезаем. Оба случая только предупреждение.
    pub fn validated(self, bounds: (f32, f32), label: &str) -> Result<Self, TriggerError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(TriggerError::Configuration(format!(
                "{} range is not finite: [{}, {}]",
                label, self.min, self.max
            )));
        }

        let (mut min, mut max) = (self.min, self.max);
        if min > max {
            log::warn!("{} range inverted ({} > {}), swapping", label, min, max);
            std::mem::swap(&mut min, &mut max);
        }

        let (lo, hi) = bounds;
        let clamped_min = min.clamp(lo, hi);
        let clamped_max = max.clamp(lo, hi);
        if clamped_min != min || clamped_max != max {
            log::warn!(
                "{} range [{}, {}] outside [{}, {}], clamping",
                label, min, max, lo, hi
            );
        }

        Ok(Self::new(clamped_min, clamped_max))
    }
}
