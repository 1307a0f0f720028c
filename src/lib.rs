// ============================================
// Sound Trigger - Библиотека
// ============================================
// Случайный клип со случайной громкостью и высотой тона,
// плеер уничтожается после окончания клипа.

pub mod audio;

pub use audio::{
    Clip, FrameScheduler, Playback, PlayerFactory, RandomizationRange, Scheduler, SoundSet,
    SoundTrigger, TriggerConfig, TriggerError,
};
