// ============================================
// Trigger Errors - Ошибки проигрывания звука
// ============================================

use std::fmt;

/// Ошибки триггера звука
#[derive(Debug)]
pub enum TriggerError {
    /// Нет префаба плеера, неизвестный префаб или некорректный диапазон
    Configuration(String),
    /// В наборе нет ни одного клипа
    EmptySoundSet,
    /// Хост не смог создать или запустить плеер
    Playback(String),
    /// Файл конфигурации не разобран
    Parse(String),
    Io(std::io::Error),
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            TriggerError::EmptySoundSet => write!(f, "sound set is empty"),
            TriggerError::Playback(msg) => write!(f, "playback error: {}", msg),
            TriggerError::Parse(msg) => write!(f, "failed to parse config: {}", msg),
            TriggerError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for TriggerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TriggerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TriggerError {
    fn from(e: std::io::Error) -> Self {
        TriggerError::Io(e)
    }
}

impl From<serde_json::Error> for TriggerError {
    fn from(e: serde_json::Error) -> Self {
        TriggerError::Parse(e.to_string())
    }
}
