// ============================================
// Audio Module - Случайные звуки по триггеру
// ============================================
// Движок подключается через фабрику плееров и планировщик

mod components;
mod config;
mod error;
mod host;
mod scheduler;
mod trigger;
pub mod headless;
pub mod kira_host;

pub use components::*;
pub use config::*;
pub use error::TriggerError;
pub use host::*;
pub use scheduler::*;
pub use trigger::*;
