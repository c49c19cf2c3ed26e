// ABOUTME: Shared types and configuration for paneterm.
// ABOUTME: Defines session configuration, colour palette, and window settings persistence.

pub mod color;
pub mod config;
pub mod settings;

pub use color::{Palette, Rgb};
pub use config::{AppConfig, ConfigError, LaunchCommand, Protocol, SessionConfig};
pub use settings::{SettingsError, SettingsStore, TomlSettingsStore, WindowSettings};
