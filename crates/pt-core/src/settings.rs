// ABOUTME: Key/value persistence for window state between runs.
// ABOUTME: Read once at startup, written once at teardown; missing keys keep current values.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

/// Group that holds all main window keys
pub const WINDOW_GROUP: &str = "main_window";

const KEY_SIZE: &str = "size";
const KEY_POSITION: &str = "position";
const KEY_MAXIMIZED: &str = "maximized";
const KEY_MINIMIZED: &str = "minimized";
const KEY_FULLSCREEN: &str = "fullscreen";
const KEY_ALWAYS_ON_TOP: &str = "always_on_top";
const KEY_SHOW_MENU_BAR: &str = "show_menu_bar";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigPath,
}

/// Grouped key/value storage
pub trait SettingsStore {
    fn value(&self, group: &str, key: &str) -> Option<&Value>;
    fn set_value(&mut self, group: &str, key: &str, value: Value);
    /// Flush pending writes to the backing storage
    fn sync(&mut self) -> Result<(), SettingsError>;
}

/// Settings kept in a TOML file, one table per group
#[derive(Debug, Default)]
pub struct TomlSettingsStore {
    path: Option<PathBuf>,
    table: Table,
}

impl TomlSettingsStore {
    /// In-memory store that is never written anywhere
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store at `path`. A missing file is a first run and yields an empty store.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        let table = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Table>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Table::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            table,
        })
    }

    /// Get the default settings path (~/.config/paneterm/settings.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("paneterm").join("settings.toml"))
    }

    pub fn open_default() -> Result<Self, SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigPath)?;
        Self::open(&path)
    }
}

impl SettingsStore for TomlSettingsStore {
    fn value(&self, group: &str, key: &str) -> Option<&Value> {
        self.table.get(group)?.as_table()?.get(key)
    }

    fn set_value(&mut self, group: &str, key: &str, value: Value) {
        let entry = self
            .table
            .entry(group.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        if let Value::Table(table) = entry {
            table.insert(key.to_string(), value);
        }
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.table)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Persisted main window state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub size: (u32, u32),
    pub position: (i32, i32),
    pub maximized: bool,
    pub minimized: bool,
    pub fullscreen: bool,
    pub always_on_top: bool,
    pub show_menu_bar: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            size: (800, 600),
            position: (0, 0),
            maximized: false,
            minimized: false,
            fullscreen: false,
            always_on_top: false,
            show_menu_bar: true,
        }
    }
}

impl WindowSettings {
    /// Overlay stored values on `current`; keys that are missing or malformed
    /// keep the value from `current`.
    pub fn read(store: &dyn SettingsStore, current: WindowSettings) -> WindowSettings {
        let get = |key: &str| store.value(WINDOW_GROUP, key);
        let flag = |key: &str, fallback: bool| get(key).and_then(Value::as_bool).unwrap_or(fallback);

        let settings = WindowSettings {
            size: get(KEY_SIZE)
                .and_then(pair)
                .and_then(|(w, h)| Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?)))
                .unwrap_or(current.size),
            position: get(KEY_POSITION)
                .and_then(pair)
                .and_then(|(x, y)| Some((i32::try_from(x).ok()?, i32::try_from(y).ok()?)))
                .unwrap_or(current.position),
            maximized: flag(KEY_MAXIMIZED, current.maximized),
            minimized: flag(KEY_MINIMIZED, current.minimized),
            fullscreen: flag(KEY_FULLSCREEN, current.fullscreen),
            always_on_top: flag(KEY_ALWAYS_ON_TOP, current.always_on_top),
            show_menu_bar: flag(KEY_SHOW_MENU_BAR, current.show_menu_bar),
        };
        tracing::debug!("Read window settings: {:?}", settings);
        settings
    }

    /// Store these settings. Size and position are only recorded while the
    /// window is not maximized, so a restore returns to the normal geometry.
    pub fn write(&self, store: &mut dyn SettingsStore) {
        store.set_value(WINDOW_GROUP, KEY_MAXIMIZED, Value::Boolean(self.maximized));
        store.set_value(WINDOW_GROUP, KEY_MINIMIZED, Value::Boolean(self.minimized));
        store.set_value(WINDOW_GROUP, KEY_FULLSCREEN, Value::Boolean(self.fullscreen));
        store.set_value(WINDOW_GROUP, KEY_ALWAYS_ON_TOP, Value::Boolean(self.always_on_top));
        store.set_value(WINDOW_GROUP, KEY_SHOW_MENU_BAR, Value::Boolean(self.show_menu_bar));
        if !self.maximized {
            store.set_value(
                WINDOW_GROUP,
                KEY_SIZE,
                Value::Array(vec![
                    Value::Integer(self.size.0.into()),
                    Value::Integer(self.size.1.into()),
                ]),
            );
            store.set_value(
                WINDOW_GROUP,
                KEY_POSITION,
                Value::Array(vec![
                    Value::Integer(self.position.0.into()),
                    Value::Integer(self.position.1.into()),
                ]),
            );
        }
    }
}

fn pair(value: &Value) -> Option<(i64, i64)> {
    match value.as_array()?.as_slice() {
        [a, b] => Some((a.as_integer()?, b.as_integer()?)),
        _ => None,
    }
}
