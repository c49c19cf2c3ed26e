// ABOUTME: Session and application configuration handling.
// ABOUTME: Provides the default session record and loads/saves the app config as TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Palette;

/// Connection protocol for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Local shell, no remote host
    Local,
    Raw,
    Telnet,
    Rlogin,
    #[default]
    Ssh,
}

impl Protocol {
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Local => "Local",
            Protocol::Raw => "Raw",
            Protocol::Telnet => "Telnet",
            Protocol::Rlogin => "Rlogin",
            Protocol::Ssh => "SSH",
        }
    }

    pub fn needs_host(&self) -> bool {
        !matches!(self, Protocol::Local)
    }
}

/// How received bytes are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VtMode {
    Ansi,
    Oemansi,
    Oemonly,
    Poorman,
    #[default]
    Unicode,
}

/// Tri-state used for "let the session decide" options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutoOnOff {
    On,
    Off,
    #[default]
    Auto,
}

/// Function key escape sequence flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKeys {
    #[default]
    Tilde,
    Linux,
    Xterm,
    Vt400,
    Vt100Plus,
    Sco,
}

/// When the session window goes away after the remote side exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CloseOnExit {
    Never,
    /// Only on clean exits
    #[default]
    Normal,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cipher {
    /// Marker: ciphers below this line trigger a warning
    Warn,
    TripleDes,
    Blowfish,
    Aes,
    Des,
    Arcfour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyExchange {
    /// Marker: algorithms below this line trigger a warning
    Warn,
    DhGroup1,
    DhGroup14,
    DhGex,
    Rsa,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub name: String,
    pub height: u32,
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Courier New".to_string(),
            height: 11,
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourSettings {
    pub ansi_colour: bool,
    pub xterm_256_colour: bool,
    pub bold_colour: bool,
    pub try_palette: bool,
    pub system_colour: bool,
    pub palette: Palette,
}

impl Default for ColourSettings {
    fn default() -> Self {
        Self {
            ansi_colour: true,
            xterm_256_colour: true,
            bold_colour: true,
            try_palette: false,
            system_colour: false,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    pub function_keys: FunctionKeys,
    pub ctrl_alt_keys: bool,
    pub compose_key: bool,
    pub no_application_keypad: bool,
    pub nethack_keypad: bool,
    /// Backspace sends DEL (0x7f) rather than ^H
    pub backspace_is_delete: bool,
    pub rxvt_home_end: bool,
    pub local_edit: AutoOnOff,
    pub local_echo: AutoOnOff,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            function_keys: FunctionKeys::Tilde,
            ctrl_alt_keys: true,
            compose_key: false,
            no_application_keypad: false,
            nethack_keypad: false,
            backspace_is_delete: true,
            rxvt_home_end: false,
            local_edit: AutoOnOff::Auto,
            local_echo: AutoOnOff::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    pub wrap_mode: bool,
    pub background_colour_erase: bool,
    pub scroll_on_display: bool,
    pub erase_to_scrollback: bool,
    pub scrollbar: bool,
    pub cursor_blink: bool,
    pub bidi: bool,
    pub arabic_shaping: bool,
    pub answerback: String,
    pub mouse_is_xterm: bool,
    pub mouse_override: bool,
    pub utf8_override: bool,
    pub remote_title_action: bool,
    pub window_border: bool,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            wrap_mode: true,
            background_colour_erase: true,
            scroll_on_display: true,
            erase_to_scrollback: true,
            scrollbar: true,
            cursor_blink: false,
            bidi: false,
            arabic_shaping: false,
            answerback: "PuTTY".to_string(),
            mouse_is_xterm: false,
            mouse_override: true,
            utf8_override: true,
            remote_title_action: true,
            window_border: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub protocol_version: u8,
    /// Cipher preference, most preferred first
    pub ciphers: Vec<Cipher>,
    /// Key exchange preference, most preferred first
    pub key_exchange: Vec<KeyExchange>,
    pub rekey_minutes: u32,
    pub rekey_data: String,
    pub show_banner: bool,
    pub try_keyboard_interactive: bool,
    pub try_gssapi: bool,
    pub simple: bool,
    pub x11_forward: bool,
    pub bug_detection: AutoOnOff,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            protocol_version: 2,
            ciphers: vec![
                Cipher::Aes,
                Cipher::Blowfish,
                Cipher::TripleDes,
                Cipher::Warn,
                Cipher::Arcfour,
                Cipher::Des,
            ],
            key_exchange: vec![
                KeyExchange::DhGex,
                KeyExchange::DhGroup14,
                KeyExchange::DhGroup1,
                KeyExchange::Rsa,
                KeyExchange::Warn,
            ],
            rekey_minutes: 60,
            rekey_data: "1G".to_string(),
            show_banner: true,
            try_keyboard_interactive: true,
            try_gssapi: false,
            simple: false,
            x11_forward: true,
            bug_detection: AutoOnOff::Auto,
        }
    }
}

/// Character classes for word selection: 0 = space/control, 1 = punctuation,
/// 2 = word characters. Characters in the same class form one word.
#[rustfmt::skip]
const DEFAULT_WORDNESS: [u8; 256] = [
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,1,2,1,1,1,1,1,1,1,1,1,1,2,2,2,2,2,2,2,2,2,2,2,2,2,1,1,1,1,1,1,
    1,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,1,1,1,1,2,
    1,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,1,2,2,2,2,2,2,2,2,
    2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,1,2,2,2,2,2,2,2,2,
];

/// Complete configuration snapshot handed to a new session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub username: String,

    pub term_type: String,
    pub term_speed: String,
    pub environment: Vec<String>,
    pub line_codepage: String,
    pub vt_mode: VtMode,

    /// Preferred grid size in columns
    pub width: u16,
    /// Preferred grid size in rows
    pub height: u16,
    pub scrollback_lines: u32,

    pub warn_on_close: bool,
    pub close_on_exit: CloseOnExit,
    pub tcp_nodelay: bool,
    pub proxy_dns: AutoOnOff,

    /// Per-byte character class, see `word_class`
    pub wordness: Vec<u8>,

    pub font: FontSpec,
    pub colours: ColourSettings,
    pub keyboard: KeyboardSettings,
    pub terminal: TerminalSettings,
    pub ssh: SshSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ssh,
            host: String::new(),
            port: 23,
            username: String::new(),
            term_type: "xterm".to_string(),
            term_speed: "38400,38400".to_string(),
            environment: Vec::new(),
            line_codepage: "ISO 8859-1".to_string(),
            vt_mode: VtMode::Unicode,
            width: 80,
            height: 30,
            scrollback_lines: 20000,
            warn_on_close: true,
            close_on_exit: CloseOnExit::Normal,
            tcp_nodelay: true,
            proxy_dns: AutoOnOff::Auto,
            wordness: DEFAULT_WORDNESS.to_vec(),
            font: FontSpec::default(),
            colours: ColourSettings::default(),
            keyboard: KeyboardSettings::default(),
            terminal: TerminalSettings::default(),
            ssh: SshSettings::default(),
        }
    }
}

/// Program and arguments that start a session's transport in a PTY
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SessionConfig {
    /// Default configuration for a local shell session
    pub fn local() -> Self {
        Self {
            protocol: Protocol::Local,
            ..Self::default()
        }
    }

    /// Character class of a byte for word selection
    pub fn word_class(&self, byte: u8) -> u8 {
        self.wordness
            .get(byte as usize)
            .copied()
            .unwrap_or(DEFAULT_WORDNESS[byte as usize])
    }

    /// Short human-readable name, e.g. `user@host` or `Local`
    pub fn display_name(&self) -> String {
        if !self.protocol.needs_host() {
            return self.protocol.label().to_string();
        }
        if self.username.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.username, self.host)
        }
    }

    /// Build the command that connects this session
    pub fn launch_command(&self) -> Result<LaunchCommand, ConfigError> {
        if self.protocol.needs_host() && self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost(self.protocol));
        }
        let port = self.port.to_string();
        let (program, args) = match self.protocol {
            Protocol::Local => (default_shell(), Vec::new()),
            Protocol::Ssh => {
                let mut args = vec![format!("-{}", self.ssh.protocol_version), "-p".to_string(), port];
                if !self.username.is_empty() {
                    args.push("-l".to_string());
                    args.push(self.username.clone());
                }
                if self.ssh.x11_forward {
                    args.push("-X".to_string());
                }
                args.push(self.host.clone());
                ("ssh".to_string(), args)
            }
            Protocol::Telnet => ("telnet".to_string(), vec![self.host.clone(), port]),
            Protocol::Rlogin => {
                let mut args = Vec::new();
                if !self.username.is_empty() {
                    args.push("-l".to_string());
                    args.push(self.username.clone());
                }
                args.push(self.host.clone());
                ("rlogin".to_string(), args)
            }
            Protocol::Raw => ("nc".to_string(), vec![self.host.clone(), port]),
        };
        Ok(LaunchCommand { program, args })
    }
}

#[cfg(not(windows))]
fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

#[cfg(windows)]
fn default_shell() -> String {
    std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
}

/// Application-level settings read from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Character cell size in pixels, used to size the window for a new session
    pub cell_width: u32,
    pub cell_height: u32,

    /// Initial window dimensions before saved settings are applied
    pub window_width: u32,
    pub window_height: u32,

    /// Baseline for sessions opened from the window
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cell_width: 9,
            cell_height: 18,
            window_width: 800,
            window_height: 600,
            // Local shell until a host is configured
            session: SessionConfig::local(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("{} sessions need a host name", .0.label())]
    MissingHost(Protocol),
}

impl AppConfig {
    /// Get the default config file path (~/.config/paneterm/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("paneterm").join("config.toml"))
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
