//! TOML-based configuration for the tabletmap daemon.
//!
//! Reads `AppConfig` from `$XDG_CONFIG_HOME/tabletmap/config.toml`, falling
//! back to `~/.config/tabletmap/config.toml`.  A missing file is not an
//! error: the daemon runs with defaults.
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  It looks similar to INI files but with more
//! data types.  Example:
//!
//! ```toml
//! [daemon]
//! target_app_id = "com.github.flxzt.rnote"
//! remap_on_attach = true
//!
//! [ipc]
//! socket_path = "/run/user/1000/sway-ipc.1000.1234.sock"
//!
//! # A tablet model missing from the built-in size table.
//! [[tablets]]
//! vendor = 0x256c
//! product = 0x006d
//! width = 224
//! height = 140
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so every
//! section and every key is optional.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabletmap_core::{PhysicalSize, SizeTable};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine config directory: XDG_CONFIG_HOME and HOME are unset")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The TOML parsed but a value is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub ipc: IpcConfig,
    /// Extra or overriding entries for the tablet size table.
    #[serde(default)]
    pub tablets: Vec<TabletEntry>,
}

/// General daemon behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    /// `app_id` of the window tablets are mapped onto.
    #[serde(default = "default_target_app_id")]
    pub target_app_id: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Run a mapping pass as soon as a tablet is attached.
    #[serde(default)]
    pub remap_on_attach: bool,
}

/// Compositor connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpcConfig {
    /// Explicit socket path.  When absent, `$SWAYSOCK` / `$I3SOCK` are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
    /// Number of decoded events buffered between the socket reader and the
    /// controller.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Physical active-area size of one tablet model, in millimetres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabletEntry {
    pub vendor: u32,
    pub product: u32,
    pub width: u32,
    pub height: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_target_app_id() -> String {
    "com.github.flxzt.rnote".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_channel_capacity() -> usize {
    64
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            target_app_id: default_target_app_id(),
            log_level: default_log_level(),
            remap_on_attach: false,
        }
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl AppConfig {
    /// Builds the size table: the built-in models, extended and overridden
    /// by `[[tablets]]` entries.
    pub fn size_table(&self) -> SizeTable {
        let mut table = SizeTable::builtin();
        table.extend(
            self.tablets
                .iter()
                .map(|t| (t.vendor, t.product, PhysicalSize::new(t.width, t.height))),
        );
        table
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the daemon cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.target_app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("daemon.target_app_id is empty".to_string()));
        }
        if self.ipc.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "ipc.channel_capacity must be at least 1".to_string(),
            ));
        }
        if let Some(t) = self.tablets.iter().find(|t| t.width == 0 || t.height == 0) {
            return Err(ConfigError::Invalid(format!(
                "tablet {:04x}:{:04x} has a zero dimension ({}x{})",
                t.vendor, t.product, t.width, t.height
            )));
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the directory holding the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads and validates `AppConfig` from `path`, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] if a value is unusable.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// `XDG_CONFIG_HOME`, else `HOME/.config`, with the `tabletmap` subdirectory.
fn config_dir_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("tabletmap"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_dir() -> PathBuf {
        let n = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("tabletmap_cfg_{}_{n}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_targets_rnote() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.daemon.target_app_id, "com.github.flxzt.rnote");
        assert_eq!(cfg.daemon.log_level, "info");
        assert!(!cfg.daemon.remap_on_attach);
    }

    #[test]
    fn test_ipc_config_default_has_no_socket_and_capacity_64() {
        let cfg = IpcConfig::default();
        assert_eq!(cfg.socket_path, None);
        assert_eq!(cfg.channel_capacity, 64);
    }

    #[test]
    fn test_default_size_table_is_the_builtin_one() {
        let table = AppConfig::default().size_table();
        assert_eq!(table.lookup(1386, 210), Some(PhysicalSize::new(147, 91)));
        assert_eq!(table.lookup(10429, 2328), Some(PhysicalSize::new(212, 135)));
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_daemon_section_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[daemon]
remap_on_attach = true
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert!(cfg.daemon.remap_on_attach);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.daemon.target_app_id, "com.github.flxzt.rnote");
        assert_eq!(cfg.ipc.channel_capacity, 64);
    }

    #[test]
    fn test_deserialize_full_config() {
        // Arrange
        let toml_str = r#"
[daemon]
target_app_id = "org.kde.krita"
log_level = "debug"

[ipc]
socket_path = "/run/user/1000/sway-ipc.sock"
channel_capacity = 8

[[tablets]]
vendor = 0x256c
product = 0x006d
width = 224
height = 140
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize full");

        // Assert
        assert_eq!(cfg.daemon.target_app_id, "org.kde.krita");
        assert_eq!(cfg.daemon.log_level, "debug");
        assert_eq!(
            cfg.ipc.socket_path.as_deref(),
            Some(Path::new("/run/user/1000/sway-ipc.sock"))
        );
        assert_eq!(cfg.ipc.channel_capacity, 8);
        assert_eq!(
            cfg.tablets,
            [TabletEntry {
                vendor: 0x256c,
                product: 0x006d,
                width: 224,
                height: 140
            }]
        );
    }

    #[test]
    fn test_size_table_adds_and_overrides_entries() {
        // Arrange
        let cfg = AppConfig {
            tablets: vec![
                TabletEntry {
                    vendor: 0x256c,
                    product: 0x006d,
                    width: 224,
                    height: 140,
                },
                TabletEntry {
                    vendor: 1386,
                    product: 210,
                    width: 150,
                    height: 95,
                },
            ],
            ..AppConfig::default()
        };

        // Act
        let table = cfg.size_table();

        // Assert
        assert_eq!(table.lookup(0x256c, 0x006d), Some(PhysicalSize::new(224, 140)));
        assert_eq!(table.lookup(1386, 210), Some(PhysicalSize::new(150, 95)));
        assert_eq!(table.lookup(10429, 2328), Some(PhysicalSize::new(212, 135)));
    }

    #[test]
    fn test_tablet_entry_missing_a_field_is_a_parse_error() {
        let toml_str = r#"
[[tablets]]
vendor = 1
product = 2
width = 100
"#;
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_toml_omits_unset_socket_path() {
        let rendered = AppConfig::default().to_toml().expect("serialize");

        assert!(rendered.contains("target_app_id = \"com.github.flxzt.rnote\""));
        assert!(!rendered.contains("socket_path"), "None socket_path must be omitted");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_channel_capacity() {
        let mut cfg = AppConfig::default();
        cfg.ipc.channel_capacity = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_blank_target() {
        let mut cfg = AppConfig::default();
        cfg.daemon.target_app_id = "  ".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_sized_tablet() {
        let mut cfg = AppConfig::default();
        cfg.tablets.push(TabletEntry {
            vendor: 1,
            product: 2,
            width: 0,
            height: 90,
        });

        let err = cfg.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid config: tablet 0001:0002 has a zero dimension (0x90)"
        );
    }

    // ── Loading from disk ─────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let cfg = load_config_from(&path).expect("missing file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_file() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[daemon]\nlog_level = \"trace\"\n").unwrap();

        // Act
        let cfg = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(cfg.daemon.log_level, "trace");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_reports_malformed_toml() {
        let dir = temp_dir();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_reports_invalid_values() {
        let dir = temp_dir();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[ipc]\nchannel_capacity = 0\n").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_directory_is_an_io_error() {
        let dir = temp_dir();

        let result = load_config_from(&dir);

        assert!(matches!(result, Err(ConfigError::Io { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── Config directory ──────────────────────────────────────────────────────

    #[test]
    fn test_config_dir_prefers_xdg_config_home() {
        let dir = config_dir_from(Some("/xdg".into()), Some("/home/user".into()));
        assert_eq!(dir, Some(PathBuf::from("/xdg/tabletmap")));
    }

    #[test]
    fn test_config_dir_falls_back_to_home_dot_config() {
        let dir = config_dir_from(None, Some("/home/user".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/user/.config/tabletmap")));
    }

    #[test]
    fn test_config_dir_ignores_empty_xdg_config_home() {
        let dir = config_dir_from(Some(OsString::new()), Some("/home/user".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/user/.config/tabletmap")));
    }

    #[test]
    fn test_config_dir_without_any_variable_is_none() {
        assert_eq!(config_dir_from(None, None), None);
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("tabletmap/config.toml"),
                "config file must be tabletmap/config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped CI env is also acceptable.
    }
}
