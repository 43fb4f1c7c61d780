//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InstavidError, InstavidResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where exported videos are written.
    pub output_dir: PathBuf,

    /// Default export parameters.
    pub export: ExportDefaults,

    /// Font lookup configuration.
    pub fonts: FontConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default export parameters, used when a scene does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Resolution tier: "720", "1080" or "4k".
    pub resolution: String,

    /// Frames per second.
    pub fps: u32,

    /// Whether to mix the synthetic typing track into the export.
    pub include_audio: bool,

    /// Container format: "webm" or "mp4".
    pub format: String,

    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,

    /// Encoder binary to invoke.
    pub encoder_binary: String,
}

/// Where to look for TrueType/OpenType faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Extra directories scanned before the system font directories.
    pub dirs: Vec<PathBuf>,

    /// Whether to scan the usual system font directories.
    pub use_system_fonts: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "instavid=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            export: ExportDefaults::default(),
            fonts: FontConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            resolution: "1080".to_string(),
            fps: 30,
            include_audio: true,
            format: "webm".to_string(),
            video_bitrate: 8_000_000,
            encoder_binary: "ffmpeg".to_string(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            use_system_fonts: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(InstavidError::FileNotFound { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from `path`.
    pub fn load_from(path: &Path) -> InstavidResult<Self> {
        if !path.exists() {
            return Err(InstavidError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InstavidError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Font directories in lookup order.
    pub fn font_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.fonts.dirs.clone();
        if self.fonts.use_system_fonts {
            dirs.extend(system_font_dirs());
        }
        dirs
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("instavid").join("config.json")
}

fn default_output_dir() -> PathBuf {
    let base = std::env::var("XDG_VIDEOS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join("Videos"));
    base.join("instavid")
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        home_dir().join(".local").join("share").join("fonts"),
        home_dir().join(".fonts"),
    ];
    if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(home_dir().join("Library").join("Fonts"));
    }
    if cfg!(target_os = "windows") {
        dirs.push(PathBuf::from("C:\\Windows\\Fonts"));
    }
    dirs
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_editor_export_settings() {
        let config = AppConfig::default();
        assert_eq!(config.export.resolution, "1080");
        assert_eq!(config.export.fps, 30);
        assert!(config.export.include_audio);
        assert_eq!(config.export.video_bitrate, 8_000_000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"export": {"fps": 60}, "logging": {"json": true}}"#).unwrap();
        assert_eq!(config.export.fps, 60);
        assert_eq!(config.export.format, "webm");
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(InstavidError::FileNotFound { .. })
        ));

        std::fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, InstavidError::Config { .. }));
        assert!(err.to_string().contains("config.json"));

        std::fs::write(&path, r#"{"export": {"fps": 24}}"#).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().export.fps, 24);
    }

    #[test]
    fn test_font_dirs_respect_system_flag() {
        let mut config = AppConfig::default();
        config.fonts.dirs = vec![PathBuf::from("/opt/fonts")];
        config.fonts.use_system_fonts = false;
        assert_eq!(config.font_dirs(), vec![PathBuf::from("/opt/fonts")]);

        config.fonts.use_system_fonts = true;
        let dirs = config.font_dirs();
        assert_eq!(dirs[0], PathBuf::from("/opt/fonts"));
        assert!(dirs.len() > 1);
    }
}
