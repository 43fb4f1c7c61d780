//! Timeline-level settings and scene files.
//!
//! A scene file is a JSON description of a timeline: its duration,
//! background, export settings, and the element creation requests in
//! back-to-front order. It is the CLI's input format.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::element::{Element, ElementId, ElementKind, ElementPatch};

/// Shortest allowed timeline, in seconds.
pub const MIN_TIMELINE_DURATION: f64 = 1.0;

/// Longest allowed timeline, in seconds.
pub const MAX_TIMELINE_DURATION: f64 = 60.0;

/// Clamp a requested timeline length into the supported range.
pub fn clamp_timeline_duration(secs: f64) -> f64 {
    secs.clamp(MIN_TIMELINE_DURATION, MAX_TIMELINE_DURATION)
}

/// Canvas fill drawn under every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    pub color: Color,
    /// Whether to blend from `color` to `gradient_end`.
    pub gradient: bool,
    pub gradient_end: Color,
    /// CSS gradient angle: 180 runs top to bottom, 90 left to right.
    pub angle_deg: f64,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: Color::rgb(0x0a, 0x0a, 0x0f),
            gradient: false,
            gradient_end: Color::rgb(0x1a, 0x1a, 0x2e),
            angle_deg: 180.0,
        }
    }
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            gradient: false,
            ..Self::default()
        }
    }

    pub fn linear(from: Color, to: Color, angle_deg: f64) -> Self {
        Self {
            color: from,
            gradient: true,
            gradient_end: to,
            angle_deg,
        }
    }

    /// Named backgrounds offered by the editor.
    pub fn presets() -> Vec<(&'static str, Background)> {
        let hex = |r, g, b| Color::rgb(r, g, b);
        vec![
            (
                "purple",
                Self::linear(hex(0x66, 0x7e, 0xea), hex(0x76, 0x4b, 0xa2), 135.0),
            ),
            (
                "blue",
                Self::linear(hex(0x1e, 0x3a, 0x8a), hex(0x7c, 0x3a, 0xed), 135.0),
            ),
            (
                "pink",
                Self::linear(hex(0xf0, 0x93, 0xfb), hex(0xf5, 0x57, 0x6c), 135.0),
            ),
            (
                "green",
                Self::linear(hex(0x0f, 0x76, 0x6e), hex(0x10, 0xb9, 0x81), 135.0),
            ),
            (
                "orange",
                Self::linear(hex(0xea, 0x58, 0x0c), hex(0xfb, 0xbf, 0x24), 135.0),
            ),
            ("midnight", Self::default()),
            ("dark", Self::solid(hex(0x1a, 0x1a, 0x1a))),
            ("black", Self::solid(Color::BLACK)),
            ("white", Self::solid(Color::WHITE)),
        ]
    }

    pub fn preset(name: &str) -> Option<Background> {
        Self::presets()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bg)| bg)
    }
}

/// Output resolution tier. Always 9:16 portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResolutionTier {
    #[serde(rename = "720")]
    Hd,
    #[default]
    #[serde(rename = "1080")]
    FullHd,
    #[serde(rename = "4k")]
    Uhd,
}

impl ResolutionTier {
    /// Output (width, height) in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd => (720, 1280),
            Self::FullHd => (1080, 1920),
            Self::Uhd => (2160, 3840),
        }
    }

    /// Pixels per logical canvas unit.
    pub fn scale(self) -> f64 {
        self.dimensions().0 as f64 / crate::element::CANVAS_WIDTH
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hd => "720",
            Self::FullHd => "1080",
            Self::Uhd => "4k",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResolutionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "720" | "720p" => Ok(Self::Hd),
            "1080" | "1080p" => Ok(Self::FullHd),
            "4k" | "2160" | "2160p" => Ok(Self::Uhd),
            other => Err(format!("unknown resolution '{other}' (expected 720, 1080 or 4k)")),
        }
    }
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Webm,
    Mp4,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webm" => Ok(Self::Webm),
            "mp4" => Ok(Self::Mp4),
            other => Err(format!("unknown format '{other}' (expected webm or mp4)")),
        }
    }
}

/// Frame rates the exporter accepts.
pub const SUPPORTED_FPS: [u32; 3] = [24, 30, 60];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub resolution: ResolutionTier,
    pub fps: u32,
    pub include_audio: bool,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            resolution: ResolutionTier::FullHd,
            fps: 30,
            include_audio: true,
            format: ExportFormat::Webm,
        }
    }
}

impl ExportSettings {
    pub fn is_supported_fps(fps: u32) -> bool {
        SUPPORTED_FPS.contains(&fps)
    }
}

/// One element creation request: a kind plus overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub kind: ElementKind,
    #[serde(flatten)]
    pub overrides: ElementPatch,
}

impl ElementSpec {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            overrides: ElementPatch::default(),
        }
    }

    pub fn with(kind: ElementKind, overrides: ElementPatch) -> Self {
        Self { kind, overrides }
    }
}

/// Scene file (`*.scene.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default = "default_scene_name")]
    pub name: String,
    #[serde(default = "default_timeline_duration")]
    pub duration: f64,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

fn default_scene_name() -> String {
    "Untitled".to_string()
}

fn default_timeline_duration() -> f64 {
    10.0
}

impl SceneFile {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            background: Background::default(),
            export: ExportSettings::default(),
            elements: Vec::new(),
        }
    }

    /// A small showcase scene: headline, stat counter, chart and caption.
    pub fn sample(name: impl Into<String>) -> Self {
        let mut scene = Self::new(name, 8.0);
        scene.background = Background::preset("blue").unwrap_or_default();
        scene.elements = vec![
            ElementSpec::with(
                ElementKind::Heading,
                ElementPatch {
                    text: Some("AI in 2025".into()),
                    y: Some(260.0),
                    ..Default::default()
                },
            ),
            ElementSpec::with(
                ElementKind::Subheading,
                ElementPatch {
                    text: Some("Who leads the benchmarks?".into()),
                    y: Some(420.0),
                    start_time: Some(0.5),
                    duration: Some(7.5),
                    animation: Some(crate::AnimationCurve::Typewriter),
                    animation_duration: Some(1.5),
                    ..Default::default()
                },
            ),
            ElementSpec::with(
                ElementKind::BarChart,
                ElementPatch {
                    start_time: Some(1.5),
                    duration: Some(6.5),
                    ..Default::default()
                },
            ),
            ElementSpec::with(
                ElementKind::Counter,
                ElementPatch {
                    y: Some(1300.0),
                    start_time: Some(2.5),
                    duration: Some(5.5),
                    ..Default::default()
                },
            ),
            ElementSpec::new(ElementKind::Caption),
        ];
        scene
    }

    /// Load a scene from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SceneError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let scene: SceneFile = serde_json::from_str(&json).map_err(|e| SceneError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        scene.check()?;
        Ok(scene)
    }

    /// Save to disk as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SceneError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SceneError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| SceneError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Instantiate every element spec in list order, with ids from 1.
    pub fn build_elements(&self) -> Vec<Element> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, spec)| Element::create(ElementId(i as u64 + 1), spec.kind, self.duration, &spec.overrides))
            .collect()
    }

    /// Reject settings the editor could never produce.
    pub fn check(&self) -> Result<(), SceneError> {
        if !self.duration.is_finite()
            || !(MIN_TIMELINE_DURATION..=MAX_TIMELINE_DURATION).contains(&self.duration)
        {
            return Err(SceneError::ValidationError {
                message: format!(
                    "duration {} is outside {MIN_TIMELINE_DURATION}-{MAX_TIMELINE_DURATION} seconds",
                    self.duration
                ),
            });
        }
        if !ExportSettings::is_supported_fps(self.export.fps) {
            return Err(SceneError::ValidationError {
                message: format!(
                    "fps {} is not one of {:?}",
                    self.export.fps, SUPPORTED_FPS
                ),
            });
        }
        Ok(())
    }
}

/// Errors that can occur when working with scene files.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid scene: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!(ResolutionTier::Hd.dimensions(), (720, 1280));
        assert_eq!(ResolutionTier::FullHd.dimensions(), (1080, 1920));
        assert_eq!(ResolutionTier::Uhd.dimensions(), (2160, 3840));
        assert!((ResolutionTier::Uhd.scale() - 2.0).abs() < 1e-12);
        assert_eq!("4K".parse::<ResolutionTier>().unwrap(), ResolutionTier::Uhd);
    }

    #[test]
    fn test_resolution_serde_names() {
        let json = serde_json::to_string(&ResolutionTier::Hd).unwrap();
        assert_eq!(json, "\"720\"");
        let tier: ResolutionTier = serde_json::from_str("\"4k\"").unwrap();
        assert_eq!(tier, ResolutionTier::Uhd);
    }

    #[test]
    fn test_clamp_timeline_duration() {
        assert_eq!(clamp_timeline_duration(0.2), 1.0);
        assert_eq!(clamp_timeline_duration(90.0), 60.0);
        assert_eq!(clamp_timeline_duration(12.5), 12.5);
    }

    #[test]
    fn test_presets_include_default() {
        assert_eq!(Background::preset("midnight"), Some(Background::default()));
        let purple = Background::preset("purple").unwrap();
        assert!(purple.gradient);
        assert_eq!(purple.angle_deg, 135.0);
        assert!(Background::preset("plaid").is_none());
    }

    #[test]
    fn test_element_spec_flattens_overrides() {
        let spec: ElementSpec =
            serde_json::from_str(r#"{"kind": "heading", "text": "Hello", "y": 300}"#).unwrap();
        assert_eq!(spec.kind, ElementKind::Heading);
        assert_eq!(spec.overrides.text.as_deref(), Some("Hello"));
        assert_eq!(spec.overrides.y, Some(300.0));
    }

    #[test]
    fn test_build_elements_keeps_list_order() {
        let elements = SceneFile::sample("Demo").build_elements();
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0].id, ElementId(1));
        assert_eq!(elements[2].kind(), ElementKind::BarChart);
        assert_eq!(elements[1].text().map(|t| t.text.as_str()), Some("Who leads the benchmarks?"));
    }

    #[test]
    fn test_scene_save_and_load() {
        let dir = std::env::temp_dir().join("instavid_test_scene");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("demo.scene.json");

        let scene = SceneFile::sample("Demo");
        scene.save(&path).unwrap();
        let loaded = SceneFile::load(&path).unwrap();
        assert_eq!(loaded, scene);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_check_rejects_bad_fps_and_duration() {
        let mut scene = SceneFile::new("x", 10.0);
        scene.export.fps = 25;
        assert!(matches!(scene.check(), Err(SceneError::ValidationError { .. })));

        let scene = SceneFile::new("y", 120.0);
        assert!(scene.check().is_err());
    }
}
