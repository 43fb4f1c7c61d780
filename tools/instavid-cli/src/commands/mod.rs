//! Subcommand implementations.

pub mod check;
pub mod export;
pub mod info;
pub mod init;
pub mod preview;
pub mod render;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use instavid_common::clock::Clock;
use instavid_common::config::AppConfig;
use instavid_editor::EditorState;
use instavid_project_model::SceneFile;
use instavid_render_engine::{FontBook, FrameExporter};

/// Load and check a scene file.
pub fn load_scene(path: &Path) -> anyhow::Result<SceneFile> {
    SceneFile::load(path).map_err(|e| anyhow::anyhow!("Failed to load scene: {e}"))
}

/// Scan the configured font directories.
pub fn load_fonts(config: &AppConfig) -> Arc<FontBook> {
    let fonts = FontBook::load_dirs(&config.font_dirs());
    if fonts.is_empty() {
        tracing::warn!("No fonts found; text will be skipped when rasterizing");
    }
    Arc::new(fonts)
}

/// Editor session for `scene` with the given font book.
pub fn open_editor<C: Clock>(scene: &SceneFile, clock: C, fonts: Arc<FontBook>) -> EditorState<C> {
    EditorState::from_scene(scene, clock, FrameExporter::new(fonts))
}

/// File stem suitable for output names derived from the scene name.
pub fn slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "scene".to_string()
    } else {
        slug
    }
}
