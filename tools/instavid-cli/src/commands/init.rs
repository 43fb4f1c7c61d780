//! Create a new scene file.

use std::path::PathBuf;

use instavid_common::config::AppConfig;
use instavid_project_model::{ExportFormat, ExportSettings, ResolutionTier, SceneFile};

pub fn run(config: &AppConfig, name: String, output: PathBuf, empty: bool) -> anyhow::Result<()> {
    let path = output.join(format!("{}.scene.json", super::slug(&name)));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    println!("Creating scene '{}' at {}", name, path.display());

    let mut scene = if empty {
        SceneFile::new(&name, 10.0)
    } else {
        SceneFile::sample(&name)
    };
    scene.export = export_defaults(config);
    scene
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to create scene: {e}"))?;

    println!("Scene created successfully:");
    println!("  Duration: {:.1}s", scene.duration);
    println!("  Elements: {}", scene.elements.len());
    println!(
        "  Export: {} @ {} fps, {}",
        scene.export.resolution,
        scene.export.fps,
        scene.export.format.extension()
    );
    println!();
    println!("Next: instavid preview {}", path.display());

    Ok(())
}

/// New scenes start from the configured export defaults. Unparseable values
/// fall back to the built-in ones.
fn export_defaults(config: &AppConfig) -> ExportSettings {
    let defaults = &config.export;
    let fallback = ExportSettings::default();
    ExportSettings {
        resolution: defaults
            .resolution
            .parse::<ResolutionTier>()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring configured resolution");
                fallback.resolution
            }),
        fps: if ExportSettings::is_supported_fps(defaults.fps) {
            defaults.fps
        } else {
            tracing::warn!(fps = defaults.fps, "Ignoring configured fps");
            fallback.fps
        },
        include_audio: defaults.include_audio,
        format: defaults.format.parse::<ExportFormat>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring configured format");
            fallback.format
        }),
    }
}
