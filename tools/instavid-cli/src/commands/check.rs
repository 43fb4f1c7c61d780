//! Check encoder and font availability.

use std::collections::BTreeSet;

use instavid_common::config::{config_file_path, AppConfig};
use instavid_common::error::InstavidError;
use instavid_render_engine::command_exists;

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("InstaVid System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if write_config {
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", config_path.display()))?;
        println!("[OK] Config written: {}", config_path.display());
    } else {
        match AppConfig::load_from(&config_path) {
            Ok(_) => println!("[OK] Config: {}", config_path.display()),
            Err(InstavidError::FileNotFound { path }) => {
                println!("[OK] Config: defaults ({} not found)", path.display())
            }
            Err(e) => println!("[WARN] Config unusable, using defaults: {e}"),
        }
    }

    // Encoder
    let binary = &config.export.encoder_binary;
    let encoder_ok = command_exists(binary);
    if encoder_ok {
        println!("[OK] Encoder: {binary}");
    } else {
        println!("[WARN] Encoder '{binary}' not found; only --frames-only exports will work");
    }

    // Fonts
    let fonts = super::load_fonts(config);
    let families: BTreeSet<&str> = fonts.faces().iter().map(|f| f.family.as_str()).collect();
    if fonts.is_empty() {
        println!("[WARN] No fonts found; text elements will not be rasterized");
    } else {
        println!("[OK] Fonts: {} faces in {} families", fonts.len(), families.len());
    }
    for dir in config.font_dirs() {
        let marker = if dir.is_dir() { "found" } else { "missing" };
        println!("     {} ({})", dir.display(), marker);
    }

    // Output
    println!("[OK] Output directory: {}", config.output_dir.display());

    println!();
    if encoder_ok && !fonts.is_empty() {
        println!("Everything needed for export is available. InstaVid is ready.");
    } else {
        println!("Some capabilities are missing. See above for details.");
    }

    Ok(())
}
