//! Render a single frame.

use std::path::PathBuf;

use instavid_common::clock::MonotonicClock;
use instavid_common::config::AppConfig;
use instavid_project_model::{ResolutionTier, CANVAS_HEIGHT, CANVAS_WIDTH};
use instavid_render_engine::{NoCues, RasterSurface, RecordingSurface};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    time: f64,
    resolution: Option<ResolutionTier>,
    output: Option<PathBuf>,
    dry_run: bool,
    seed: u64,
) -> anyhow::Result<()> {
    let scene = super::load_scene(&path)?;
    let fonts = if dry_run {
        Default::default()
    } else {
        super::load_fonts(config)
    };
    let mut editor = super::open_editor(&scene, MonotonicClock::start(), fonts.clone()).with_seed(seed);
    editor.seek(time);
    let at = editor.current_time();

    if dry_run {
        let mut surface = RecordingSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let stats = editor.render(&mut surface, &mut NoCues);
        let json = surface.to_json()?;
        match output {
            Some(out) => {
                std::fs::write(&out, json)?;
                println!(
                    "Wrote {} draw commands ({} elements) to {}",
                    surface.commands().len(),
                    stats.drawn,
                    out.display()
                );
            }
            None => println!("{json}"),
        }
        return Ok(());
    }

    let tier = resolution.unwrap_or(scene.export.resolution);
    let (width, height) = tier.dimensions();
    let mut surface = RasterSurface::new(width, height, fonts);
    let stats = editor.render(&mut surface, &mut NoCues);

    let out = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}-{:.2}s.png", super::slug(&scene.name), at))
    });
    surface
        .into_image()
        .save(&out)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out.display()))?;

    println!("Rendered {:.2}s at {}x{}", at, width, height);
    println!("  Elements drawn: {} (hidden: {})", stats.drawn, stats.skipped);
    println!("  Output: {}", out.display());
    Ok(())
}
