//! Show scene information.

use std::path::PathBuf;

use instavid_project_model::ElementContent;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let scene = super::load_scene(&path)?;
    let elements = scene.build_elements();

    println!("Scene: {}", scene.name);
    println!("  Duration: {:.1}s", scene.duration);
    if scene.background.gradient {
        println!(
            "  Background: {} -> {} at {}°",
            scene.background.color, scene.background.gradient_end, scene.background.angle_deg
        );
    } else {
        println!("  Background: {}", scene.background.color);
    }
    let (w, h) = scene.export.resolution.dimensions();
    println!(
        "  Export: {}x{} @ {} fps, {}{}",
        w,
        h,
        scene.export.fps,
        scene.export.format.extension(),
        if scene.export.include_audio { " with audio" } else { "" }
    );

    println!();
    println!("Elements ({}), bottom to top:", elements.len());
    for element in &elements {
        println!(
            "  #{:<3} {:<14} {:<9} {:>6.2}s - {:>6.2}s  {} ({:.2}s)",
            element.id.0,
            element.kind().label(),
            format!("{:?}", element.kind().category()),
            element.start_time,
            element.end_time(),
            element.animation,
            element.effective_animation_duration()
        );
        if let ElementContent::Text(text) = &element.content {
            println!("         \"{}\"", text.text);
        }
    }

    Ok(())
}
